use super::super::{Model, Msg};
use super::advisory_panel::AdvisoryPanel;
use super::utils::debounce;
use crate::state::PredictionPhase;
use shared::diagnosis::{bar_width, display_disease_name, format_confidence, format_severity};
use shared::{AdvisoryRequest, PredictionOutcome, PredictionResult, SeverityLevel};
use yew::prelude::*;

pub fn render_results(model: &Model, ctx: &Context<Model>) -> Html {
    let body = match model.prediction.phase() {
        PredictionPhase::Idle => return html! {},
        PredictionPhase::Running => render_loading(model),
        PredictionPhase::Failed(message) => render_failure(ctx, message),
        PredictionPhase::Succeeded(PredictionOutcome::Placeholder { status, .. }) => html! {
            <div class="placeholder-card">
                <p>{ status }</p>
            </div>
        },
        PredictionPhase::Succeeded(PredictionOutcome::Diagnosis(result)) => {
            render_diagnosis(model, ctx, result)
        }
    };

    html! {
        <div class="results-container" aria-live="polite">
            { body }
            { render_scan_another(model, ctx) }
        </div>
    }
}

fn render_loading(model: &Model) -> Html {
    let progress = model.prediction.progress();
    let caption = if progress > 0 && progress < 100 {
        format!("Uploading… {}%", progress)
    } else {
        "Analyzing…".to_string()
    };

    html! {
        <div class="results-loading" aria-busy="true">
            <div class="skeleton skeleton-title"></div>
            <div class="skeleton skeleton-line"></div>
            <div class="skeleton skeleton-image"></div>
            <div class="upload-progress">
                <div class="upload-progress-fill" style={format!("width: {}%", progress)}></div>
            </div>
            <p class="loading-caption">
                <i class="fa-solid fa-spinner fa-spin"></i>{ format!(" {}", caption) }
            </p>
        </div>
    }
}

fn render_failure(ctx: &Context<Model>, message: &str) -> Html {
    let link = ctx.link().clone();

    html! {
        <div class="failure-card" role="alert">
            <p class="failure-title">{"Analysis Failed"}</p>
            <p>{ message }</p>
            <button
                class="analyze-btn retry-btn"
                onclick={debounce(300, move || link.send_message(Msg::Diagnose))}
            >
                <i class="fa-solid fa-rotate-right"></i>{" Try Again"}
            </button>
        </div>
    }
}

fn render_diagnosis(model: &Model, ctx: &Context<Model>, result: &PredictionResult) -> Html {
    let level = SeverityLevel::from_percent(result.severity);
    let request = AdvisoryRequest::new(result.disease.clone(), result.confidence, result.severity);

    html! {
        <>
            <div class="diagnosis-hero">
                <div class="diagnosis-info">
                    <p class="section-label">{"Diagnosis"}</p>
                    <h2>{ display_disease_name(&result.disease) }</h2>
                    <p class="diagnosis-meta">
                        {"Confidence: "}
                        <span class="confidence">{ format_confidence(result.confidence) }</span>
                        <span class="separator">{" · "}</span>
                        {"Model: "}
                        <span>{ result.model_used.clone().unwrap_or_else(|| model.model_key.label().to_string()) }</span>
                    </p>
                    <button
                        class="export-btn"
                        title="Download results"
                        aria-label="Download results as JSON"
                        onclick={ctx.link().callback(|_| Msg::ExportResult)}
                    >
                        <i class="fa-solid fa-download"></i>{" Export"}
                    </button>
                </div>
                {
                    if let Some(selected) = &model.file {
                        html! {
                            <img
                                class="diagnosis-image"
                                src={selected.preview_url.to_string()}
                                alt="Uploaded leaf specimen"
                            />
                        }
                    } else {
                        html! {}
                    }
                }
            </div>

            <div class="severity">
                <div class="severity-header">
                    <p class="section-label">{"Severity"}</p>
                    <span class="severity-value">{ format_severity(result.severity) }</span>
                    <span class="severity-level">{ level.label() }</span>
                </div>
                <div class="severity-bar">
                    <div
                        class={classes!("severity-bar-fill", level.tone())}
                        style={format!("width: {}%", bar_width(result.severity))}
                    ></div>
                </div>
            </div>

            <AdvisoryPanel
                api={model.api.clone()}
                request={request}
                fallback_remedy={result.remedy.clone()}
            />
        </>
    }
}

fn render_scan_another(model: &Model, ctx: &Context<Model>) -> Html {
    if model.prediction.is_running() {
        return html! {};
    }

    html! {
        <div class="scan-another">
            <button onclick={ctx.link().callback(|_| Msg::ScanAnother)}>
                {"Scan Another Leaf"}
            </button>
        </div>
    }
}
