mod api;
mod components;
mod config;
mod state;

use api::{HttpApi, UploadHandle};
use components::handlers;
use config::AppConfig;
use gloo_events::EventListener;
use gloo_file::{File as GlooFile, ObjectUrl};
use shared::{ApiError, FileMeta, ModelKey, PredictResponse};
use state::{PredictionOrchestrator, PredictionPhase, PredictionTicket};
use wasm_bindgen::JsCast;
use web_sys::{ClipboardEvent, DragEvent};
use yew::prelude::*;

// Models
struct SelectedFile {
    file: GlooFile,
    meta: FileMeta,
    preview_url: ObjectUrl,
}

// Yew msg components
enum Msg {
    // File operations
    FileChosen(GlooFile),
    SetModelKey(ModelKey),

    // Diagnosis operations
    Diagnose,
    PredictProgress(PredictionTicket, u8),
    PredictFinished(PredictionTicket, Result<PredictResponse, ApiError>),
    ExportResult,
    ScanAnother,

    // UI states
    SetError(Option<String>),
    SetDragging(bool),

    // Input events
    HandleDrop(DragEvent),
    HandlePaste(ClipboardEvent),
}

// Main component
struct Model {
    api: HttpApi,
    file: Option<SelectedFile>,
    model_key: ModelKey,
    prediction: PredictionOrchestrator,
    upload: Option<UploadHandle>,
    last_response: Option<PredictResponse>,
    error: Option<String>,
    is_dragging: bool,
    paste_listener: Option<EventListener>,
}

#[derive(Properties, PartialEq)]
struct AppProps {
    api: HttpApi,
}

impl Component for Model {
    type Message = Msg;
    type Properties = AppProps;

    fn create(ctx: &Context<Self>) -> Self {
        let mut model = Self {
            api: ctx.props().api.clone(),
            file: None,
            model_key: ModelKey::default(),
            prediction: PredictionOrchestrator::new(),
            upload: None,
            last_response: None,
            error: None,
            is_dragging: false,
            paste_listener: None,
        };

        if let Some(window) = web_sys::window() {
            let link = ctx.link().clone();
            let listener = EventListener::new(&window, "paste", move |event| {
                if let Some(clipboard_event) = event.dyn_ref::<ClipboardEvent>() {
                    link.send_message(Msg::HandlePaste(clipboard_event.clone()));
                }
            });
            model.paste_listener = Some(listener);
        }

        model
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            // File operations
            Msg::FileChosen(file) => handlers::handle_file_chosen(self, file),
            Msg::SetModelKey(key) => handlers::handle_set_model_key(self, key),

            // Diagnosis operations
            Msg::Diagnose => handlers::handle_diagnose(self, ctx),
            Msg::PredictProgress(ticket, percent) => self.prediction.record_progress(ticket, percent),
            Msg::PredictFinished(ticket, result) => {
                handlers::handle_predict_finished(self, ticket, result)
            }
            Msg::ExportResult => handlers::handle_export(self),
            Msg::ScanAnother => handlers::handle_scan_another(self),

            // UI states
            Msg::SetError(error) => {
                self.error = error;
                true
            }
            Msg::SetDragging(is_dragging) => {
                self.is_dragging = is_dragging;
                true
            }

            // Input events
            Msg::HandleDrop(event) => handlers::handle_drop(self, ctx, event),
            Msg::HandlePaste(event) => handlers::handle_paste(self, ctx, event),
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let show_results = !matches!(self.prediction.phase(), PredictionPhase::Idle);

        html! {
            <div class="container">
                { components::header::render_header(ctx.link()) }
                { if show_results { html! {} } else { components::header::render_hero() } }

                <main class="main-content">
                {
                    if show_results {
                        html! {
                            <>
                                { components::utils::render_error_message(self) }
                                { components::results::render_results(self, ctx) }
                            </>
                        }
                    } else {
                        html! {
                            <>
                                { components::upload_section::render_upload_section(self, ctx) }
                                { components::utils::render_error_message(self) }
                                { components::controls::render_controls(self, ctx) }
                            </>
                        }
                    }
                }
                </main>

                <footer class="app-footer">
                    <p>{"Phyto · Precision Botany Platform"}</p>
                </footer>
            </div>
        }
    }
}

fn main() {
    let (config, warnings) = AppConfig::from_build_env();
    wasm_logger::init(wasm_logger::Config::new(config.log_level));
    for warning in warnings {
        log::warn!("{}", warning);
    }
    log::info!("App starting, API at {}", config.api_base);

    let api = HttpApi::new(config);
    yew::Renderer::<Model>::with_props(AppProps { api }).render();
}
