use crate::api::HttpApi;
use crate::state::advisory::MAX_FOLLOW_UPS;
use crate::state::{AdvisoryPhase, AdvisorySession, EntryStatus, ExchangeEntry, FollowUpTicket};
use shared::advisory::Captions;
use shared::{
    AdvisoryBundle, AdvisoryContent, AdvisoryRequest, ApiError, FollowUpAnswer, Language,
    RemedyCard,
};
use strum::IntoEnumIterator;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Element, HtmlInputElement};
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct AdvisoryPanelProps {
    pub api: HttpApi,
    pub request: AdvisoryRequest,
    /// Static remedy that came with the prediction, shown if the advisory fails.
    #[prop_or_default]
    pub fallback_remedy: Option<RemedyCard>,
}

pub enum PanelMsg {
    AdvisoryLoaded(u64, Result<AdvisoryBundle, ApiError>),
    RemedyLoaded(u64, Result<RemedyCard, ApiError>),
    SetLanguage(Language),
    QuestionChanged(String),
    SubmitFollowUp,
    FollowUpAnswered(FollowUpTicket, Result<FollowUpAnswer, ApiError>),
}

/// AI advisory for one diagnosis with its bounded follow-up chat.
pub struct AdvisoryPanel {
    session: AdvisorySession,
    question: String,
    remedy: Option<RemedyCard>,
    chat_end: NodeRef,
    rendered_entries: usize,
}

impl Component for AdvisoryPanel {
    type Message = PanelMsg;
    type Properties = AdvisoryPanelProps;

    fn create(ctx: &Context<Self>) -> Self {
        let props = ctx.props();
        let session = AdvisorySession::new(props.request.clone());
        fetch_advisory(ctx, session.generation(), props.request.clone());

        Self {
            session,
            question: String::new(),
            remedy: props.fallback_remedy.clone(),
            chat_end: NodeRef::default(),
            rendered_entries: 0,
        }
    }

    fn changed(&mut self, ctx: &Context<Self>, old_props: &Self::Properties) -> bool {
        let props = ctx.props();
        if props.request != old_props.request {
            log::debug!("Diagnosis changed, restarting advisory for {}", props.request.disease);
            self.session.restart(props.request.clone());
            self.question.clear();
            self.remedy = props.fallback_remedy.clone();
            self.rendered_entries = 0;
            fetch_advisory(ctx, self.session.generation(), props.request.clone());
        }
        true
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            PanelMsg::AdvisoryLoaded(generation, result) => {
                let failed = result.is_err();
                self.session.advisory_loaded(generation, result);
                let current = generation == self.session.generation();
                if current && failed && self.remedy.is_none() {
                    fetch_remedy(ctx, generation, self.session.request().disease.clone());
                }
                current
            }
            PanelMsg::RemedyLoaded(generation, _) if generation != self.session.generation() => false,
            PanelMsg::RemedyLoaded(_, Ok(card)) => {
                self.remedy = Some(card);
                true
            }
            PanelMsg::RemedyLoaded(_, Err(e)) => {
                log::warn!("No static remedy either: {}", e);
                false
            }
            PanelMsg::SetLanguage(language) => {
                if self.session.language() == language {
                    return false;
                }
                self.session.set_language(language);
                true
            }
            PanelMsg::QuestionChanged(question) => {
                self.question = question;
                true
            }
            PanelMsg::SubmitFollowUp => match self.session.begin_follow_up(&self.question) {
                Some(ticket) => {
                    self.question.clear();
                    send_follow_up(ctx, ticket);
                    true
                }
                None => false,
            },
            PanelMsg::FollowUpAnswered(ticket, result) => {
                self.session.complete_follow_up(ticket, result);
                true
            }
        }
    }

    fn rendered(&mut self, _ctx: &Context<Self>, _first_render: bool) {
        let entries = self.session.exchange().len();
        if entries != self.rendered_entries {
            self.rendered_entries = entries;
            if let Some(end) = self.chat_end.cast::<Element>() {
                end.scroll_into_view();
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        match self.session.phase() {
            AdvisoryPhase::Loading => html! {
                <div class="advisory-loading" aria-live="polite" aria-busy="true">
                    <div class="skeleton skeleton-line"></div>
                    <div class="skeleton skeleton-block"></div>
                    <div class="skeleton skeleton-block"></div>
                </div>
            },
            AdvisoryPhase::Failed(message) => html! {
                <div class="advisory">
                    <div class="advisory-error">
                        <p class="failure-title">{"AI Advisory Unavailable"}</p>
                        <p>{ message }</p>
                    </div>
                    { self.render_static_remedy() }
                </div>
            },
            AdvisoryPhase::Ready(_) => {
                let language = self.session.language();
                let captions = language.captions();

                html! {
                    <div class="advisory">
                        <div class="advisory-header">
                            <p class="section-label">{"AI Advisory"}</p>
                            { self.render_language_toggle(ctx) }
                        </div>
                        { self.session.content().map(|c| render_content(c, captions)).unwrap_or_default() }
                        { self.render_follow_up(ctx, captions) }
                    </div>
                }
            }
        }
    }
}

impl AdvisoryPanel {
    fn render_language_toggle(&self, ctx: &Context<Self>) -> Html {
        let current = self.session.language();

        html! {
            <div class="language-toggle">
                {
                    for Language::iter().map(|language| html! {
                        <button
                            key={language.as_ref()}
                            class={classes!((language == current).then_some("active"))}
                            onclick={ctx.link().callback(move |_| PanelMsg::SetLanguage(language))}
                        >
                            { language.captions().toggle }
                        </button>
                    })
                }
            </div>
        }
    }

    fn render_follow_up(&self, ctx: &Context<Self>, captions: &Captions) -> Html {
        let language = self.session.language();
        let limit_reached = self.session.limit_reached();
        let waiting = self.session.is_awaiting_answer();
        let input_disabled = !self.session.can_ask();

        let on_input = ctx.link().callback(|e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            PanelMsg::QuestionChanged(input.value())
        });
        let on_submit = ctx.link().callback(|e: SubmitEvent| {
            e.prevent_default();
            PanelMsg::SubmitFollowUp
        });

        html! {
            <div class="follow-up">
                <div class="follow-up-header">
                    <p>{ captions.ask_title }</p>
                    <span class="follow-up-count" title={format!("{} left", self.session.remaining())}>
                        { format!("{}/{}", self.session.accepted(), MAX_FOLLOW_UPS) }
                    </span>
                </div>

                if !self.session.exchange().is_empty() || waiting {
                    <div class="follow-up-log">
                        { for self.session.exchange().iter().map(|entry| render_entry(entry, language)) }
                        if waiting {
                            <div class="chat-row model">
                                <div class="chat-bubble typing">
                                    <span class="chat-dot"></span>
                                    <span class="chat-dot"></span>
                                    <span class="chat-dot"></span>
                                </div>
                            </div>
                        }
                        <div ref={self.chat_end.clone()}></div>
                    </div>
                }

                <form class="follow-up-form" onsubmit={on_submit}>
                    <input
                        type="text"
                        value={self.question.clone()}
                        oninput={on_input}
                        disabled={input_disabled}
                        placeholder={if limit_reached { captions.limit_placeholder } else { captions.ask_placeholder }}
                    />
                    <button
                        type="submit"
                        aria-label="Send follow-up"
                        disabled={input_disabled || self.question.trim().is_empty()}
                    >
                        <i class="fa-solid fa-paper-plane"></i>
                    </button>
                </form>
            </div>
        }
    }

    fn render_static_remedy(&self) -> Html {
        let Some(card) = &self.remedy else {
            return html! {};
        };

        html! {
            <div class="remedy-card static-remedy">
                if let Some(commercial) = &card.commercial {
                    <div class="remedy-section">
                        <p class="remedy-title">{"Commercial Treatment"}</p>
                        { render_field("Product", &commercial.product) }
                        { render_field("Dosage", &commercial.dosage) }
                        if let Some(frequency) = &commercial.frequency {
                            { render_field("Frequency", frequency) }
                        }
                        { render_notes(Some(commercial.notes.as_str())) }
                    </div>
                }
                if let Some(jugaad) = &card.jugaad {
                    <div class="remedy-section traditional">
                        <p class="remedy-title">{"Traditional Remedy"}</p>
                        { render_field("Recipe", &jugaad.recipe) }
                        { render_field("Frequency", &jugaad.frequency) }
                        { render_notes(Some(jugaad.notes.as_str())) }
                    </div>
                }
            </div>
        }
    }
}

fn render_content(content: &AdvisoryContent, captions: &Captions) -> Html {
    html! {
        <>
            <div class="advisory-summary">
                <p>{ &content.summary }</p>
            </div>
            <div class="remedy-card">
                <div class="remedy-section">
                    <p class="remedy-title">{ captions.commercial_title }</p>
                    if let Some(remedy) = &content.commercial_remedy {
                        { render_field(captions.product, &remedy.product) }
                        { render_field(captions.dosage, &remedy.dosage) }
                        { render_field(captions.frequency, &remedy.frequency) }
                        { render_notes(remedy.notes.as_deref()) }
                    }
                </div>
                <div class="remedy-section traditional">
                    <p class="remedy-title">{ captions.traditional_title }</p>
                    if let Some(remedy) = &content.traditional_remedy {
                        { render_field(captions.recipe, &remedy.recipe) }
                        { render_field(captions.frequency, &remedy.frequency) }
                        { render_notes(remedy.notes.as_deref()) }
                    }
                </div>
            </div>
        </>
    }
}

fn render_field(label: &str, value: &str) -> Html {
    html! {
        <div class="remedy-field">
            <p class="field-label">{ label.to_string() }</p>
            <p class="field-value">{ value.to_string() }</p>
        </div>
    }
}

fn render_notes(notes: Option<&str>) -> Html {
    match notes.filter(|n| !n.trim().is_empty()) {
        Some(notes) => html! { <p class="remedy-notes">{ notes.to_string() }</p> },
        None => html! {},
    }
}

fn render_entry(entry: &ExchangeEntry, language: Language) -> Html {
    match entry {
        ExchangeEntry::Question { text, status } => {
            let state = match status {
                EntryStatus::Pending => "pending",
                EntryStatus::Confirmed => "confirmed",
                EntryStatus::Failed => "failed",
            };
            html! {
                <div class="chat-row user">
                    <div class={classes!("chat-bubble", "chat-bubble-user", state)}>{ text.clone() }</div>
                </div>
            }
        }
        ExchangeEntry::Answer(answer) => html! {
            <div class="chat-row model">
                <div class="chat-bubble chat-bubble-ai">{ answer.text(language) }</div>
            </div>
        },
        ExchangeEntry::Error(message) => html! {
            <div class="chat-row model">
                <div class="chat-bubble chat-bubble-error">{ message.clone() }</div>
            </div>
        },
    }
}

fn fetch_advisory(ctx: &Context<AdvisoryPanel>, generation: u64, request: AdvisoryRequest) {
    let api = ctx.props().api.clone();
    let link = ctx.link().clone();
    spawn_local(async move {
        let result = api.fetch_advisory(&request).await;
        link.send_message(PanelMsg::AdvisoryLoaded(generation, result));
    });
}

fn fetch_remedy(ctx: &Context<AdvisoryPanel>, generation: u64, disease: String) {
    let api = ctx.props().api.clone();
    let link = ctx.link().clone();
    spawn_local(async move {
        let result = api.fetch_remedy(&disease).await;
        link.send_message(PanelMsg::RemedyLoaded(generation, result));
    });
}

fn send_follow_up(ctx: &Context<AdvisoryPanel>, ticket: FollowUpTicket) {
    let api = ctx.props().api.clone();
    let link = ctx.link().clone();
    spawn_local(async move {
        let result = api.send_follow_up(ticket.request()).await;
        link.send_message(PanelMsg::FollowUpAnswered(ticket, result));
    });
}
