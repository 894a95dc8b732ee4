use super::super::{Model, Msg};
use yew::html::Scope;
use yew::prelude::*;

/// Renders the application header. The brand doubles as "scan another".
pub fn render_header(link: &Scope<Model>) -> Html {
    html! {
        <header class="app-header">
            <button
                class="brand"
                title="Start a new scan"
                onclick={link.callback(|_| Msg::ScanAnother)}
            >
                <i class="fa-solid fa-leaf"></i>{" Phyto"}
            </button>
        </header>
    }
}

pub fn render_hero() -> Html {
    html! {
        <section class="hero">
            <h1>{"Precision Botany"}<br /><span class="accent">{"at Your Fingertips"}</span></h1>
            <p class="subtitle">
                {"Upload a leaf. Our AI identifies the disease, estimates severity, and prescribes a remedy in seconds."}
            </p>
        </section>
    }
}
