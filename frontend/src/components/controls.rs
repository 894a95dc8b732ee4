use super::super::{Model, Msg};
use super::utils::debounce;
use shared::ModelKey;
use strum::IntoEnumIterator;
use yew::prelude::*;

/// Model picker and the "Diagnose" button under the drop zone.
pub fn render_controls(model: &Model, ctx: &Context<Model>) -> Html {
    let link = ctx.link().clone();
    let busy = model.prediction.is_running();

    html! {
        <div class="control-bar">
            <div class="model-selector" role="radiogroup" aria-label="Classification model">
                { for ModelKey::iter().map(|key| render_model_option(model, ctx, key, busy)) }
            </div>
            <button
                class="analyze-btn"
                onclick={debounce(300, {
                    let link = link.clone();
                    move || link.send_message(Msg::Diagnose)
                })}
                disabled={busy || model.file.is_none()}
            >
                {
                    if busy {
                        html! { <><i class="fa-solid fa-spinner fa-spin"></i>{" Analyzing…"}</> }
                    } else {
                        html! { <><i class="fa-solid fa-magnifying-glass"></i>{" Diagnose"}</> }
                    }
                }
            </button>
        </div>
    }
}

fn render_model_option(model: &Model, ctx: &Context<Model>, key: ModelKey, busy: bool) -> Html {
    html! {
        <label
            key={key.as_ref()}
            class={classes!(
                "model-option",
                (model.model_key == key).then_some("selected"),
                (!key.is_active()).then_some("coming-soon"),
            )}
            title={key.tip()}
        >
            <input
                type="radio"
                name="model_key"
                value={key.as_ref().to_string()}
                checked={model.model_key == key}
                disabled={busy}
                onchange={ctx.link().callback(move |_| Msg::SetModelKey(key))}
            />
            <span class="radio-label-text">{ key.label() }</span>
            <span class="radio-label-tip">{ key.tip() }</span>
        </label>
    }
}
