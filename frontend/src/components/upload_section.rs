use super::super::{Model, Msg};
use super::utils::{debounce, pick_upload};
use shared::upload::ACCEPTED_MIME_TYPES;
use wasm_bindgen::JsCast;
use web_sys::{DragEvent, HtmlInputElement};
use yew::prelude::*;

pub fn render_upload_section(model: &Model, ctx: &Context<Model>) -> Html {
    let link = ctx.link();
    let handle_change = link.batch_callback(|e: Event| {
        let input: HtmlInputElement = e.target_unchecked_into();
        let file = input.files().as_ref().and_then(pick_upload);

        input.set_value("");
        file.map(Msg::FileChosen)
    });

    let handle_drag_over = link.callback(|e: DragEvent| {
        e.prevent_default();
        Msg::SetDragging(true)
    });

    let handle_drag_leave = link.callback(|e: DragEvent| {
        e.prevent_default();
        Msg::SetDragging(false)
    });

    let handle_drop = link.callback(Msg::HandleDrop);
    let trigger_file_input = Callback::from(|_| {
        let input = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("file-input"));
        if let Some(input) = input {
            if let Ok(html_input) = input.dyn_into::<web_sys::HtmlElement>() {
                html_input.click();
            }
        }
    });

    html! {
        <div class="upload-section">
            <input
                type="file"
                id="file-input"
                accept={ACCEPTED_MIME_TYPES.join(",")}
                style="display: none;"
                onchange={handle_change}
            />

            <div
                id="drop-zone"
                role="button"
                aria-label="Upload leaf image"
                class={classes!("upload-area", model.is_dragging.then_some("drag-over"))}
                ondragover={handle_drag_over}
                ondragleave={handle_drag_leave}
                ondrop={handle_drop}
                onclick={debounce(300, {
                    let trigger_file_input = trigger_file_input.clone();
                    move || trigger_file_input.emit(())
                })}
            >
                { render_drop_zone_content(model) }
            </div>
        </div>
    }
}

fn render_drop_zone_content(model: &Model) -> Html {
    match &model.file {
        Some(selected) => html! {
            <div class="upload-preview">
                <img src={selected.preview_url.to_string()} alt="Leaf preview" />
                <p>{ format!("Drop, paste or click to replace · {}", selected.meta.name) }</p>
            </div>
        },
        None => html! {
            <div class="upload-placeholder">
                <i class="fa-solid fa-seedling"></i>
                <p>
                    { if model.is_dragging { "Release to analyze" } else { "Drop your leaf specimen" } }
                </p>
                <p class="file-types">{"or browse files · JPG / PNG · Max 5 MB"}</p>
            </div>
        },
    }
}
