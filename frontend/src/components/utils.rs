use super::super::Model;
use gloo_file::{Blob, File as GlooFile, ObjectUrl};
use gloo_timers::callback::Timeout;
use shared::FileMeta;
use shared::upload::choose_upload;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{FileList, HtmlAnchorElement};
use yew::prelude::*;

// Debounce function to limit button events
pub fn debounce<F>(duration: i32, callback: F) -> Callback<MouseEvent>
where
    F: Fn() + Clone + 'static,
{
    let timeout = Rc::new(RefCell::new(None::<Timeout>));
    let timeout_clone = Rc::clone(&timeout);

    Callback::from(move |_| {
        let mut timeout_ref = timeout_clone.borrow_mut();

        if let Some(old_timeout) = timeout_ref.take() {
            old_timeout.cancel();
        }

        let inner_callback = callback.clone();
        let new_timeout = Timeout::new(duration as u32, move || {
            inner_callback();
        });

        *timeout_ref = Some(new_timeout);
    })
}

/// The one file to diagnose out of a picker, drop or paste selection.
/// Validation of the pick happens when it is chosen.
pub fn pick_upload(file_list: &FileList) -> Option<GlooFile> {
    let mut files: Vec<GlooFile> = (0..file_list.length())
        .filter_map(|i| file_list.item(i))
        .map(GlooFile::from)
        .collect();
    let metas: Vec<FileMeta> = files.iter().map(file_meta).collect();
    choose_upload(&metas).map(|index| files.swap_remove(index))
}

pub fn file_meta(file: &GlooFile) -> FileMeta {
    FileMeta::new(file.name(), file.raw_mime_type(), file.size())
}

pub fn render_error_message(model: &Model) -> Html {
    if let Some(error_msg) = &model.error {
        html! {
            <div class="error-message" role="alert">
                <i class="fa-solid fa-circle-exclamation"></i>
                <p>{ error_msg }</p>
            </div>
        }
    } else {
        html! {}
    }
}

/// Hands `contents` to the browser as a file download.
pub fn download_json(file_name: &str, contents: &str) -> Result<(), JsValue> {
    let blob = Blob::new_with_options(contents, Some("application/json"));
    let url = ObjectUrl::from(blob);

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("document unavailable"))?;
    let anchor: HtmlAnchorElement = document
        .create_element("a")?
        .dyn_into()
        .map_err(JsValue::from)?;

    anchor.set_href(&url);
    anchor.set_download(file_name);
    anchor.click();
    // Revoking synchronously can cancel the download in some browsers.
    Timeout::new(1_000, move || drop(url)).forget();
    Ok(())
}
