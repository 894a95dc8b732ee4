use super::super::{Model, Msg, SelectedFile};
use super::utils::{download_json, file_meta, pick_upload};
use crate::state::{PredictionTicket, StartError};
use gloo_file::{File as GlooFile, ObjectUrl};
use js_sys::Date;
use shared::upload::validate_upload;
use shared::{ApiError, ModelKey, PredictResponse};
use wasm_bindgen_futures::spawn_local;
use web_sys::{ClipboardEvent, DragEvent, FileList};
use yew::prelude::*;

pub fn handle_file_chosen(model: &mut Model, file: GlooFile) -> bool {
    let meta = file_meta(&file);
    if let Err(e) = validate_upload(&meta) {
        log::warn!("Rejected {}: {}", meta.name, e);
        model.error = Some(e.to_string());
        return true;
    }

    cancel_upload(model);
    model.prediction.reset();
    model.last_response = None;
    model.error = None;

    let preview_url = ObjectUrl::from(file.clone());
    model.file = Some(SelectedFile {
        file,
        meta,
        preview_url,
    });

    true
}

pub fn handle_set_model_key(model: &mut Model, key: ModelKey) -> bool {
    if model.prediction.is_running() || model.model_key == key {
        return false;
    }
    model.model_key = key;
    true
}

pub fn handle_diagnose(model: &mut Model, ctx: &Context<Model>) -> bool {
    // "Try Again" re-runs the model the failed attempt used.
    if model.prediction.error().is_some() {
        if let Some((_, key)) = model.prediction.retry_input() {
            model.model_key = *key;
        }
    }

    let Some(selected) = &model.file else {
        ctx.link()
            .send_message(Msg::SetError(Some("Select a leaf image first.".into())));
        return false;
    };

    match model.prediction.start(&selected.meta, model.model_key) {
        Ok(ticket) => {
            let file = selected.file.clone();
            model.error = None;
            model.last_response = None;
            send_prediction_request(model, ctx, ticket, file);
            true
        }
        Err(StartError::Busy) => false,
        Err(StartError::Invalid(e)) => {
            model.error = Some(e.to_string());
            true
        }
    }
}

fn send_prediction_request(
    model: &mut Model,
    ctx: &Context<Model>,
    ticket: PredictionTicket,
    file: GlooFile,
) {
    let progress = ctx
        .link()
        .callback(move |percent| Msg::PredictProgress(ticket, percent));

    match model.api.predict(&file, model.model_key, progress) {
        Ok((handle, pending)) => {
            model.upload = Some(handle);
            let link = ctx.link().clone();
            spawn_local(async move {
                let result = pending.await;
                link.send_message(Msg::PredictFinished(ticket, result));
            });
        }
        Err(e) => ctx
            .link()
            .send_message(Msg::PredictFinished(ticket, Err(e))),
    }
}

pub fn handle_predict_finished(
    model: &mut Model,
    ticket: PredictionTicket,
    result: Result<PredictResponse, ApiError>,
) -> bool {
    if model.prediction.active_ticket() == Some(ticket) {
        model.upload = None;
        model.last_response = result.as_ref().ok().cloned();
    }
    model.prediction.finish(ticket, result)
}

pub fn handle_scan_another(model: &mut Model) -> bool {
    cancel_upload(model);
    model.prediction.reset();
    model.file = None;
    model.last_response = None;
    model.error = None;
    true
}

/// Aborts the transport; the orchestrator reset that follows makes the
/// resulting abort completion stale.
fn cancel_upload(model: &mut Model) {
    if let Some(handle) = model.upload.take() {
        handle.abort();
    }
}

pub fn handle_export(model: &Model) -> bool {
    let Some(response) = &model.last_response else {
        return false;
    };

    let file_name = format!("phyto_result_{}.json", Date::now() as u64);
    match serde_json::to_string_pretty(response) {
        Ok(json) => {
            if let Err(e) = download_json(&file_name, &json) {
                log::error!("Export failed: {:?}", e);
            }
        }
        Err(e) => log::error!("Could not serialize result: {}", e),
    }
    false
}

pub fn handle_drop(model: &mut Model, ctx: &Context<Model>, event: DragEvent) -> bool {
    event.prevent_default();
    model.is_dragging = false;

    if !model.prediction.accepts_new_file() {
        return true;
    }

    if let Some(data_transfer) = event.data_transfer() {
        if let Some(file_list) = data_transfer.files() {
            process_file_list(ctx, file_list);
        }
    }

    true
}

/// Pastes only count on the upload view; results must be dismissed first.
pub fn handle_paste(model: &mut Model, ctx: &Context<Model>, event: ClipboardEvent) -> bool {
    if !model.prediction.accepts_new_file() {
        log::debug!("Ignoring paste outside the upload view");
        return false;
    }

    if let Some(data_transfer) = event.clipboard_data() {
        if let Some(file_list) = data_transfer.files() {
            if file_list.length() > 0 {
                event.prevent_default();
                process_file_list(ctx, file_list);
                return true;
            }
        }
    }
    false
}

fn process_file_list(ctx: &Context<Model>, file_list: FileList) {
    match pick_upload(&file_list) {
        Some(file) => ctx.link().send_message(Msg::FileChosen(file)),
        None => log::debug!("Nothing to upload in the dropped selection"),
    }
}
