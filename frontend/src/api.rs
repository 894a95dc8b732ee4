use crate::config::AppConfig;
use futures::FutureExt;
use futures::channel::oneshot;
use futures::future::LocalBoxFuture;
use gloo_events::EventListener;
use gloo_file::File as GlooFile;
use gloo_net::http::{Request, RequestBuilder};
use gloo_timers::callback::Timeout;
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::error::{self, ApiError};
use shared::upload::progress_percent;
use shared::{
    AdvisoryBundle, AdvisoryRequest, FollowUpAnswer, FollowUpRequest, ModelKey, PredictResponse,
    RemedyCard,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{AbortController, AbortSignal, FormData, ProgressEvent, XmlHttpRequest};
use yew::Callback;

/// Receives upload progress as a whole percentage.
pub trait ProgressSink {
    fn report(&self, percent: u8);
}

impl ProgressSink for Callback<u8> {
    fn report(&self, percent: u8) {
        self.emit(percent);
    }
}

pub type PendingPrediction = LocalBoxFuture<'static, Result<PredictResponse, ApiError>>;

/// Lets the caller cancel an upload started by [`HttpApi::predict`].
#[derive(Clone)]
pub struct UploadHandle {
    xhr: XmlHttpRequest,
}

impl UploadHandle {
    pub fn abort(&self) {
        if let Err(e) = self.xhr.abort() {
            log::warn!("Failed to abort upload: {:?}", e);
        }
    }
}

/// Client for the diagnosis service. Calls share nothing but configuration.
#[derive(Clone, PartialEq)]
pub struct HttpApi {
    config: Rc<AppConfig>,
}

impl HttpApi {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config: Rc::new(config),
        }
    }

    /// Multipart upload of a leaf image. Goes through `XMLHttpRequest`
    /// because fetch does not expose upload progress.
    pub fn predict(
        &self,
        file: &GlooFile,
        model_key: ModelKey,
        progress: impl ProgressSink + 'static,
    ) -> Result<(UploadHandle, PendingPrediction), ApiError> {
        let form = FormData::new().map_err(browser_failure)?;
        form.append_with_blob_and_filename("file", file.as_ref(), &file.name())
            .map_err(browser_failure)?;
        form.append_with_str("model_key", model_key.as_ref())
            .map_err(browser_failure)?;

        let xhr = XmlHttpRequest::new().map_err(browser_failure)?;
        xhr.open("POST", &self.config.endpoint("predict"))
            .map_err(browser_failure)?;
        let timeout_ms = self.config.predict_timeout_ms;
        xhr.set_timeout(timeout_ms);

        let (tx, rx) = oneshot::channel();
        let tx = Rc::new(RefCell::new(Some(tx)));
        let settle: Rc<dyn Fn(Result<PredictResponse, ApiError>)> = Rc::new(move |outcome| {
            if let Some(tx) = tx.borrow_mut().take() {
                let _ = tx.send(outcome);
            }
        });

        let upload = xhr.upload().map_err(browser_failure)?;
        let on_progress = EventListener::new(&upload, "progress", move |event| {
            let Some(event) = event.dyn_ref::<ProgressEvent>() else {
                return;
            };
            if !event.length_computable() {
                return;
            }
            if let Some(percent) = progress_percent(event.loaded(), event.total()) {
                progress.report(percent);
            }
        });

        let on_load = {
            let reader = xhr.clone();
            let settle = settle.clone();
            EventListener::new(&xhr, "load", move |_| settle(read_prediction(&reader)))
        };
        let on_error = {
            let settle = settle.clone();
            EventListener::new(&xhr, "error", move |_| settle(Err(ApiError::Network)))
        };
        let on_abort = {
            let settle = settle.clone();
            EventListener::new(&xhr, "abort", move |_| settle(Err(ApiError::Abort)))
        };
        let on_timeout = EventListener::new(&xhr, "timeout", move |_| {
            settle(Err(ApiError::Timeout {
                after_ms: timeout_ms,
            }))
        });

        xhr.send_with_opt_form_data(Some(&form))
            .map_err(browser_failure)?;
        log::debug!("Uploading {} ({} bytes) to {}", file.name(), file.size(), model_key);

        let listeners = [on_progress, on_load, on_error, on_abort, on_timeout];
        let pending = async move {
            let outcome = rx.await.unwrap_or(Err(ApiError::Abort));
            drop(listeners);
            outcome
        }
        .boxed_local();

        Ok((UploadHandle { xhr }, pending))
    }

    pub async fn fetch_remedy(&self, disease: &str) -> Result<RemedyCard, ApiError> {
        let url = self
            .config
            .endpoint(&format!("remedies/{}", urlencoding::encode(disease)));
        self.fetch_json(Request::get(&url), None::<&()>, |status, _| {
            error::remedy_failure(status)
        })
        .await
    }

    pub async fn fetch_advisory(&self, req: &AdvisoryRequest) -> Result<AdvisoryBundle, ApiError> {
        let url = self.config.endpoint("chat/advisory");
        self.fetch_json(Request::post(&url), Some(req), |status, _| {
            error::advisory_failure(status)
        })
        .await
    }

    pub async fn send_follow_up(&self, req: &FollowUpRequest) -> Result<FollowUpAnswer, ApiError> {
        let url = self.config.endpoint("chat/followup");
        self.fetch_json(Request::post(&url), Some(req), error::follow_up_failure)
            .await
    }

    async fn fetch_json<B, T>(
        &self,
        builder: RequestBuilder,
        body: Option<&B>,
        on_status: impl FnOnce(u16, &str) -> ApiError,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let deadline = Deadline::start(self.config.chat_timeout_ms)?;
        let signal = deadline.signal();
        let builder = builder.abort_signal(Some(&signal));

        let request = match body {
            Some(body) => builder.json(body),
            None => builder.build(),
        }
        .map_err(|e| ApiError::Decode(e.to_string()))?;

        let response = request
            .send()
            .await
            .map_err(|e| deadline.transport_error(e))?;

        let status = response.status();
        if !error::is_success(status) {
            let text = response.text().await.unwrap_or_default();
            log::warn!("{} answered {}", response.url(), status);
            return Err(on_status(status, &text));
        }

        response.json::<T>().await.map_err(|e| match e {
            gloo_net::Error::SerdeError(e) => ApiError::Decode(e.to_string()),
            other => deadline.transport_error(other),
        })
    }
}

fn read_prediction(xhr: &XmlHttpRequest) -> Result<PredictResponse, ApiError> {
    let status = xhr.status().map_err(browser_failure)?;
    if !error::is_success(status) {
        return Err(error::predict_failure(status));
    }
    let body = xhr
        .response_text()
        .map_err(browser_failure)?
        .unwrap_or_default();
    serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
}

fn browser_failure(err: JsValue) -> ApiError {
    log::error!("Browser API call failed: {:?}", err);
    ApiError::Network
}

/// Aborts a fetch once the configured timeout elapses.
struct Deadline {
    controller: AbortController,
    timed_out: Rc<Cell<bool>>,
    after_ms: u32,
    _timer: Timeout,
}

impl Deadline {
    fn start(after_ms: u32) -> Result<Self, ApiError> {
        let controller = AbortController::new().map_err(browser_failure)?;
        let timed_out = Rc::new(Cell::new(false));
        let timer = {
            let controller = controller.clone();
            let timed_out = timed_out.clone();
            Timeout::new(after_ms, move || {
                timed_out.set(true);
                controller.abort();
            })
        };

        Ok(Self {
            controller,
            timed_out,
            after_ms,
            _timer: timer,
        })
    }

    fn signal(&self) -> AbortSignal {
        self.controller.signal()
    }

    fn transport_error(&self, err: gloo_net::Error) -> ApiError {
        if self.timed_out.get() {
            ApiError::Timeout {
                after_ms: self.after_ms,
            }
        } else {
            log::warn!("Transport failure: {}", err);
            ApiError::Network
        }
    }
}
