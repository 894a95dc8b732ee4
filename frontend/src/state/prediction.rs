use shared::error::ApiError;
use shared::upload::validate_upload;
use shared::{FileMeta, ModelKey, PredictResponse, PredictionOutcome, ValidationError};
use std::fmt;

/// Identity of one prediction request. Completions carrying any other
/// ticket than the active one are stale and get dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PredictionTicket(u64);

impl fmt::Display for PredictionTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PredictionPhase {
    Idle,
    Running,
    Succeeded(PredictionOutcome),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartError {
    Busy,
    Invalid(ValidationError),
}

/// Lifecycle of a single diagnosis request.
#[derive(Debug)]
pub struct PredictionOrchestrator {
    phase: PredictionPhase,
    progress: u8,
    active: Option<PredictionTicket>,
    last_input: Option<(FileMeta, ModelKey)>,
    next_ticket: u64,
}

impl Default for PredictionOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl PredictionOrchestrator {
    pub fn new() -> Self {
        Self {
            phase: PredictionPhase::Idle,
            progress: 0,
            active: None,
            last_input: None,
            next_ticket: 1,
        }
    }

    pub fn start(&mut self, file: &FileMeta, model: ModelKey) -> Result<PredictionTicket, StartError> {
        if self.is_running() {
            log::debug!("Prediction already running, ignoring {}", file.name);
            return Err(StartError::Busy);
        }
        validate_upload(file).map_err(StartError::Invalid)?;

        let ticket = PredictionTicket(self.next_ticket);
        self.next_ticket += 1;

        self.phase = PredictionPhase::Running;
        self.progress = 0;
        self.active = Some(ticket);
        self.last_input = Some((file.clone(), model));

        log::info!("Prediction {} started: {} on model {}", ticket, file.name, model);
        Ok(ticket)
    }

    /// Returns whether the view needs to redraw.
    pub fn record_progress(&mut self, ticket: PredictionTicket, percent: u8) -> bool {
        if self.active != Some(ticket) {
            return false;
        }
        let percent = percent.min(100);
        if percent == self.progress {
            return false;
        }
        self.progress = percent;
        true
    }

    /// Settles the active request. Late results for a replaced or reset
    /// request are ignored and return `false`.
    pub fn finish(&mut self, ticket: PredictionTicket, result: Result<PredictResponse, ApiError>) -> bool {
        if self.active != Some(ticket) {
            log::debug!("Dropping stale prediction result {}", ticket);
            return false;
        }
        self.active = None;

        self.phase = match result {
            Ok(response) => {
                let outcome = PredictionOutcome::from(response);
                match &outcome {
                    PredictionOutcome::Diagnosis(result) => log::info!(
                        "Prediction {} finished: {} ({:.3})",
                        ticket,
                        result.disease,
                        result.confidence
                    ),
                    PredictionOutcome::Placeholder { status, .. } => {
                        log::info!("Prediction {} answered with placeholder: {}", ticket, status)
                    }
                }
                self.progress = 100;
                PredictionPhase::Succeeded(outcome)
            }
            Err(err) => {
                log::error!("Prediction {} failed: {}", ticket, err);
                PredictionPhase::Failed(err.to_string())
            }
        };
        true
    }

    /// Back to idle. Does not touch the transport; the active ticket is
    /// forgotten so whatever it returns later is discarded.
    pub fn reset(&mut self) {
        if let Some(ticket) = self.active.take() {
            log::debug!("Reset while prediction {} in flight", ticket);
        }
        self.phase = PredictionPhase::Idle;
        self.progress = 0;
    }

    pub fn phase(&self) -> &PredictionPhase {
        &self.phase
    }

    /// A new file may only be picked from the upload view, which shows
    /// while idle.
    pub fn accepts_new_file(&self) -> bool {
        matches!(self.phase, PredictionPhase::Idle)
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase, PredictionPhase::Running)
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn outcome(&self) -> Option<&PredictionOutcome> {
        match &self.phase {
            PredictionPhase::Succeeded(outcome) => Some(outcome),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.phase {
            PredictionPhase::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn active_ticket(&self) -> Option<PredictionTicket> {
        self.active
    }

    /// File and model of the most recent start, for "Try Again".
    pub fn retry_input(&self) -> Option<&(FileMeta, ModelKey)> {
        self.last_input.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jpeg(size: u64) -> FileMeta {
        FileMeta::new("leaf.jpg", "image/jpeg", size)
    }

    fn late_blight() -> PredictResponse {
        serde_json::from_str(
            r#"{"disease": "Tomato___Late_blight", "confidence": 0.93, "severity": 62.4, "model_used": "general-v1"}"#,
        )
        .unwrap()
    }

    #[test]
    fn runs_idle_to_running_to_succeeded() {
        let mut orch = PredictionOrchestrator::new();
        assert_eq!(orch.phase(), &PredictionPhase::Idle);

        let ticket = orch.start(&jpeg(2 * 1024 * 1024), ModelKey::General).unwrap();
        assert_eq!(orch.phase(), &PredictionPhase::Running);
        assert!(orch.outcome().is_none());
        assert!(orch.error().is_none());

        assert!(orch.record_progress(ticket, 40));
        assert_eq!(orch.progress(), 40);

        assert!(orch.finish(ticket, Ok(late_blight())));
        let result = orch.outcome().and_then(PredictionOutcome::diagnosis).unwrap();
        assert_eq!(result.disease, "Tomato___Late_blight");
        assert_eq!(orch.active_ticket(), None);

        // A second completion for the same ticket is not applied again.
        assert!(!orch.finish(ticket, Err(ApiError::Network)));
        assert!(orch.outcome().is_some());
    }

    #[test]
    fn runs_idle_to_running_to_failed() {
        let mut orch = PredictionOrchestrator::new();
        let ticket = orch.start(&jpeg(1024), ModelKey::General).unwrap();
        assert!(orch.finish(ticket, Err(ApiError::Server { status: 500 })));
        assert_eq!(orch.error(), Some("Server error: 500"));
        assert!(orch.outcome().is_none());
        assert!(!orch.is_running());
    }

    #[test]
    fn second_start_while_running_is_rejected() {
        let mut orch = PredictionOrchestrator::new();
        let first = orch.start(&jpeg(1024), ModelKey::General).unwrap();
        assert_eq!(orch.start(&jpeg(1024), ModelKey::SoyNet), Err(StartError::Busy));
        assert_eq!(orch.active_ticket(), Some(first));
    }

    #[test]
    fn invalid_files_never_enter_running() {
        let mut orch = PredictionOrchestrator::new();
        let gif = FileMeta::new("leaf.gif", "image/gif", 1024);
        assert!(matches!(
            orch.start(&gif, ModelKey::General),
            Err(StartError::Invalid(ValidationError::UnsupportedType(_)))
        ));
        let huge = jpeg(6 * 1024 * 1024);
        assert!(matches!(
            orch.start(&huge, ModelKey::General),
            Err(StartError::Invalid(ValidationError::TooLarge { .. }))
        ));
        assert_eq!(orch.phase(), &PredictionPhase::Idle);
    }

    #[test]
    fn restart_clears_previous_result_and_progress() {
        let mut orch = PredictionOrchestrator::new();
        let first = orch.start(&jpeg(1024), ModelKey::General).unwrap();
        orch.finish(first, Ok(late_blight()));
        assert_eq!(orch.progress(), 100);

        let second = orch.start(&jpeg(1024), ModelKey::General).unwrap();
        assert_ne!(first, second);
        assert_eq!(orch.progress(), 0);
        assert!(orch.outcome().is_none());
    }

    #[test]
    fn reset_after_result_returns_to_idle() {
        let mut orch = PredictionOrchestrator::new();
        let ticket = orch.start(&jpeg(1024), ModelKey::General).unwrap();
        orch.finish(ticket, Ok(late_blight()));

        orch.reset();
        assert_eq!(orch.phase(), &PredictionPhase::Idle);
        assert!(orch.outcome().is_none());
        assert!(orch.error().is_none());
        assert_eq!(orch.progress(), 0);
    }

    #[test]
    fn reset_mid_flight_discards_late_completion() {
        let mut orch = PredictionOrchestrator::new();
        let ticket = orch.start(&jpeg(1024), ModelKey::General).unwrap();
        orch.record_progress(ticket, 70);

        orch.reset();
        assert_eq!(orch.phase(), &PredictionPhase::Idle);
        assert_eq!(orch.progress(), 0);

        assert!(!orch.record_progress(ticket, 90));
        assert!(!orch.finish(ticket, Ok(late_blight())));
        assert!(!orch.finish(ticket, Err(ApiError::Abort)));
        assert_eq!(orch.phase(), &PredictionPhase::Idle);
        assert_eq!(orch.progress(), 0);
    }

    #[test]
    fn stale_result_does_not_overwrite_newer_request() {
        let mut orch = PredictionOrchestrator::new();
        let old = orch.start(&jpeg(1024), ModelKey::General).unwrap();
        orch.reset();
        let new = orch.start(&jpeg(2048), ModelKey::SoyNet).unwrap();

        assert!(!orch.finish(old, Ok(late_blight())));
        assert!(orch.is_running());

        let placeholder: PredictResponse =
            serde_json::from_str(r#"{"status": "Coming soon"}"#).unwrap();
        assert!(orch.finish(new, Ok(placeholder)));
        assert!(matches!(
            orch.outcome(),
            Some(PredictionOutcome::Placeholder { status, .. }) if status == "Coming soon"
        ));
        assert_eq!(orch.retry_input().map(|(f, m)| (f.size, *m)), Some((2048, ModelKey::SoyNet)));
    }

    #[test]
    fn new_files_are_only_accepted_while_idle() {
        let mut orch = PredictionOrchestrator::new();
        assert!(orch.accepts_new_file());

        let ticket = orch.start(&jpeg(1024), ModelKey::General).unwrap();
        assert!(!orch.accepts_new_file());

        orch.finish(ticket, Err(ApiError::Server { status: 500 }));
        assert!(!orch.accepts_new_file());

        let ticket = orch.start(&jpeg(1024), ModelKey::General).unwrap();
        orch.finish(ticket, Ok(late_blight()));
        assert!(!orch.accepts_new_file());

        orch.reset();
        assert!(orch.accepts_new_file());
    }
}
