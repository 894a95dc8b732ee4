use crate::advisory::ErrorDetail;
use thiserror::Error;

/// Failure of a single call against the diagnosis service.
///
/// `Display` output is what the user sees, so variants read as sentences.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("Network error")]
    Network,
    #[error("Server error: {status}")]
    Server { status: u16 },
    #[error("Request aborted")]
    Abort,
    #[error("Request timed out after {after_ms} ms")]
    Timeout { after_ms: u32 },
    #[error("Advisory failed: {status}")]
    Advisory { status: u16 },
    #[error("{message}")]
    RateLimit { message: String },
    #[error("Follow-up failed: {status}")]
    FollowUp { status: u16 },
    #[error("Failed to fetch remedy: {status}")]
    Remedy { status: u16 },
    #[error("Unexpected response: {0}")]
    Decode(String),
}

/// Rejection of a file before any request is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Only .jpg and .png files are allowed.")]
    UnsupportedType(String),
    #[error("The selected file is empty.")]
    Empty,
    #[error("File must be under 5 MB.")]
    TooLarge { size: u64, max: u64 },
}

pub const RATE_LIMIT_STATUS: u16 = 429;
const RATE_LIMIT_FALLBACK: &str = "Follow-up limit reached.";

pub fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

pub fn predict_failure(status: u16) -> ApiError {
    ApiError::Server { status }
}

pub fn advisory_failure(status: u16) -> ApiError {
    ApiError::Advisory { status }
}

pub fn remedy_failure(status: u16) -> ApiError {
    ApiError::Remedy { status }
}

/// A 429 carries `{"detail": ...}` which is surfaced verbatim.
pub fn follow_up_failure(status: u16, body: &str) -> ApiError {
    if status != RATE_LIMIT_STATUS {
        return ApiError::FollowUp { status };
    }

    let message = serde_json::from_str::<ErrorDetail>(body)
        .ok()
        .and_then(|d| d.detail)
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| RATE_LIMIT_FALLBACK.to_string());

    ApiError::RateLimit { message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_detail_is_verbatim() {
        let err = follow_up_failure(429, r#"{"detail": "Follow-up limit reached."}"#);
        assert_eq!(
            err,
            ApiError::RateLimit {
                message: "Follow-up limit reached.".into()
            }
        );
        assert_eq!(err.to_string(), "Follow-up limit reached.");

        let long = follow_up_failure(
            429,
            r#"{"detail": "Follow-up limit reached. You can ask up to 2 follow-up questions per diagnosis."}"#,
        );
        assert_eq!(
            long.to_string(),
            "Follow-up limit reached. You can ask up to 2 follow-up questions per diagnosis."
        );
    }

    #[test]
    fn rate_limit_without_detail_falls_back() {
        assert_eq!(
            follow_up_failure(429, "<html>busy</html>").to_string(),
            "Follow-up limit reached."
        );
        assert_eq!(follow_up_failure(429, "{}").to_string(), "Follow-up limit reached.");
    }

    #[test]
    fn other_statuses_are_generic() {
        assert_eq!(follow_up_failure(500, ""), ApiError::FollowUp { status: 500 });
        assert_eq!(predict_failure(502).to_string(), "Server error: 502");
        assert_eq!(advisory_failure(503).to_string(), "Advisory failed: 503");
        assert_eq!(remedy_failure(404).to_string(), "Failed to fetch remedy: 404");
    }

    #[test]
    fn success_range() {
        assert!(is_success(200));
        assert!(is_success(204));
        assert!(!is_success(199));
        assert!(!is_success(300));
        assert!(!is_success(429));
    }
}
