use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;
pub const ACCEPTED_MIME_TYPES: [&str; 2] = ["image/jpeg", "image/png"];
const ACCEPTED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// What the client knows about a file before uploading it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMeta {
    pub name: String,
    pub mime: String,
    pub size: u64,
}

impl FileMeta {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            size,
        }
    }

    fn has_accepted_type(&self) -> bool {
        if !self.mime.is_empty() {
            return ACCEPTED_MIME_TYPES.contains(&self.mime.as_str());
        }

        // Some platforms leave the type blank; trust the extension then.
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| ACCEPTED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
            .unwrap_or(false)
    }
}

pub fn validate_upload(file: &FileMeta) -> Result<(), ValidationError> {
    if !file.has_accepted_type() {
        return Err(ValidationError::UnsupportedType(file.mime.clone()));
    }
    if file.size == 0 {
        return Err(ValidationError::Empty);
    }
    if file.size > MAX_UPLOAD_BYTES {
        return Err(ValidationError::TooLarge {
            size: file.size,
            max: MAX_UPLOAD_BYTES,
        });
    }
    Ok(())
}

/// Picks which of several dropped or pasted files to upload: the first
/// with an accepted type, otherwise the first so validation can say why
/// it is refused. `None` only for an empty list.
pub fn choose_upload(candidates: &[FileMeta]) -> Option<usize> {
    candidates
        .iter()
        .position(FileMeta::has_accepted_type)
        .or_else(|| (!candidates.is_empty()).then_some(0))
}

/// Rounded upload percentage, or `None` while the total is unknown.
pub fn progress_percent(loaded: f64, total: f64) -> Option<u8> {
    if total.is_nan() || total <= 0.0 || !loaded.is_finite() {
        return None;
    }
    let pct = (loaded / total * 100.0).round().clamp(0.0, 100.0);
    Some(pct as u8)
}
