// src/error.rs

use thiserror::Error;

/// Failure kinds for one detection tick. None of these are fatal to the
/// process; the session decides whether to skip, continue, or go idle.
#[derive(Debug, Error)]
pub enum DetectError {
    /// No frame is ready yet (source not playing, zero dimensions).
    /// The tick is skipped without surfacing an error.
    #[error("capture unavailable: {0}")]
    CaptureUnavailable(String),

    /// Remote backend is unreachable or its model is not loaded.
    /// Persistent: the session stops ticking until the health probe recovers.
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Unexpected processing fault. Logged; the previous result is kept
    /// and the loop continues.
    #[error("classification failure: {0}")]
    ClassificationFailure(String),
}

impl DetectError {
    pub fn is_capture_unavailable(&self) -> bool {
        matches!(self, DetectError::CaptureUnavailable(_))
    }

    pub fn is_backend_unavailable(&self) -> bool {
        matches!(self, DetectError::BackendUnavailable(_))
    }
}
