// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the check-in capture flow

use crate::backends::camera::BackendError;
use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Outcome of a single capture invocation
pub type CaptureResult = Result<crate::surface::ImagePayload, CaptureError>;

/// Main application error type
#[derive(Debug, Clone)]
pub enum AppError {
    /// Capture surface errors
    Capture(CaptureError),
    /// Camera backend errors
    Backend(BackendError),
    /// Configuration errors
    Config(String),
    /// Storage/filesystem errors
    Storage(String),
    /// Generic error with message
    Other(String),
}

/// Errors surfaced by [`crate::surface::CaptureSurface::capture`]
///
/// Every variant is terminal for the capture that raised it and none is
/// fatal to the process. The caller decides whether to try again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// No camera handle: not mounted yet, or permission was not granted
    NotReady,
    /// Another capture has not settled yet
    InProgress,
    /// The platform capture primitive failed
    CaptureFailed(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Capture(e) => write!(f, "Capture error: {}", e),
            AppError::Backend(e) => write!(f, "Camera error: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Storage(msg) => write!(f, "Storage error: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::NotReady => write!(f, "Camera is not ready"),
            CaptureError::InProgress => write!(f, "A capture is already in progress"),
            CaptureError::CaptureFailed(reason) => write!(f, "Capture failed: {}", reason),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for CaptureError {}

impl From<CaptureError> for AppError {
    fn from(err: CaptureError) -> Self {
        AppError::Capture(err)
    }
}

impl From<BackendError> for AppError {
    fn from(err: BackendError) -> Self {
        AppError::Backend(err)
    }
}

impl From<BackendError> for CaptureError {
    fn from(err: BackendError) -> Self {
        CaptureError::CaptureFailed(err.to_string())
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Other(msg.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_becomes_capture_failed() {
        let err: CaptureError = BackendError::IoError("device unplugged".into()).into();
        match err {
            CaptureError::CaptureFailed(reason) => assert!(reason.contains("device unplugged")),
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::from(CaptureError::NotReady);
        assert_eq!(err.to_string(), "Capture error: Camera is not ready");
    }
}
