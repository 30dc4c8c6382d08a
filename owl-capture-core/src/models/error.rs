use thiserror::Error;

/// Errors that can occur while configuring or driving a capture session.
///
/// Only `PermissionDenied` and `CaptureFailed` reach the user; capability
/// failures are absorbed by the session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("permissions were not granted to use the camera")]
    PermissionDenied,

    #[error("no capture device available for the requested camera")]
    DeviceUnavailable,

    #[error("configuration unsupported: {0}")]
    ConfigurationUnsupported(String),

    #[error("capture failed: {0}")]
    CaptureFailed(String),

    #[error("storage error: {0}")]
    StorageError(String),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl CaptureError {
    /// Whether this error is shown to the user rather than absorbed.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, Self::PermissionDenied | Self::CaptureFailed(_))
    }

    /// Folds any failure of a capture attempt into `CaptureFailed`.
    pub fn into_capture_failure(self) -> Self {
        match self {
            Self::CaptureFailed(_) => self,
            other => Self::CaptureFailed(other.to_string()),
        }
    }
}
