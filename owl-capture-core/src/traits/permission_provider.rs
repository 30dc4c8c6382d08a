use crate::models::camera_models::{AuthorizationStatus, MediaKind};

/// Reply to an access request: `true` when granted.
pub type AccessReply = Box<dyn FnOnce(bool) + Send + 'static>;

/// Platform permission system for camera and microphone access.
pub trait PermissionProvider: Send + Sync {
    fn authorization_status(&self, kind: MediaKind) -> AuthorizationStatus;

    /// Ask the user for access. The reply may arrive on any thread and
    /// has no timeout.
    fn request_access(&self, kind: MediaKind, reply: AccessReply);
}
