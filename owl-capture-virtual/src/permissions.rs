//! Scripted camera and microphone permissions.
//!
//! There is no consent dialog in software; prompts are answered with a
//! fixed decision from a short-lived thread, after `prompt_delay`.

use std::collections::HashMap;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use owl_capture_core::models::camera_models::{AuthorizationStatus, MediaKind};
use owl_capture_core::traits::permission_provider::{AccessReply, PermissionProvider};

pub struct StaticPermissions {
    statuses: Mutex<HashMap<MediaKind, AuthorizationStatus>>,
    answer: bool,
    prompt_delay: Duration,
}

impl StaticPermissions {
    /// Both camera and microphone already authorized.
    pub fn granted() -> Self {
        Self::with_status(AuthorizationStatus::Authorized, true)
    }

    /// Both camera and microphone denied in settings.
    pub fn denied() -> Self {
        Self::with_status(AuthorizationStatus::Denied, false)
    }

    /// Nothing decided yet; every prompt is answered with `answer`.
    pub fn prompting(answer: bool) -> Self {
        Self::with_status(AuthorizationStatus::NotDetermined, answer)
    }

    fn with_status(status: AuthorizationStatus, answer: bool) -> Self {
        Self {
            statuses: Mutex::new(HashMap::from([(MediaKind::Video, status), (MediaKind::Audio, status)])),
            answer,
            prompt_delay: Duration::from_millis(20),
        }
    }

    pub fn with_status_for(self, kind: MediaKind, status: AuthorizationStatus) -> Self {
        self.statuses.lock().insert(kind, status);
        self
    }

    pub fn with_prompt_delay(mut self, delay: Duration) -> Self {
        self.prompt_delay = delay;
        self
    }
}

impl PermissionProvider for StaticPermissions {
    fn authorization_status(&self, kind: MediaKind) -> AuthorizationStatus {
        self.statuses
            .lock()
            .get(&kind)
            .copied()
            .unwrap_or(AuthorizationStatus::NotDetermined)
    }

    fn request_access(&self, kind: MediaKind, reply: AccessReply) {
        let answer = self.answer;
        let status = if answer {
            AuthorizationStatus::Authorized
        } else {
            AuthorizationStatus::Denied
        };
        self.statuses.lock().insert(kind, status);
        log::info!("{:?} access prompt answered: {}", kind, if answer { "granted" } else { "denied" });

        let delay = self.prompt_delay;
        let spawned = thread::Builder::new()
            .name("virtual-permission-prompt".into())
            .spawn(move || {
                thread::sleep(delay);
                reply(answer);
            });
        if let Err(e) = spawned {
            log::error!("failed to spawn permission prompt: {}", e);
        }
    }
}
