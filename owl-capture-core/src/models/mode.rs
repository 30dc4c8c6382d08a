use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

/// What a capture screen produces.
///
/// Fixed for the lifetime of a screen. Decides which session output is
/// configured and which shutter gesture is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CaptureMode {
    Photo,
    Video { max_duration_secs: NonZeroU32 },
}

impl CaptureMode {
    /// Video mode with the given recording limit. Returns `None` for zero.
    pub fn video(max_duration_secs: u32) -> Option<Self> {
        NonZeroU32::new(max_duration_secs).map(|max_duration_secs| Self::Video { max_duration_secs })
    }

    pub fn is_photo(&self) -> bool {
        matches!(self, Self::Photo)
    }

    pub fn is_video(&self) -> bool {
        matches!(self, Self::Video { .. })
    }

    /// Recording limit in seconds; zero in photo mode.
    pub fn max_duration_secs(&self) -> u32 {
        match self {
            Self::Photo => 0,
            Self::Video { max_duration_secs } => max_duration_secs.get(),
        }
    }

    /// Localization key for the on-screen instructions.
    pub fn instructions_key(&self) -> &'static str {
        match self {
            Self::Photo => "camera.instructions.tap",
            Self::Video { .. } => "camera.instructions.pressandhold",
        }
    }
}

impl Default for CaptureMode {
    fn default() -> Self {
        Self::Photo
    }
}
