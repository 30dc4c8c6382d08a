use crate::models::capture_result::{CapturedPhoto, VideoRecording};

/// Top of the capture screen stack.
///
/// ```text
/// Camera → PhotoReview | VideoReview → Camera
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Screen {
    #[default]
    Camera,
    PhotoReview(CapturedPhoto),
    VideoReview(VideoRecording),
}

/// Visibility of the camera screen's overlays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChromeState {
    /// Close, flash and flip buttons plus the instructions label.
    pub controls_visible: bool,
    /// Countdown label and pulsing recording indicator.
    pub counter_visible: bool,
    /// Flash button is enabled (it is never hidden).
    pub flash_control_enabled: bool,
}
