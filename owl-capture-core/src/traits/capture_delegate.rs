use crate::controller::screen::{ChromeState, Screen};
use crate::models::capture_result::{CaptureResult, CapturedPhoto, VideoRecording};
use crate::models::error::CaptureError;
use crate::models::state::CapturePhase;

/// Host callbacks for a capture screen.
///
/// All methods are called on the thread that drives `CaptureController`.
/// After `on_closed` no further calls are made.
pub trait CaptureDelegate: Send + Sync {
    /// Photo review dismissed: the still on accept, `None` on cancel.
    fn on_photo_selected(&self, photo: Option<CapturedPhoto>);

    /// Video review dismissed: the recording on accept, `None` on cancel.
    fn on_video_selected(&self, video: Option<VideoRecording>);

    /// The user closed the capture screen.
    fn on_closed(&self);

    /// A one-time alert, e.g. permission denied.
    fn on_alert(&self, error: &CaptureError);

    /// A capture attempt failed; the screen is armed again.
    fn on_error(&self, _error: &CaptureError) {}

    fn on_phase_changed(&self, _phase: CapturePhase) {}

    fn on_chrome_changed(&self, _chrome: &ChromeState) {}

    /// Counter label update while recording.
    fn on_counter_tick(&self, _remaining_secs: u32, _label: &str) {}

    /// Whiten the screen (and raise brightness) while `active`.
    fn on_screen_flash(&self, _active: bool) {}

    fn on_review_presented(&self, _screen: &Screen) {}

    /// Called once per capture attempt that reached review, after the
    /// selection callback.
    fn on_capture_finished(&self, _result: &CaptureResult) {}
}
