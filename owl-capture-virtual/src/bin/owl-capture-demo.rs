//! Scripted capture against the virtual camera.
//!
//! ```text
//! RUST_LOG=debug owl-capture-demo photo
//! RUST_LOG=debug owl-capture-demo video 3
//! ```
//!
//! Prints the accepted capture as JSON.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use owl_capture_core::{
    CaptureController, CaptureDelegate, CaptureError, CapturePhase, CaptureResult, CapturedPhoto,
    OwlConfiguration, VideoRecording,
};
use owl_capture_virtual::{StaticPermissions, VirtualCamera};

const TIMEOUT: Duration = Duration::from_secs(30);

/// Delegate that logs host callbacks and keeps the final result.
#[derive(Default)]
struct ConsoleDelegate {
    result: Mutex<Option<CaptureResult>>,
}

impl CaptureDelegate for ConsoleDelegate {
    fn on_photo_selected(&self, photo: Option<CapturedPhoto>) {
        log::info!("photo selected: {}", photo.is_some());
    }

    fn on_video_selected(&self, video: Option<VideoRecording>) {
        log::info!("video selected: {:?}", video.map(|v| v.file_path));
    }

    fn on_closed(&self) {
        log::info!("capture screen closed");
    }

    fn on_alert(&self, error: &CaptureError) {
        log::warn!("alert: {}", error);
    }

    fn on_error(&self, error: &CaptureError) {
        log::error!("{}", error);
    }

    fn on_phase_changed(&self, phase: CapturePhase) {
        log::debug!("phase: {:?}", phase);
    }

    fn on_counter_tick(&self, _remaining_secs: u32, label: &str) {
        log::info!("recording {}", label);
    }

    fn on_capture_finished(&self, result: &CaptureResult) {
        *self.result.lock() = Some(result.clone());
    }
}

fn main() -> Result<(), CaptureError> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let mode = args.next().unwrap_or_else(|| "photo".into());
    let config = match mode.as_str() {
        "photo" => OwlConfiguration::photo(),
        "video" => {
            let secs = args.next().and_then(|s| s.parse().ok()).unwrap_or(3);
            OwlConfiguration::video(secs)?
        }
        other => return Err(CaptureError::InvalidConfiguration(format!("unknown mode: {}", other))),
    };
    let is_video = config.mode.is_video();

    let delegate = Arc::new(ConsoleDelegate::default());
    let mut controller = CaptureController::new(
        config,
        VirtualCamera::new(),
        Arc::new(StaticPermissions::prompting(true)),
        delegate.clone(),
    )?;

    controller.present();
    run_until(&mut controller, |c| c.phase().is_live() || c.phase().is_terminal())?;
    if controller.phase().is_terminal() {
        return Err(CaptureError::PermissionDenied);
    }

    if is_video {
        controller.long_press_began(Instant::now());
    } else {
        controller.tap();
    }
    run_until(&mut controller, |c| c.phase() == CapturePhase::Reviewing)?;
    controller.accept_review();
    controller.close();

    let result = delegate.result.lock().take();
    let json = match result {
        Some(CaptureResult::Video(video)) => serde_json::to_value(&video),
        Some(CaptureResult::Photo(photo)) => Ok(serde_json::json!({
            "width": photo.width,
            "height": photo.height,
            "bytes": photo.bytes.len(),
            "orientation": photo.orientation,
            "position": photo.position,
        })),
        Some(CaptureResult::Cancelled) | None => Ok(serde_json::Value::Null),
    }
    .map_err(|e| CaptureError::StorageError(format!("failed to serialize result: {}", e)))?;

    println!("{}", json);
    Ok(())
}

fn run_until(
    controller: &mut CaptureController,
    done: impl Fn(&CaptureController) -> bool,
) -> Result<(), CaptureError> {
    let deadline = Instant::now() + TIMEOUT;
    while !done(controller) {
        if Instant::now() > deadline {
            return Err(CaptureError::CaptureFailed(format!(
                "timed out in phase {:?}",
                controller.phase()
            )));
        }
        controller.pump(Duration::from_millis(50), Instant::now());
    }
    Ok(())
}
