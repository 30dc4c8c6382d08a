use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::models::camera_models::{
    CameraDevice, CameraPosition, DeviceSetting, FlashStrategy, InputKind, MediaKind, MovieSettings,
    OutputKind,
};
use crate::models::capture_result::{CapturedPhoto, VideoRecording};
use crate::models::config::OwlConfiguration;
use crate::models::error::CaptureError;
use crate::models::mode::CaptureMode;
use crate::models::orientation::DeviceOrientation;
use crate::processing::photo;
use crate::storage::scratch;
use crate::traits::capture_backend::{CaptureBackend, MovieCompletion, StillCompletion};
use crate::traits::permission_provider::PermissionProvider;

/// Tuning applied to every newly attached camera, in order.
const DEVICE_TUNING: [DeviceSetting; 4] = [
    DeviceSetting::ContinuousAutoFocus,
    DeviceSetting::ContinuousAutoExposure,
    DeviceSetting::ContinuousAutoWhiteBalance,
    DeviceSetting::LowLightBoost,
];

/// Outcome of `CaptureSession::stop_recording`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// The movie output was asked to finalize.
    Stopping,
    /// A stop was already requested; the completion is pending.
    AlreadyFinalizing,
    NotRecording,
}

/// State the UI mirrors from the session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSnapshot {
    pub position: CameraPosition,
    pub flash_enabled: bool,
    pub flash_control_enabled: bool,
    pub zoom_factor: f64,
}

struct ActiveRecording {
    path: PathBuf,
    started_at: Instant,
    position: CameraPosition,
    finalizing: bool,
}

/// Hardware-facing capture orchestrator.
///
/// Generic over the platform via `CaptureBackend`. Owns the backend
/// exclusively; in production it lives on the session worker thread and
/// every method runs there.
///
/// ```text
/// [video input (facing)] ─┐
///                         ├→ [session] → [still output | movie output]
/// [audio input] ──────────┘
/// ```
pub struct CaptureSession<B: CaptureBackend> {
    backend: B,
    permissions: Arc<dyn PermissionProvider>,
    config: OwlConfiguration,
    position: CameraPosition,
    video_device: Option<CameraDevice>,
    output: Option<OutputKind>,
    flash_enabled: bool,
    zoom_factor: f64,
    zoom_base: f64,
    orientation: DeviceOrientation,
    recording: Option<ActiveRecording>,
    configured: bool,
}

impl<B: CaptureBackend> CaptureSession<B> {
    pub fn new(backend: B, permissions: Arc<dyn PermissionProvider>, config: OwlConfiguration) -> Self {
        let position = config.initial_position;
        Self {
            backend,
            permissions,
            config,
            position,
            video_device: None,
            output: None,
            flash_enabled: false,
            zoom_factor: 1.0,
            zoom_base: 1.0,
            orientation: DeviceOrientation::Portrait,
            recording: None,
            configured: false,
        }
    }

    pub fn mode(&self) -> CaptureMode {
        self.config.mode
    }

    pub fn position(&self) -> CameraPosition {
        self.position
    }

    pub fn output(&self) -> Option<OutputKind> {
        self.output
    }

    pub fn is_configured(&self) -> bool {
        self.configured
    }

    pub fn is_recording(&self) -> bool {
        self.recording.is_some()
    }

    pub fn flash_enabled(&self) -> bool {
        self.flash_enabled
    }

    pub fn zoom_factor(&self) -> f64 {
        self.zoom_factor
    }

    pub fn orientation(&self) -> DeviceOrientation {
        self.orientation
    }

    pub fn flash_control_enabled(&self) -> bool {
        self.position.allows_flash_control(self.config.mode)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            position: self.position,
            flash_enabled: self.flash_enabled,
            flash_control_enabled: self.flash_control_enabled(),
            zoom_factor: self.zoom_factor,
        }
    }

    /// Attach inputs and the output matching the mode, then start running.
    pub fn configure(&mut self) -> Result<(), CaptureError> {
        for kind in [MediaKind::Video, MediaKind::Audio] {
            let status = self.permissions.authorization_status(kind);
            if !status.is_authorized() {
                log::warn!("{:?} access not authorized ({:?})", kind, status);
                return Err(CaptureError::PermissionDenied);
            }
        }

        if self.configured {
            log::debug!("session already configured");
            return Ok(());
        }

        self.backend.begin_configuration();
        let result = self.attach_inputs().map(|()| self.attach_output());
        self.backend.commit_configuration();
        result?;

        self.backend.start_running();
        self.configured = true;
        log::info!(
            "capture session configured: {:?} camera, {:?} output",
            self.position,
            self.output
        );
        Ok(())
    }

    /// Start a movie in a fresh scratch file. Returns `None` (and does
    /// nothing) without a movie output or while already recording.
    pub fn start_recording(&mut self, completion: MovieCompletion) -> Option<PathBuf> {
        if self.output != Some(OutputKind::Movie) {
            log::debug!("start recording ignored: no movie output");
            return None;
        }
        if self.recording.is_some() {
            log::debug!("start recording ignored: already recording");
            return None;
        }

        let path = match scratch::movie_path(&self.config.scratch_directory) {
            Ok(path) => path,
            Err(e) => {
                log::error!("cannot allocate movie file: {}", e);
                return None;
            }
        };

        let settings = MovieSettings {
            orientation: self.orientation.video_orientation(),
            mirrored: self.position.is_front(),
        };
        if let Err(e) = self.backend.start_movie(&path, settings, completion) {
            log::error!("movie output refused to start: {}", e);
            return None;
        }

        self.recording = Some(ActiveRecording {
            path: path.clone(),
            started_at: Instant::now(),
            position: self.position,
            finalizing: false,
        });
        if self.flash_enabled {
            self.set_torch(true);
        }

        log::info!("recording started: {}", path.display());
        Some(path)
    }

    /// Ask the movie output to finalize. The completion passed to
    /// `start_recording` delivers the result.
    pub fn stop_recording(&mut self) -> StopOutcome {
        match self.recording.as_mut() {
            None => StopOutcome::NotRecording,
            Some(recording) if recording.finalizing => StopOutcome::AlreadyFinalizing,
            Some(recording) => {
                recording.finalizing = true;
                self.backend.stop_movie();
                StopOutcome::Stopping
            }
        }
    }

    /// Handle the movie completion.
    pub fn finish_recording(&mut self, result: Result<PathBuf, CaptureError>) -> Result<VideoRecording, CaptureError> {
        let recording = self.recording.take();
        self.set_torch(false);

        let path = result.map_err(|e| {
            log::error!("movie finalize failed: {}", e);
            e.into_capture_failure()
        })?;

        let (duration_secs, position) = match recording {
            Some(r) => {
                if r.path != path {
                    log::warn!("movie finalized at {} instead of {}", path.display(), r.path.display());
                }
                (r.started_at.elapsed().as_secs_f64(), r.position)
            }
            None => (0.0, self.position),
        };

        log::info!("recording finished: {} ({:.1}s)", path.display(), duration_secs);
        Ok(VideoRecording::new(path, duration_secs, position))
    }

    /// Trigger a still capture. The raw bytes arrive via `completion`.
    pub fn capture_photo(&mut self, completion: StillCompletion) -> Result<FlashStrategy, CaptureError> {
        if self.output != Some(OutputKind::Still) {
            return Err(CaptureError::CaptureFailed("still image output is not configured".into()));
        }
        let device = self.video_device.clone().ok_or(CaptureError::DeviceUnavailable)?;

        let strategy = self.flash_strategy(&device);
        match strategy {
            FlashStrategy::Hardware => {
                self.best_effort(DeviceSetting::Flash(true));
            }
            FlashStrategy::Off if device.has_flash => {
                self.best_effort(DeviceSetting::Flash(false));
            }
            FlashStrategy::Off | FlashStrategy::Screen => {}
        }

        self.backend.capture_still(completion)?;
        Ok(strategy)
    }

    /// Decode a delivered still, oriented for the current device
    /// orientation and facing.
    pub fn process_photo(&self, bytes: Vec<u8>) -> Result<CapturedPhoto, CaptureError> {
        let orientation = self.orientation.image_orientation(self.position);
        photo::develop(
            bytes,
            orientation,
            self.position,
            self.config.preview_size,
            self.config.jpeg_quality,
        )
    }

    /// Switch to the opposite camera: stop, detach inputs, attach inputs
    /// for the new facing, restart.
    ///
    /// Refused while a movie is open: the recording is asked to stop and
    /// the caller retries once `finish_recording` has run.
    pub fn toggle_camera(&mut self) -> Result<CameraPosition, CaptureError> {
        if self.recording.is_some() {
            if self.stop_recording() == StopOutcome::Stopping {
                log::info!("stopping in-flight recording before switching cameras");
            }
            return Err(CaptureError::CaptureFailed(
                "cannot switch cameras while a movie is finalizing".into(),
            ));
        }

        let next = self.position.opposite();
        if !self.configured {
            self.position = next;
            return Ok(next);
        }

        self.backend.stop_running();
        for input in self.backend.inputs() {
            self.backend.remove_input(input);
        }
        self.video_device = None;
        self.position = next;

        self.backend.begin_configuration();
        let result = self.attach_inputs();
        self.backend.commit_configuration();
        self.backend.start_running();
        result?;

        log::info!("switched to {:?} camera", next);
        Ok(next)
    }

    /// Toggle flash. Refused while flash control is disabled.
    pub fn set_flash(&mut self, enabled: bool) -> bool {
        if !self.flash_control_enabled() {
            log::warn!("flash control is disabled for the {:?} camera", self.position);
            return false;
        }
        self.flash_enabled = enabled;
        if self.recording.is_some() {
            self.set_torch(enabled);
        }
        true
    }

    pub fn set_orientation(&mut self, orientation: DeviceOrientation) {
        if orientation.is_interface() {
            self.orientation = orientation;
        }
    }

    /// Remember the factor a pinch starts from.
    pub fn begin_zoom(&mut self) {
        self.zoom_base = self.zoom_factor;
    }

    /// Apply a pinch scale relative to the factor at `begin_zoom`.
    pub fn update_zoom(&mut self, scale: f64) -> f64 {
        self.set_zoom(self.zoom_base * scale)
    }

    /// Set the zoom factor, clamped to `[1.0, device max]`. The front
    /// camera does not zoom.
    pub fn set_zoom(&mut self, factor: f64) -> f64 {
        let Some(max_zoom) = self.video_device.as_ref().map(|d| d.max_zoom_factor) else {
            return self.zoom_factor;
        };
        if self.position.is_front() {
            return self.zoom_factor;
        }

        let clamped = clamp_zoom(factor, max_zoom);
        if self.best_effort(DeviceSetting::Zoom(clamped)) {
            self.zoom_factor = clamped;
        }
        self.zoom_factor
    }

    /// Stop everything and detach all inputs and outputs.
    pub fn shutdown(&mut self) {
        if self.stop_recording() == StopOutcome::Stopping {
            log::info!("stopped recording on shutdown");
        }
        if !self.configured {
            return;
        }
        self.backend.stop_running();
        for input in self.backend.inputs() {
            self.backend.remove_input(input);
        }
        if let Some(output) = self.output.take() {
            self.backend.remove_output(output);
        }
        self.video_device = None;
        self.configured = false;
        log::info!("capture session shut down");
    }

    // --- Internal helpers ---

    fn attach_inputs(&mut self) -> Result<(), CaptureError> {
        let device = self
            .backend
            .device(self.position)
            .ok_or(CaptureError::DeviceUnavailable)?;

        for setting in DEVICE_TUNING {
            let applied = self.best_effort(setting);
            if applied && setting == DeviceSetting::ContinuousAutoFocus {
                self.best_effort(DeviceSetting::SmoothAutoFocus);
            }
        }

        self.backend.add_input(InputKind::Video(self.position))?;
        self.video_device = Some(device);
        self.zoom_factor = 1.0;
        self.zoom_base = 1.0;

        if !self.backend.has_audio_device() {
            log::debug!("no microphone available; recording without audio");
        } else if let Err(e) = self.backend.add_input(InputKind::Audio) {
            log::debug!("skipping audio input: {}", e);
        }
        Ok(())
    }

    fn attach_output(&mut self) {
        let output = if self.config.mode.is_video() {
            OutputKind::Movie
        } else {
            OutputKind::Still
        };
        match self.backend.add_output(output) {
            Ok(()) => {
                self.output = Some(output);
                if output == OutputKind::Movie {
                    self.best_effort(DeviceSetting::VideoStabilization);
                }
            }
            Err(e) => log::warn!("cannot add {:?} output: {}", output, e),
        }
    }

    fn flash_strategy(&self, device: &CameraDevice) -> FlashStrategy {
        if !self.flash_enabled {
            return FlashStrategy::Off;
        }
        match self.position {
            CameraPosition::Back if device.has_flash => FlashStrategy::Hardware,
            CameraPosition::Front if !device.has_flash => FlashStrategy::Screen,
            _ => FlashStrategy::Off,
        }
    }

    fn set_torch(&mut self, on: bool) {
        let has_torch = self.video_device.as_ref().is_some_and(|d| d.has_torch);
        if self.position.is_front() || !has_torch {
            return;
        }
        self.best_effort(DeviceSetting::Torch(on));
    }

    fn best_effort(&mut self, setting: DeviceSetting) -> bool {
        match self.backend.apply_setting(self.position, setting) {
            Ok(()) => true,
            Err(e) => {
                log::debug!("skipping {} on {:?} camera: {}", setting.name(), self.position, e);
                false
            }
        }
    }
}

/// Clamp a zoom factor to `[1.0, max_zoom]`. NaN maps to 1.0.
pub fn clamp_zoom(factor: f64, max_zoom: f64) -> f64 {
    if factor.is_nan() {
        return 1.0;
    }
    factor.clamp(1.0, max_zoom.max(1.0))
}
