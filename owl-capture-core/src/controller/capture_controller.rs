use std::collections::HashSet;
use std::mem;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::models::camera_models::{AuthorizationStatus, CameraPosition, FlashStrategy, MediaKind};
use crate::models::capture_result::CaptureResult;
use crate::models::config::OwlConfiguration;
use crate::models::error::CaptureError;
use crate::models::mode::CaptureMode;
use crate::models::orientation::DeviceOrientation;
use crate::models::state::{CapturePhase, RecordingEndReason, ShutterState};
use crate::session::capture_session::{CaptureSession, SessionSnapshot};
use crate::session::worker::{SessionCommand, SessionEvent, SessionWorker};
use crate::shutter::control::{ShutterControl, ShutterEvent};
use crate::shutter::timer::format_clock;
use crate::shutter::visuals::ShutterVisuals;
use crate::traits::capture_backend::CaptureBackend;
use crate::traits::capture_delegate::CaptureDelegate;
use crate::traits::permission_provider::PermissionProvider;

use super::screen::{ChromeState, Screen};

/// Drives one capture screen.
///
/// Lives on the host's UI thread: gestures come in through the entry
/// points, `update`/`pump` drain the session worker's results, and every
/// user-visible transition happens here in call order. All hardware work
/// is forwarded to the `SessionWorker`.
///
/// Lifecycle:
/// 1. `present()` resolves camera and microphone access
/// 2. the worker configures the session (`Live`)
/// 3. gestures record a movie or take a still
/// 4. the review screen is accepted or cancelled
/// 5. `close()` tears the session down
pub struct CaptureController {
    mode: CaptureMode,
    permissions: Arc<dyn PermissionProvider>,
    delegate: Arc<dyn CaptureDelegate>,
    worker: Option<SessionWorker>,
    events_tx: Sender<SessionEvent>,
    events: Receiver<SessionEvent>,
    shutter: ShutterControl,
    phase: CapturePhase,
    screen: Screen,
    chrome: ChromeState,
    position: CameraPosition,
    flash_enabled: bool,
    zoom_factor: f64,
    orientation: DeviceOrientation,
    granted: HashSet<MediaKind>,
    alert_shown: bool,
    screen_flash: bool,
}

impl CaptureController {
    /// Validate `config` and start the session worker. Nothing touches the
    /// hardware until `present()`.
    pub fn new<B>(
        config: OwlConfiguration,
        backend: B,
        permissions: Arc<dyn PermissionProvider>,
        delegate: Arc<dyn CaptureDelegate>,
    ) -> Result<Self, CaptureError>
    where
        B: CaptureBackend + 'static,
    {
        config.validate().map_err(CaptureError::InvalidConfiguration)?;

        let mode = config.mode;
        let position = config.initial_position;
        let session = CaptureSession::new(backend, Arc::clone(&permissions), config);
        let (events_tx, events) = mpsc::channel();
        let worker = SessionWorker::spawn(session, events_tx.clone())?;

        Ok(Self {
            mode,
            permissions,
            delegate,
            worker: Some(worker),
            events_tx,
            events,
            shutter: ShutterControl::new(mode),
            phase: CapturePhase::Inactive,
            screen: Screen::Camera,
            chrome: ChromeState {
                flash_control_enabled: position.allows_flash_control(mode),
                ..ChromeState::default()
            },
            position,
            flash_enabled: false,
            zoom_factor: 1.0,
            orientation: DeviceOrientation::Portrait,
            granted: HashSet::new(),
            alert_shown: false,
            screen_flash: false,
        })
    }

    // --- Host views ---

    pub fn mode(&self) -> CaptureMode {
        self.mode
    }

    pub fn phase(&self) -> CapturePhase {
        self.phase
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn chrome(&self) -> ChromeState {
        self.chrome
    }

    pub fn shutter_state(&self) -> ShutterState {
        self.shutter.state()
    }

    pub fn shutter_armed(&self) -> bool {
        self.shutter.is_armed()
    }

    pub fn shutter_visuals(&self, now: Instant) -> ShutterVisuals {
        self.shutter.visuals(now)
    }

    /// Countdown label while the counter is shown.
    pub fn counter_label(&self) -> Option<String> {
        self.chrome.counter_visible.then(|| self.shutter.timer().label())
    }

    pub fn flash_enabled(&self) -> bool {
        self.flash_enabled
    }

    pub fn flash_control_enabled(&self) -> bool {
        self.chrome.flash_control_enabled
    }

    pub fn camera_position(&self) -> CameraPosition {
        self.position
    }

    pub fn zoom_factor(&self) -> f64 {
        self.zoom_factor
    }

    pub fn instructions_key(&self) -> &'static str {
        self.mode.instructions_key()
    }

    // --- Lifecycle ---

    /// Check (and if needed request) camera then microphone access, then
    /// configure the session. Only acts on a freshly built controller.
    pub fn present(&mut self) {
        if self.phase != CapturePhase::Inactive {
            log::debug!("present ignored in phase {:?}", self.phase);
            return;
        }
        self.resolve_permissions();
    }

    /// Drain session results and advance the recording timer.
    pub fn update(&mut self, now: Instant) {
        while let Ok(event) = self.events.try_recv() {
            self.handle_session_event(event);
        }
        let events = self.shutter.poll(now);
        self.handle_shutter_events(events);
    }

    /// Like `update`, but first waits up to `timeout` for a session result.
    pub fn pump(&mut self, timeout: Duration, now: Instant) {
        match self.events.recv_timeout(timeout) {
            Ok(event) => self.handle_session_event(event),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => log::trace!("session event channel closed"),
        }
        self.update(now);
    }

    /// Stop any recording, shut the session down and notify the host.
    pub fn close(&mut self) {
        if self.phase == CapturePhase::Closed {
            return;
        }
        if self.screen_flash {
            self.set_screen_flash(false);
        }
        self.teardown();
        self.set_phase(CapturePhase::Closed);
        self.delegate.on_closed();
        log::info!("capture screen closed");
    }

    // --- Gestures ---

    pub fn long_press_began(&mut self, now: Instant) {
        if !self.phase.is_live() {
            log::debug!("long press ignored in phase {:?}", self.phase);
            return;
        }
        let events = self.shutter.long_press_began(now);
        self.handle_shutter_events(events);
    }

    pub fn long_press_ended(&mut self) {
        let events = self.shutter.long_press_ended();
        self.handle_shutter_events(events);
    }

    pub fn tap(&mut self) {
        if !self.phase.is_live() {
            log::debug!("tap ignored in phase {:?}", self.phase);
            return;
        }
        let events = self.shutter.tap();
        self.handle_shutter_events(events);
    }

    /// Flip cameras. Also bound to double tap. A recording in flight is
    /// stopped first.
    pub fn toggle_camera(&mut self) {
        if !matches!(self.phase, CapturePhase::Live | CapturePhase::Recording) {
            log::debug!("camera toggle ignored in phase {:?}", self.phase);
            return;
        }
        if self.shutter.state() == ShutterState::Recording {
            let events = self.shutter.force_stop();
            self.handle_shutter_events(events);
        }

        self.position = self.position.opposite();
        let enabled = self.position.allows_flash_control(self.mode);
        self.update_chrome(|chrome| chrome.flash_control_enabled = enabled);
        self.send(SessionCommand::ToggleCamera);
    }

    /// Flip the flash setting. Returns false while flash control is disabled.
    pub fn toggle_flash(&mut self) -> bool {
        if !self.chrome.flash_control_enabled || self.phase.is_terminal() {
            return false;
        }
        self.flash_enabled = !self.flash_enabled;
        self.send(SessionCommand::SetFlash(self.flash_enabled));
        true
    }

    pub fn pinch_began(&mut self) {
        if self.accepts_camera_input() {
            self.send(SessionCommand::BeginZoom);
        }
    }

    pub fn pinch_changed(&mut self, scale: f64) {
        if self.accepts_camera_input() {
            self.send(SessionCommand::UpdateZoom(scale));
        }
    }

    pub fn set_zoom(&mut self, factor: f64) {
        if self.accepts_camera_input() {
            self.send(SessionCommand::SetZoom(factor));
        }
    }

    /// Record a device orientation reading. A real change while recording
    /// stops the recording.
    pub fn orientation_changed(&mut self, orientation: DeviceOrientation) {
        if !orientation.is_interface() || orientation == self.orientation || self.phase.is_terminal() {
            return;
        }
        self.orientation = orientation;
        self.send(SessionCommand::SetOrientation(orientation));

        if self.shutter.state() == ShutterState::Recording {
            log::info!("orientation changed to {:?} while recording", orientation);
            let events = self.shutter.force_stop();
            self.handle_shutter_events(events);
        }
    }

    // --- Review ---

    /// Deliver the reviewed capture to the host and return to the camera.
    pub fn accept_review(&mut self) -> bool {
        self.dismiss_review(true)
    }

    /// Discard the reviewed capture and return to the camera.
    pub fn cancel_review(&mut self) -> bool {
        self.dismiss_review(false)
    }

    fn dismiss_review(&mut self, accept: bool) -> bool {
        if self.phase != CapturePhase::Reviewing {
            return false;
        }
        let screen = mem::take(&mut self.screen);
        self.return_to_camera();

        let result = match screen {
            Screen::PhotoReview(photo) => {
                self.delegate.on_photo_selected(accept.then(|| photo.clone()));
                CaptureResult::Photo(photo)
            }
            Screen::VideoReview(video) => {
                self.delegate.on_video_selected(accept.then(|| video.clone()));
                CaptureResult::Video(video)
            }
            Screen::Camera => return false,
        };
        let result = if accept { result } else { CaptureResult::Cancelled };
        self.delegate.on_capture_finished(&result);
        true
    }

    // --- Internal helpers ---

    fn resolve_permissions(&mut self) {
        for kind in [MediaKind::Video, MediaKind::Audio] {
            if self.granted.contains(&kind) {
                continue;
            }
            match self.permissions.authorization_status(kind) {
                AuthorizationStatus::Authorized => {
                    self.granted.insert(kind);
                }
                AuthorizationStatus::NotDetermined => {
                    self.set_phase(CapturePhase::AwaitingPermission);
                    let events = self.events_tx.clone();
                    self.permissions.request_access(
                        kind,
                        Box::new(move |granted| {
                            let _ = events.send(SessionEvent::PermissionResolved { kind, granted });
                        }),
                    );
                    return;
                }
                AuthorizationStatus::Denied | AuthorizationStatus::Restricted => {
                    self.deny();
                    return;
                }
            }
        }

        self.set_phase(CapturePhase::Configuring);
        self.send(SessionCommand::Configure);
    }

    fn deny(&mut self) {
        log::warn!("camera or microphone access denied");
        if !self.alert_shown {
            self.alert_shown = true;
            self.delegate.on_alert(&CaptureError::PermissionDenied);
        }
        self.set_phase(CapturePhase::Inert);
    }

    fn handle_shutter_events(&mut self, events: Vec<ShutterEvent>) {
        for event in events {
            match event {
                ShutterEvent::RecordingBegan { duration_secs } => {
                    self.set_phase(CapturePhase::Recording);
                    self.update_chrome(|chrome| {
                        chrome.controls_visible = false;
                        chrome.counter_visible = true;
                    });
                    self.send(SessionCommand::StartRecording);
                    self.delegate.on_counter_tick(duration_secs, &format_clock(duration_secs));
                }
                ShutterEvent::Tick { remaining_secs } => {
                    self.delegate.on_counter_tick(remaining_secs, &format_clock(remaining_secs));
                }
                ShutterEvent::Expired => log::debug!("recording limit reached"),
                ShutterEvent::RecordingEnded { reason } => self.finish_recording(reason),
                ShutterEvent::PhotoRequested => {
                    self.set_phase(CapturePhase::Capturing);
                    self.update_chrome(|chrome| chrome.controls_visible = false);
                    self.send(SessionCommand::CapturePhoto);
                }
            }
        }
    }

    /// Single exit for every way a recording ends.
    fn finish_recording(&mut self, reason: RecordingEndReason) {
        log::info!("recording ended: {:?}", reason);
        self.update_chrome(|chrome| chrome.counter_visible = false);
        self.set_phase(CapturePhase::Finishing);
        self.send(SessionCommand::StopRecording);
    }

    fn handle_session_event(&mut self, event: SessionEvent) {
        if self.phase == CapturePhase::Closed {
            log::trace!("session event after close: {:?}", event);
            return;
        }
        match event {
            SessionEvent::PermissionResolved { kind, granted } => {
                if self.phase != CapturePhase::AwaitingPermission {
                    return;
                }
                if granted {
                    self.granted.insert(kind);
                    self.resolve_permissions();
                } else {
                    self.deny();
                }
            }
            SessionEvent::Configured(Ok(snapshot)) => {
                self.apply_snapshot(snapshot);
                self.update_chrome(|chrome| chrome.controls_visible = true);
                self.set_phase(CapturePhase::Live);
            }
            SessionEvent::Configured(Err(CaptureError::PermissionDenied)) => self.deny(),
            SessionEvent::Configured(Err(e)) => {
                log::error!("capture session configuration failed: {}", e);
                self.delegate.on_error(&e);
                self.set_phase(CapturePhase::Inert);
            }
            SessionEvent::RecordingStarted(Some(path)) => {
                log::debug!("recording to {}", path.display());
            }
            SessionEvent::RecordingStarted(None) => {
                self.shutter.force_stop();
                self.capture_failed(CaptureError::CaptureFailed("recording could not start".into()));
            }
            SessionEvent::RecordingAborted => {
                if self.phase == CapturePhase::Finishing {
                    self.return_to_camera();
                }
            }
            SessionEvent::RecordingFinished(result) => {
                if self.shutter.state() == ShutterState::Recording {
                    self.shutter.force_stop();
                    self.update_chrome(|chrome| chrome.counter_visible = false);
                }
                match result {
                    Ok(video) => self.present_review(Screen::VideoReview(video)),
                    Err(e) => self.capture_failed(e),
                }
            }
            SessionEvent::PhotoCaptureStarted(Ok(FlashStrategy::Screen)) => self.set_screen_flash(true),
            SessionEvent::PhotoCaptureStarted(Ok(_)) => {}
            SessionEvent::PhotoCaptureStarted(Err(e)) => {
                self.shutter.capture_finished();
                self.capture_failed(e);
            }
            SessionEvent::PhotoCaptured(result) => {
                if self.screen_flash {
                    self.set_screen_flash(false);
                }
                self.shutter.capture_finished();
                match result {
                    Ok(photo) => self.present_review(Screen::PhotoReview(photo)),
                    Err(e) => self.capture_failed(e),
                }
            }
            SessionEvent::CameraToggled { snapshot, error } => {
                if let Some(e) = error {
                    log::warn!("camera switch to {:?} incomplete: {}", snapshot.position, e);
                }
                self.apply_snapshot(snapshot);
            }
            SessionEvent::FlashChanged(snapshot) => self.apply_snapshot(snapshot),
            SessionEvent::ZoomChanged(factor) => self.zoom_factor = factor,
        }
    }

    fn apply_snapshot(&mut self, snapshot: SessionSnapshot) {
        self.position = snapshot.position;
        self.flash_enabled = snapshot.flash_enabled;
        self.zoom_factor = snapshot.zoom_factor;
        self.update_chrome(|chrome| chrome.flash_control_enabled = snapshot.flash_control_enabled);
    }

    fn present_review(&mut self, screen: Screen) {
        self.screen = screen;
        self.set_phase(CapturePhase::Reviewing);
        self.delegate.on_review_presented(&self.screen);
    }

    fn capture_failed(&mut self, error: CaptureError) {
        let error = error.into_capture_failure();
        log::error!("{}", error);
        self.delegate.on_error(&error);
        self.return_to_camera();
    }

    fn return_to_camera(&mut self) {
        if !self.shutter.reset() {
            return;
        }
        self.screen = Screen::Camera;
        self.update_chrome(|chrome| {
            chrome.controls_visible = true;
            chrome.counter_visible = false;
        });
        self.set_phase(CapturePhase::Live);
    }

    fn set_screen_flash(&mut self, active: bool) {
        self.screen_flash = active;
        self.delegate.on_screen_flash(active);
    }

    fn set_phase(&mut self, phase: CapturePhase) {
        if self.phase != phase {
            log::debug!("capture phase {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
            self.delegate.on_phase_changed(phase);
        }
    }

    fn update_chrome(&mut self, change: impl FnOnce(&mut ChromeState)) {
        let before = self.chrome;
        change(&mut self.chrome);
        if self.chrome != before {
            self.delegate.on_chrome_changed(&self.chrome);
        }
    }

    fn accepts_camera_input(&self) -> bool {
        matches!(self.phase, CapturePhase::Live | CapturePhase::Recording)
    }

    fn send(&self, command: SessionCommand) {
        let sent = self.worker.as_ref().is_some_and(|worker| worker.send(command));
        if !sent {
            log::warn!("session worker unavailable; dropped {:?}", command);
        }
    }

    fn teardown(&mut self) {
        self.shutter.force_stop();
        self.chrome.counter_visible = false;
        if let Some(worker) = self.worker.take() {
            worker.shutdown();
        }
    }
}

impl Drop for CaptureController {
    fn drop(&mut self) {
        self.teardown();
    }
}
