//! Recording doubles for the hardware, permission and host seams.

use std::collections::HashMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use parking_lot::Mutex;

use crate::controller::screen::{ChromeState, Screen};
use crate::models::camera_models::{
    AuthorizationStatus, CameraDevice, CameraPosition, DeviceSetting, InputKind, MediaKind,
    MovieSettings, OutputKind,
};
use crate::models::capture_result::{CaptureResult, CapturedPhoto, VideoRecording};
use crate::models::error::CaptureError;
use crate::models::state::CapturePhase;
use crate::traits::capture_backend::{CaptureBackend, MovieCompletion, StillCompletion};
use crate::traits::capture_delegate::CaptureDelegate;
use crate::traits::permission_provider::{AccessReply, PermissionProvider};

pub(crate) fn sample_jpeg(width: u32, height: u32) -> Vec<u8> {
    let image = RgbImage::from_fn(width, height, |x, y| Rgb([x as u8, y as u8, 200]));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(image)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Jpeg)
        .unwrap();
    bytes
}

pub(crate) fn back_camera() -> CameraDevice {
    CameraDevice {
        id: "mock-back".into(),
        name: "Mock Back Camera".into(),
        position: CameraPosition::Back,
        has_flash: true,
        has_torch: true,
        max_zoom_factor: 4.0,
    }
}

pub(crate) fn front_camera() -> CameraDevice {
    CameraDevice {
        id: "mock-front".into(),
        name: "Mock Front Camera".into(),
        position: CameraPosition::Front,
        has_flash: false,
        has_torch: false,
        max_zoom_factor: 2.0,
    }
}

/// Every backend call, in order.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Op {
    BeginConfiguration,
    CommitConfiguration,
    AddInput(InputKind),
    RemoveInput(InputKind),
    AddOutput(OutputKind),
    RemoveOutput(OutputKind),
    StartRunning,
    StopRunning,
    Apply(CameraPosition, DeviceSetting),
    StartMovie(PathBuf, MovieSettings),
    StopMovie,
    CaptureStill,
    /// A deferred movie completion fired.
    MovieFinalized,
}

pub(crate) type OpLog = Arc<Mutex<Vec<Op>>>;

/// Backend double. Movie and still completions fire synchronously unless
/// `completions_after` moves them onto a delayed thread.
pub(crate) struct MockBackend {
    ops: OpLog,
    devices: Vec<CameraDevice>,
    audio: bool,
    unsupported: Vec<&'static str>,
    reconfigure_delay: Duration,
    still: Result<Vec<u8>, CaptureError>,
    movie_error: Option<CaptureError>,
    completion_delay: Option<Duration>,
    inputs: Vec<InputKind>,
    outputs: Vec<OutputKind>,
    running: bool,
    movie: Option<(PathBuf, MovieCompletion)>,
}

impl MockBackend {
    pub(crate) fn new() -> (Self, OpLog) {
        let ops = OpLog::default();
        let backend = Self {
            ops: Arc::clone(&ops),
            devices: vec![back_camera(), front_camera()],
            audio: true,
            unsupported: Vec::new(),
            reconfigure_delay: Duration::ZERO,
            still: Ok(sample_jpeg(32, 24)),
            movie_error: None,
            completion_delay: None,
            inputs: Vec::new(),
            outputs: Vec::new(),
            running: false,
            movie: None,
        };
        (backend, ops)
    }

    pub(crate) fn with_devices(mut self, devices: Vec<CameraDevice>) -> Self {
        self.devices = devices;
        self
    }

    pub(crate) fn without_audio(mut self) -> Self {
        self.audio = false;
        self
    }

    pub(crate) fn unsupported(mut self, names: &[&'static str]) -> Self {
        self.unsupported.extend_from_slice(names);
        self
    }

    pub(crate) fn slow_reconfigure(mut self, delay: Duration) -> Self {
        self.reconfigure_delay = delay;
        self
    }

    pub(crate) fn with_still(mut self, still: Result<Vec<u8>, CaptureError>) -> Self {
        self.still = still;
        self
    }

    pub(crate) fn failing_movie(mut self, error: CaptureError) -> Self {
        self.movie_error = Some(error);
        self
    }

    /// Fire completions from another thread after `delay`, as real
    /// hardware does.
    pub(crate) fn completions_after(mut self, delay: Duration) -> Self {
        self.completion_delay = Some(delay);
        self
    }

    fn record(&self, op: Op) {
        self.ops.lock().push(op);
    }
}

impl CaptureBackend for MockBackend {
    fn devices(&self) -> Vec<CameraDevice> {
        self.devices.clone()
    }

    fn has_audio_device(&self) -> bool {
        self.audio
    }

    fn begin_configuration(&mut self) {
        self.record(Op::BeginConfiguration);
    }

    fn commit_configuration(&mut self) {
        self.record(Op::CommitConfiguration);
    }

    fn add_input(&mut self, input: InputKind) -> Result<(), CaptureError> {
        self.record(Op::AddInput(input));
        self.inputs.push(input);
        Ok(())
    }

    fn remove_input(&mut self, input: InputKind) {
        self.record(Op::RemoveInput(input));
        self.inputs.retain(|i| *i != input);
    }

    fn inputs(&self) -> Vec<InputKind> {
        self.inputs.clone()
    }

    fn add_output(&mut self, output: OutputKind) -> Result<(), CaptureError> {
        self.record(Op::AddOutput(output));
        self.outputs.push(output);
        Ok(())
    }

    fn remove_output(&mut self, output: OutputKind) {
        self.record(Op::RemoveOutput(output));
        self.outputs.retain(|o| *o != output);
    }

    fn start_running(&mut self) {
        self.record(Op::StartRunning);
        self.running = true;
    }

    fn stop_running(&mut self) {
        self.record(Op::StopRunning);
        if !self.reconfigure_delay.is_zero() {
            thread::sleep(self.reconfigure_delay);
        }
        self.running = false;
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn apply_setting(&mut self, position: CameraPosition, setting: DeviceSetting) -> Result<(), CaptureError> {
        self.record(Op::Apply(position, setting));
        if self.unsupported.contains(&setting.name()) {
            return Err(CaptureError::ConfigurationUnsupported(setting.name().into()));
        }
        Ok(())
    }

    fn start_movie(
        &mut self,
        path: &Path,
        settings: MovieSettings,
        completion: MovieCompletion,
    ) -> Result<(), CaptureError> {
        self.record(Op::StartMovie(path.to_path_buf(), settings));
        self.movie = Some((path.to_path_buf(), completion));
        Ok(())
    }

    fn stop_movie(&mut self) {
        self.record(Op::StopMovie);
        let Some((path, completion)) = self.movie.take() else {
            return;
        };
        let result = match self.movie_error.clone() {
            Some(error) => Err(error),
            None => Ok(path),
        };
        match self.completion_delay {
            None => completion(result),
            Some(delay) => {
                let ops = Arc::clone(&self.ops);
                thread::spawn(move || {
                    thread::sleep(delay);
                    ops.lock().push(Op::MovieFinalized);
                    completion(result);
                });
            }
        }
    }

    fn capture_still(&mut self, completion: StillCompletion) -> Result<(), CaptureError> {
        self.record(Op::CaptureStill);
        let still = self.still.clone();
        match self.completion_delay {
            None => completion(still),
            Some(delay) => {
                thread::spawn(move || {
                    thread::sleep(delay);
                    completion(still);
                });
            }
        }
        Ok(())
    }
}

/// Permission double. Requests are answered synchronously with `answer`.
pub(crate) struct MockPermissions {
    statuses: Mutex<HashMap<MediaKind, AuthorizationStatus>>,
    answer: bool,
    requests: Mutex<Vec<MediaKind>>,
}

impl MockPermissions {
    pub(crate) fn authorized() -> Arc<Self> {
        Self::with(AuthorizationStatus::Authorized, AuthorizationStatus::Authorized, true)
    }

    pub(crate) fn with(video: AuthorizationStatus, audio: AuthorizationStatus, answer: bool) -> Arc<Self> {
        let statuses = HashMap::from([(MediaKind::Video, video), (MediaKind::Audio, audio)]);
        Arc::new(Self {
            statuses: Mutex::new(statuses),
            answer,
            requests: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn requests(&self) -> Vec<MediaKind> {
        self.requests.lock().clone()
    }
}

impl PermissionProvider for MockPermissions {
    fn authorization_status(&self, kind: MediaKind) -> AuthorizationStatus {
        self.statuses
            .lock()
            .get(&kind)
            .copied()
            .unwrap_or(AuthorizationStatus::NotDetermined)
    }

    fn request_access(&self, kind: MediaKind, reply: AccessReply) {
        self.requests.lock().push(kind);
        let status = if self.answer {
            AuthorizationStatus::Authorized
        } else {
            AuthorizationStatus::Denied
        };
        self.statuses.lock().insert(kind, status);
        reply(self.answer);
    }
}

/// Host callbacks as recorded by `RecordingDelegate`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    PhotoSelected(Option<CapturedPhoto>),
    VideoSelected(Option<VideoRecording>),
    Closed,
    Alert(CaptureError),
    Error(CaptureError),
    Phase(CapturePhase),
    Chrome(ChromeState),
    Counter(u32, String),
    ScreenFlash(bool),
    Review(Screen),
    Finished(CaptureResult),
}

#[derive(Default)]
pub(crate) struct RecordingDelegate {
    calls: Mutex<Vec<Call>>,
}

impl RecordingDelegate {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub(crate) fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().iter().filter(|c| matches(c)).count()
    }

    fn push(&self, call: Call) {
        self.calls.lock().push(call);
    }
}

impl CaptureDelegate for RecordingDelegate {
    fn on_photo_selected(&self, photo: Option<CapturedPhoto>) {
        self.push(Call::PhotoSelected(photo));
    }

    fn on_video_selected(&self, video: Option<VideoRecording>) {
        self.push(Call::VideoSelected(video));
    }

    fn on_closed(&self) {
        self.push(Call::Closed);
    }

    fn on_alert(&self, error: &CaptureError) {
        self.push(Call::Alert(error.clone()));
    }

    fn on_error(&self, error: &CaptureError) {
        self.push(Call::Error(error.clone()));
    }

    fn on_phase_changed(&self, phase: CapturePhase) {
        self.push(Call::Phase(phase));
    }

    fn on_chrome_changed(&self, chrome: &ChromeState) {
        self.push(Call::Chrome(*chrome));
    }

    fn on_counter_tick(&self, remaining_secs: u32, label: &str) {
        self.push(Call::Counter(remaining_secs, label.to_string()));
    }

    fn on_screen_flash(&self, active: bool) {
        self.push(Call::ScreenFlash(active));
    }

    fn on_review_presented(&self, screen: &Screen) {
        self.push(Call::Review(screen.clone()));
    }

    fn on_capture_finished(&self, result: &CaptureResult) {
        self.push(Call::Finished(result.clone()));
    }
}
