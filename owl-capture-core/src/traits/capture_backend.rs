use std::path::{Path, PathBuf};

use crate::models::camera_models::{
    CameraDevice, CameraPosition, DeviceSetting, InputKind, MovieSettings, OutputKind,
};
use crate::models::error::CaptureError;

/// Single-shot completion for a movie recording: the finalized file or the
/// reason finalizing failed.
pub type MovieCompletion = Box<dyn FnOnce(Result<PathBuf, CaptureError>) + Send + 'static>;

/// Single-shot completion for a still capture: raw JPEG bytes.
pub type StillCompletion = Box<dyn FnOnce(Result<Vec<u8>, CaptureError>) + Send + 'static>;

/// Interface for platform capture hardware.
///
/// Implemented by:
/// - `VirtualCamera` (owl-capture-virtual)
///
/// A backend is owned by exactly one `CaptureSession` and only called from
/// the session worker thread. Completions may fire from any thread.
pub trait CaptureBackend: Send {
    /// Cameras currently available.
    fn devices(&self) -> Vec<CameraDevice>;

    /// The camera facing `position`, if any.
    fn device(&self, position: CameraPosition) -> Option<CameraDevice> {
        self.devices().into_iter().find(|d| d.position == position)
    }

    /// Whether a microphone is available.
    fn has_audio_device(&self) -> bool;

    /// Open a configuration bracket. Changes become visible on commit.
    fn begin_configuration(&mut self);

    fn commit_configuration(&mut self);

    fn add_input(&mut self, input: InputKind) -> Result<(), CaptureError>;

    fn remove_input(&mut self, input: InputKind);

    /// Inputs currently attached to the session.
    fn inputs(&self) -> Vec<InputKind>;

    fn add_output(&mut self, output: OutputKind) -> Result<(), CaptureError>;

    fn remove_output(&mut self, output: OutputKind);

    fn start_running(&mut self);

    fn stop_running(&mut self);

    fn is_running(&self) -> bool;

    /// Apply a device setting. Unsupported settings return
    /// `ConfigurationUnsupported`; callers treat every setting as optional.
    fn apply_setting(&mut self, position: CameraPosition, setting: DeviceSetting) -> Result<(), CaptureError>;

    /// Start writing a movie to `path`. `completion` fires once, after
    /// `stop_movie` or when the backend ends the recording on its own.
    fn start_movie(
        &mut self,
        path: &Path,
        settings: MovieSettings,
        completion: MovieCompletion,
    ) -> Result<(), CaptureError>;

    fn stop_movie(&mut self);

    /// Capture one still. `completion` fires once.
    fn capture_still(&mut self, completion: StillCompletion) -> Result<(), CaptureError>;
}
