//! # owl-capture-core
//!
//! Platform-agnostic camera capture core for LittleOwl.
//!
//! Provides the shutter state machine, recording countdown, capture session
//! orchestration and the screen controller. Platform backends implement the
//! `CaptureBackend` trait and plug into the generic `CaptureSession`, which
//! runs on a dedicated worker thread behind `CaptureController`.
//!
//! ## Architecture
//!
//! ```text
//! owl-capture-core (this crate)
//! ├── traits/       ← CaptureBackend, PermissionProvider, CaptureDelegate
//! ├── models/       ← CaptureMode, CaptureError, CapturePhase, OwlConfiguration, orientations
//! ├── shutter/      ← ShutterControl, RecordingTimer, shutter visuals
//! ├── session/      ← CaptureSession (generic orchestrator), SessionWorker
//! ├── controller/   ← CaptureController, screen stack and chrome
//! ├── processing/   ← still decoding and aspect fill
//! └── storage/      ← scratch movie files
//! ```

pub mod controller;
pub mod models;
pub mod processing;
pub mod session;
pub mod shutter;
pub mod storage;
pub mod traits;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export key types at crate root for convenience.
pub use controller::capture_controller::CaptureController;
pub use controller::screen::{ChromeState, Screen};
pub use models::camera_models::{
    AuthorizationStatus, CameraDevice, CameraPosition, DeviceSetting, FlashStrategy, InputKind, MediaKind,
    MovieSettings, OutputKind,
};
pub use models::capture_result::{CaptureResult, CapturedPhoto, VideoRecording};
pub use models::config::OwlConfiguration;
pub use models::error::CaptureError;
pub use models::mode::CaptureMode;
pub use models::orientation::{DeviceOrientation, ImageOrientation, VideoOrientation};
pub use models::state::{CapturePhase, RecordingEndReason, ShutterState};
pub use session::capture_session::{CaptureSession, SessionSnapshot, StopOutcome};
pub use session::worker::{SessionCommand, SessionEvent, SessionWorker};
pub use shutter::control::{ShutterControl, ShutterEvent};
pub use shutter::timer::{RecordingTimer, TimerEvent};
pub use shutter::visuals::{ShutterAnimation, ShutterVisuals};
pub use traits::capture_backend::{CaptureBackend, MovieCompletion, StillCompletion};
pub use traits::capture_delegate::CaptureDelegate;
pub use traits::permission_provider::{AccessReply, PermissionProvider};
