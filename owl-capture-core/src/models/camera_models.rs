use serde::{Deserialize, Serialize};

use super::mode::CaptureMode;
use super::orientation::VideoOrientation;

/// Which way the active camera faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraPosition {
    Front,
    #[default]
    Back,
}

impl CameraPosition {
    pub fn opposite(self) -> Self {
        match self {
            Self::Front => Self::Back,
            Self::Back => Self::Front,
        }
    }

    pub fn is_front(self) -> bool {
        matches!(self, Self::Front)
    }

    /// Flash control is disabled while recording video on the front camera.
    pub fn allows_flash_control(self, mode: CaptureMode) -> bool {
        !(mode.is_video() && self.is_front())
    }
}

/// Capability the host must grant before a session is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Video,
    Audio,
}

/// Authorization state reported by the platform permission system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthorizationStatus {
    NotDetermined,
    Restricted,
    Denied,
    Authorized,
}

impl AuthorizationStatus {
    pub fn is_authorized(&self) -> bool {
        matches!(self, Self::Authorized)
    }
}

/// Session input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKind {
    Video(CameraPosition),
    Audio,
}

/// Session output. A session carries at most one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputKind {
    Still,
    Movie,
}

/// Best-effort device tuning applied through the backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeviceSetting {
    ContinuousAutoFocus,
    SmoothAutoFocus,
    ContinuousAutoExposure,
    ContinuousAutoWhiteBalance,
    LowLightBoost,
    VideoStabilization,
    Torch(bool),
    Flash(bool),
    Zoom(f64),
}

impl DeviceSetting {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ContinuousAutoFocus => "continuous-autofocus",
            Self::SmoothAutoFocus => "smooth-autofocus",
            Self::ContinuousAutoExposure => "continuous-exposure",
            Self::ContinuousAutoWhiteBalance => "continuous-white-balance",
            Self::LowLightBoost => "low-light-boost",
            Self::VideoStabilization => "video-stabilization",
            Self::Torch(_) => "torch",
            Self::Flash(_) => "flash",
            Self::Zoom(_) => "zoom",
        }
    }
}

/// A camera available for capture.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraDevice {
    pub id: String,
    pub name: String,
    pub position: CameraPosition,
    pub has_flash: bool,
    pub has_torch: bool,
    pub max_zoom_factor: f64,
}

/// Connection settings applied when a movie recording starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovieSettings {
    pub orientation: VideoOrientation,
    pub mirrored: bool,
}

/// How the still capture is lit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashStrategy {
    /// Flash is off, or unavailable on this device.
    Off,
    /// Device flash fires with the capture.
    Hardware,
    /// No flash on this device; the host whitens the screen instead.
    Screen,
}
