use serde::{Deserialize, Serialize};

use super::camera_models::CameraPosition;

/// Physical orientation reported by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DeviceOrientation {
    #[default]
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
    FaceUp,
    FaceDown,
    Unknown,
}

/// Orientation written on the movie output connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VideoOrientation {
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
}

/// Display orientation tag attached to a captured still.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageOrientation {
    Up,
    Down,
    Left,
    Right,
    UpMirrored,
    DownMirrored,
    LeftMirrored,
    RightMirrored,
}

impl DeviceOrientation {
    /// Whether the reading describes an interface orientation. Flat and
    /// unknown readings never replace the last usable orientation.
    pub fn is_interface(&self) -> bool {
        matches!(
            self,
            Self::Portrait | Self::PortraitUpsideDown | Self::LandscapeLeft | Self::LandscapeRight
        )
    }

    /// Landscape readings map to the opposite connection orientation.
    pub fn video_orientation(&self) -> VideoOrientation {
        match self {
            Self::LandscapeLeft => VideoOrientation::LandscapeRight,
            Self::LandscapeRight => VideoOrientation::LandscapeLeft,
            Self::PortraitUpsideDown => VideoOrientation::PortraitUpsideDown,
            _ => VideoOrientation::Portrait,
        }
    }

    /// Fixed lookup: the front camera mirrors the back camera's mapping.
    pub fn image_orientation(&self, position: CameraPosition) -> ImageOrientation {
        let front = position.is_front();
        match self {
            Self::LandscapeLeft if front => ImageOrientation::DownMirrored,
            Self::LandscapeLeft => ImageOrientation::Up,
            Self::LandscapeRight if front => ImageOrientation::UpMirrored,
            Self::LandscapeRight => ImageOrientation::Down,
            Self::PortraitUpsideDown if front => ImageOrientation::RightMirrored,
            Self::PortraitUpsideDown => ImageOrientation::Left,
            _ if front => ImageOrientation::LeftMirrored,
            _ => ImageOrientation::Right,
        }
    }
}

impl ImageOrientation {
    pub fn is_mirrored(&self) -> bool {
        matches!(
            self,
            Self::UpMirrored | Self::DownMirrored | Self::LeftMirrored | Self::RightMirrored
        )
    }

    /// True when the stored pixels are rotated a quarter turn from display.
    pub fn swaps_axes(&self) -> bool {
        matches!(
            self,
            Self::Left | Self::Right | Self::LeftMirrored | Self::RightMirrored
        )
    }
}
