use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::camera_models::CameraPosition;
use super::error::CaptureError;
use super::mode::CaptureMode;

/// Configuration for a capture screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OwlConfiguration {
    /// Photo or video; the recording limit lives in the video variant.
    pub mode: CaptureMode,

    /// Directory that receives one movie file per recording attempt.
    /// Files are never removed by the core.
    pub scratch_directory: PathBuf,

    /// Camera used when the session is first configured (default: back).
    pub initial_position: CameraPosition,

    /// Preview size in pixels. When set, stills are aspect-filled into it.
    pub preview_size: Option<(u32, u32)>,

    /// JPEG quality used when a still is re-encoded after aspect fill.
    pub jpeg_quality: u8,
}

impl OwlConfiguration {
    pub fn photo() -> Self {
        Self::default()
    }

    pub fn video(max_duration_secs: u32) -> Result<Self, CaptureError> {
        let mode = CaptureMode::video(max_duration_secs).ok_or_else(|| {
            CaptureError::InvalidConfiguration("video duration must be at least one second".into())
        })?;
        Ok(Self {
            mode,
            ..Self::default()
        })
    }

    pub fn from_json(json: &str) -> Result<Self, CaptureError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| CaptureError::InvalidConfiguration(format!("failed to parse configuration: {}", e)))?;
        config.validate().map_err(CaptureError::InvalidConfiguration)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.scratch_directory.as_os_str().is_empty() {
            return Err("scratch directory must not be empty".into());
        }
        if let Some((width, height)) = self.preview_size {
            if width == 0 || height == 0 {
                return Err(format!("invalid preview size: {}x{}", width, height));
            }
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(format!("unsupported jpeg quality: {}", self.jpeg_quality));
        }
        Ok(())
    }
}

impl Default for OwlConfiguration {
    fn default() -> Self {
        Self {
            mode: CaptureMode::Photo,
            scratch_directory: std::env::temp_dir(),
            initial_position: CameraPosition::Back,
            preview_size: None,
            jpeg_quality: 90,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid_photo() {
        let config = OwlConfiguration::default();
        assert!(config.mode.is_photo());
        assert_eq!(config.initial_position, CameraPosition::Back);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_length_video_is_invalid() {
        assert!(matches!(
            OwlConfiguration::video(0),
            Err(CaptureError::InvalidConfiguration(_))
        ));
        assert_eq!(OwlConfiguration::video(10).unwrap().mode.max_duration_secs(), 10);
    }

    #[test]
    fn rejects_degenerate_preview() {
        let config = OwlConfiguration {
            preview_size: Some((0, 480)),
            ..OwlConfiguration::default()
        };
        assert_eq!(config.validate(), Err("invalid preview size: 0x480".to_string()));
    }

    #[test]
    fn rejects_out_of_range_quality() {
        let config = OwlConfiguration {
            jpeg_quality: 0,
            ..OwlConfiguration::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn parses_partial_json() {
        let config = OwlConfiguration::from_json(
            r#"{"mode":{"type":"video","max_duration_secs":30},"initial_position":"front","scratch_directory":"/tmp/owl"}"#,
        )
        .unwrap();
        assert_eq!(config.mode.max_duration_secs(), 30);
        assert_eq!(config.initial_position, CameraPosition::Front);
        assert_eq!(config.scratch_directory, PathBuf::from("/tmp/owl"));
        assert_eq!(config.jpeg_quality, 90);
    }

    #[test]
    fn json_with_invalid_values_fails_validation() {
        let err = OwlConfiguration::from_json(r#"{"jpeg_quality":101}"#).unwrap_err();
        assert!(matches!(err, CaptureError::InvalidConfiguration(_)));

        let err = OwlConfiguration::from_json(r#"{"mode":{"type":"video","max_duration_secs":0}}"#).unwrap_err();
        assert!(matches!(err, CaptureError::InvalidConfiguration(_)));
    }
}
