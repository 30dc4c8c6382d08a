use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::camera_models::CameraPosition;
use super::orientation::ImageOrientation;

/// A decoded still, ready for the review screen.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedPhoto {
    /// JPEG bytes.
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub orientation: ImageOrientation,
    pub position: CameraPosition,
}

/// A finalized movie file in the scratch directory.
///
/// The file is owned by the host once delivered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecording {
    pub id: String,
    pub file_path: PathBuf,
    pub duration_secs: f64,
    pub position: CameraPosition,
    pub created_at: DateTime<Utc>,
}

impl VideoRecording {
    pub fn new(file_path: PathBuf, duration_secs: f64, position: CameraPosition) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            file_path,
            duration_secs,
            position,
            created_at: Utc::now(),
        }
    }
}

/// Outcome of one capture attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureResult {
    Photo(CapturedPhoto),
    Video(VideoRecording),
    Cancelled,
}
