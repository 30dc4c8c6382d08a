use std::fs;
use std::path::{Path, PathBuf};

use crate::models::error::CaptureError;

/// Extension of movie files written to the scratch directory.
pub const MOVIE_EXTENSION: &str = "mov";

/// Allocate a fresh movie path in `directory`, creating it if needed.
///
/// Names are random (`<uuid>.mov`) so repeated recordings never collide.
/// Nothing is written; the movie output creates the file.
pub fn movie_path(directory: &Path) -> Result<PathBuf, CaptureError> {
    fs::create_dir_all(directory)
        .map_err(|e| CaptureError::StorageError(format!("failed to create scratch directory: {}", e)))?;
    let file_name = format!("{}.{}", uuid::Uuid::new_v4(), MOVIE_EXTENSION);
    Ok(directory.join(file_name))
}
