//! Synthetic frames and the virtual movie container.
//!
//! Movies are written as `MOVIE_MAGIC`, one orientation byte, then a
//! sequence of length-prefixed (u32 little endian) JPEG frames.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::imageops;
use image::{Rgb, RgbImage};

use owl_capture_core::models::camera_models::CameraPosition;
use owl_capture_core::models::error::CaptureError;
use owl_capture_core::models::orientation::VideoOrientation;

pub const MOVIE_MAGIC: &[u8; 8] = b"OWLMOV01";

const BARS: [[u8; 3]; 7] = [
    [235, 235, 235],
    [235, 235, 16],
    [16, 235, 235],
    [16, 235, 16],
    [235, 16, 235],
    [235, 16, 16],
    [16, 16, 235],
];

/// Color bars that scroll one column per frame. The front camera's bars run
/// dimmer so the two facings are distinguishable.
pub fn test_pattern(width: u32, height: u32, position: CameraPosition, sequence: u64) -> RgbImage {
    let width = width.max(1);
    let shift = (sequence % u64::from(width)) as u32;
    let dim = if position.is_front() { 2 } else { 1 };
    RgbImage::from_fn(width, height.max(1), |x, _| {
        let column = (x + shift) % width;
        let bar = (column as usize * BARS.len()) / width as usize;
        let [r, g, b] = BARS[bar];
        Rgb([r / dim, g / dim, b / dim])
    })
}

/// Brighten every pixel, as a fired flash would.
pub fn apply_flash(frame: &mut RgbImage) {
    for pixel in frame.pixels_mut() {
        for channel in pixel.0.iter_mut() {
            *channel = channel.saturating_add(40);
        }
    }
}

pub fn mirror(frame: &RgbImage) -> RgbImage {
    imageops::flip_horizontal(frame)
}

pub fn encode_frame(frame: &RgbImage, quality: u8) -> Result<Vec<u8>, CaptureError> {
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(Cursor::new(&mut bytes), quality)
        .encode_image(frame)
        .map_err(|e| CaptureError::CaptureFailed(format!("failed to encode frame: {}", e)))?;
    Ok(bytes)
}

pub fn orientation_tag(orientation: VideoOrientation) -> u8 {
    match orientation {
        VideoOrientation::Portrait => 0,
        VideoOrientation::PortraitUpsideDown => 1,
        VideoOrientation::LandscapeLeft => 2,
        VideoOrientation::LandscapeRight => 3,
    }
}

/// Frame header for one movie chunk.
pub fn frame_header(len: usize) -> Result<[u8; 4], CaptureError> {
    let len = u32::try_from(len).map_err(|_| CaptureError::StorageError("frame too large".into()))?;
    Ok(len.to_le_bytes())
}

/// A movie file read back.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieContents {
    pub orientation_tag: u8,
    pub frames: Vec<Vec<u8>>,
}

/// Parse a movie written by `VirtualCamera`.
pub fn read_movie(path: &Path) -> Result<MovieContents, CaptureError> {
    let data = fs::read(path).map_err(|e| CaptureError::StorageError(format!("{}: {}", path.display(), e)))?;
    let body = data
        .strip_prefix(MOVIE_MAGIC.as_slice())
        .ok_or_else(|| CaptureError::StorageError("not a virtual movie file".into()))?;
    let (&orientation_tag, mut rest) = body
        .split_first()
        .ok_or_else(|| CaptureError::StorageError("truncated movie header".into()))?;

    let mut frames = Vec::new();
    while !rest.is_empty() {
        let (len, tail) = rest
            .split_first_chunk::<4>()
            .ok_or_else(|| CaptureError::StorageError("truncated frame header".into()))?;
        let len = u32::from_le_bytes(*len) as usize;
        if tail.len() < len {
            return Err(CaptureError::StorageError("truncated frame".into()));
        }
        let (frame, tail) = tail.split_at(len);
        frames.push(frame.to_vec());
        rest = tail;
    }

    Ok(MovieContents { orientation_tag, frames })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_scrolls_with_sequence() {
        let a = test_pattern(14, 2, CameraPosition::Back, 0);
        let b = test_pattern(14, 2, CameraPosition::Back, 2);
        assert_eq!(a.get_pixel(2, 0), b.get_pixel(0, 0));
        assert_ne!(a, b);
    }

    #[test]
    fn front_pattern_is_dimmer() {
        let back = test_pattern(7, 1, CameraPosition::Back, 0);
        let front = test_pattern(7, 1, CameraPosition::Front, 0);
        assert_eq!(front.get_pixel(0, 0).0[0], back.get_pixel(0, 0).0[0] / 2);
    }

    #[test]
    fn mirror_flips_columns() {
        let frame = test_pattern(7, 1, CameraPosition::Front, 0);
        let mirrored = mirror(&frame);
        assert_eq!(mirrored.get_pixel(0, 0), frame.get_pixel(6, 0));
    }

    #[test]
    fn reads_back_written_movie() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mov");
        let frame = encode_frame(&test_pattern(8, 8, CameraPosition::Back, 0), 80).unwrap();

        let mut data = MOVIE_MAGIC.to_vec();
        data.push(orientation_tag(VideoOrientation::LandscapeRight));
        data.extend_from_slice(&frame_header(frame.len()).unwrap());
        data.extend_from_slice(&frame);
        fs::write(&path, data).unwrap();

        let movie = read_movie(&path).unwrap();
        assert_eq!(movie.orientation_tag, 3);
        assert_eq!(movie.frames, vec![frame]);
    }

    #[test]
    fn rejects_foreign_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, b"hello").unwrap();
        assert!(matches!(read_movie(&path), Err(CaptureError::StorageError(_))));
    }
}
