use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};

use crate::models::camera_models::CameraPosition;
use crate::models::capture_result::CapturedPhoto;
use crate::models::error::CaptureError;
use crate::models::orientation::ImageOrientation;

/// Turn raw still bytes into a displayable photo.
///
/// The pixels stay in sensor order and `orientation` tags how to display
/// them. With `fill` set (display pixels), the still is scaled and
/// center-cropped to cover that size and re-encoded at `quality`.
pub fn develop(
    jpeg: Vec<u8>,
    orientation: ImageOrientation,
    position: CameraPosition,
    fill: Option<(u32, u32)>,
    quality: u8,
) -> Result<CapturedPhoto, CaptureError> {
    let image = image::load_from_memory_with_format(&jpeg, ImageFormat::Jpeg)
        .map_err(|e| CaptureError::CaptureFailed(format!("failed to decode still image: {}", e)))?;

    let Some((width, height)) = fill else {
        return Ok(CapturedPhoto {
            width: image.width(),
            height: image.height(),
            bytes: jpeg,
            orientation,
            position,
        });
    };

    let filled = aspect_fill(&image, width, height, orientation);
    let bytes = encode_jpeg(&filled, quality)?;
    log::debug!(
        "aspect-filled still {}x{} -> {}x{}",
        image.width(),
        image.height(),
        filled.width(),
        filled.height()
    );

    Ok(CapturedPhoto {
        width: filled.width(),
        height: filled.height(),
        bytes,
        orientation,
        position,
    })
}

/// Scale and center-crop `image` so that, once displayed with
/// `orientation`, it covers `width`x`height` exactly.
pub fn aspect_fill(
    image: &DynamicImage,
    width: u32,
    height: u32,
    orientation: ImageOrientation,
) -> DynamicImage {
    let (target_width, target_height) = if orientation.swaps_axes() {
        (height, width)
    } else {
        (width, height)
    };
    image.resize_to_fill(target_width, target_height, FilterType::Triangle)
}

pub fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>, CaptureError> {
    let mut bytes = Vec::new();
    let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut bytes), quality);
    DynamicImage::ImageRgb8(image.to_rgb8())
        .write_with_encoder(encoder)
        .map_err(|e| CaptureError::CaptureFailed(format!("failed to encode still image: {}", e)))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use image::{Rgb, RgbImage};

    use super::*;

    fn sample_jpeg(width: u32, height: u32) -> Vec<u8> {
        let image = RgbImage::from_fn(width, height, |x, y| Rgb([x as u8, y as u8, 128]));
        encode_jpeg(&DynamicImage::ImageRgb8(image), 90).unwrap()
    }

    #[test]
    fn keeps_original_bytes_without_fill() {
        let jpeg = sample_jpeg(64, 48);
        let photo = develop(jpeg.clone(), ImageOrientation::Right, CameraPosition::Back, None, 90).unwrap();
        assert_eq!(photo.bytes, jpeg);
        assert_eq!((photo.width, photo.height), (64, 48));
        assert_eq!(photo.orientation, ImageOrientation::Right);
    }

    #[test]
    fn fill_respects_display_rotation() {
        let jpeg = sample_jpeg(64, 48);

        // Displayed rotated: a 30x40 preview needs 40x30 stored pixels.
        let rotated = develop(jpeg.clone(), ImageOrientation::Right, CameraPosition::Back, Some((30, 40)), 80).unwrap();
        assert_eq!((rotated.width, rotated.height), (40, 30));

        let upright = develop(jpeg, ImageOrientation::Up, CameraPosition::Back, Some((30, 40)), 80).unwrap();
        assert_eq!((upright.width, upright.height), (30, 40));

        let decoded = image::load_from_memory(&upright.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (30, 40));
    }

    #[test]
    fn garbage_bytes_fail_the_capture() {
        let err = develop(vec![0, 1, 2, 3], ImageOrientation::Up, CameraPosition::Front, None, 90).unwrap_err();
        assert!(matches!(err, CaptureError::CaptureFailed(_)));
    }
}
