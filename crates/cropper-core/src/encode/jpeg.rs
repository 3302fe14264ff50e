//! JPEG encoding for lossy export.
//!
//! JPEG has no alpha channel, so pixels are composited over black first,
//! matching what a browser canvas produces for `image/jpeg` blobs.

use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;
use image::ImageEncoder;
use std::io::Cursor;

use super::{validate_rgba, EncodeError};

/// Encode RGBA pixel data to JPEG bytes.
///
/// # Arguments
///
/// * `pixels` - RGBA pixel data (4 bytes per pixel, row-major order)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `quality` - JPEG quality (1-100, where 100 is highest quality)
///
/// Quality values outside 1-100 are clamped.
pub fn encode_jpeg(
    pixels: &[u8],
    width: u32,
    height: u32,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    validate_rgba(pixels, width, height)?;

    let quality = quality.clamp(1, 100);
    let rgb = flatten_over_black(pixels);

    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    encoder
        .write_image(&rgb, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed {
            format: "JPEG",
            message: e.to_string(),
        })?;

    Ok(buffer.into_inner())
}

/// Drop alpha by compositing each pixel over opaque black.
fn flatten_over_black(pixels: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(pixels.len() / 4 * 3);
    for px in pixels.chunks_exact(4) {
        let alpha = px[3] as u32;
        for &channel in &px[..3] {
            rgb.push(((channel as u32 * alpha + 127) / 255) as u8);
        }
    }
    rgb
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray(width: usize, height: usize) -> Vec<u8> {
        [128u8, 128, 128, 255].repeat(width * height)
    }

    #[test]
    fn test_encode_jpeg_basic() {
        let jpeg_bytes = encode_jpeg(&gray(100, 100), 100, 100, 90).unwrap();

        // SOI marker
        assert_eq!(&jpeg_bytes[0..2], &[0xFF, 0xD8]);
        // EOI marker
        let len = jpeg_bytes.len();
        assert_eq!(&jpeg_bytes[len - 2..], &[0xFF, 0xD9]);
    }

    #[test]
    fn test_encode_jpeg_quality_clamping() {
        let pixels = gray(10, 10);
        assert!(encode_jpeg(&pixels, 10, 10, 0).is_ok());
        assert!(encode_jpeg(&pixels, 10, 10, 255).is_ok());
    }

    #[test]
    fn test_encode_jpeg_invalid_pixel_data() {
        let pixels = gray(99, 100); // one row short
        let result = encode_jpeg(&pixels, 100, 100, 90);
        assert!(matches!(result, Err(EncodeError::InvalidPixelData { .. })));
    }

    #[test]
    fn test_encode_jpeg_zero_dimensions() {
        let result = encode_jpeg(&[], 0, 100, 90);
        assert!(matches!(result, Err(EncodeError::InvalidDimensions { .. })));
        let result = encode_jpeg(&[], 100, 0, 90);
        assert!(matches!(result, Err(EncodeError::InvalidDimensions { .. })));
    }

    #[test]
    fn test_encode_jpeg_decodes_back_to_size() {
        let jpeg = encode_jpeg(&gray(48, 20), 48, 20, 90).unwrap();
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (48, 20));
    }

    #[test]
    fn test_flatten_over_black() {
        let rgb = flatten_over_black(&[200, 100, 50, 255, 200, 100, 50, 0, 255, 255, 255, 128]);
        assert_eq!(rgb, vec![200, 100, 50, 0, 0, 0, 128, 128, 128]);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
