//! PNG encoding, the default lossless export format.

use image::codecs::png::PngEncoder;
use image::ExtendedColorType;
use image::ImageEncoder;
use std::io::Cursor;

use super::{validate_rgba, EncodeError};

/// Encode RGBA pixel data to PNG bytes.
///
/// # Arguments
///
/// * `pixels` - RGBA pixel data (4 bytes per pixel, row-major order)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
pub fn encode_png(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>, EncodeError> {
    validate_rgba(pixels, width, height)?;

    let mut buffer = Cursor::new(Vec::new());
    PngEncoder::new(&mut buffer)
        .write_image(pixels, width, height, ExtendedColorType::Rgba8)
        .map_err(|e| EncodeError::EncodingFailed {
            format: "PNG",
            message: e.to_string(),
        })?;

    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_encode_png_signature() {
        let pixels = [255u8, 0, 0, 255].repeat(16 * 9);
        let png = encode_png(&pixels, 16, 9).unwrap();
        assert_eq!(&png[0..8], &PNG_SIGNATURE);
    }

    #[test]
    fn test_encode_png_is_lossless() {
        let pixels: Vec<u8> = (0..(7 * 5 * 4)).map(|i| (i * 37 % 256) as u8).collect();
        let png = encode_png(&pixels, 7, 5).unwrap();

        let decoded = image::load_from_memory(&png).unwrap().into_rgba8();
        assert_eq!(decoded.dimensions(), (7, 5));
        assert_eq!(decoded.into_raw(), pixels);
    }

    #[test]
    fn test_encode_png_invalid_input() {
        assert!(matches!(
            encode_png(&[0; 10], 2, 2),
            Err(EncodeError::InvalidPixelData { .. })
        ));
        assert!(matches!(
            encode_png(&[], 0, 0),
            Err(EncodeError::InvalidDimensions { .. })
        ));
    }
}
