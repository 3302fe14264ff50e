//! Container-agnostic decoding with EXIF orientation handling.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::{DynamicImage, ImageReader, RgbaImage};
use log::debug;

use super::{DecodeError, Orientation};

/// Decode image bytes to RGBA, applying EXIF orientation correction.
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` if the container is not recognized,
/// `DecodeError::CorruptedFile` if decoding fails part-way, and
/// `DecodeError::EmptyImage` for a zero-sized result.
pub fn decode_image(bytes: &[u8]) -> Result<RgbaImage, DecodeError> {
    let orientation = extract_orientation(bytes);
    let img = read_dynamic(bytes)?;
    if orientation != Orientation::Normal {
        debug!("applying EXIF orientation {:?}", orientation);
    }
    finish(orientation.apply(img))
}

fn read_dynamic(bytes: &[u8]) -> Result<DynamicImage, DecodeError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;
    if reader.format().is_none() {
        return Err(DecodeError::InvalidFormat);
    }

    reader
        .decode()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))
}

fn finish(img: DynamicImage) -> Result<RgbaImage, DecodeError> {
    let rgba = img.into_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(DecodeError::EmptyImage { width, height });
    }
    Ok(rgba)
}

/// Returns `Orientation::Normal` if no EXIF data is found.
fn extract_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);
    match Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .map(Orientation::from_exif)
            .unwrap_or_default(),
        Err(_) => Orientation::Normal,
    }
}
