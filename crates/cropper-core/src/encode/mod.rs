//! Raster encoding for exported crops.
//!
//! This module provides:
//! - PNG encoding (lossless, the default export format)
//! - JPEG encoding with configurable quality
//!
//! All encoders take straight-alpha RGBA pixels in row-major order.

mod jpeg;
mod png;

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use jpeg::encode_jpeg;
pub use png::encode_png;

/// Errors that can occur during encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 4), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The underlying encoder failed
    #[error("{format} encoding failed: {message}")]
    EncodingFailed {
        format: &'static str,
        message: String,
    },
}

/// Export raster format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutputFormat {
    /// Lossless PNG with alpha.
    #[default]
    Png,
    /// Lossy JPEG; transparent areas come out black.
    Jpeg {
        /// 1-100, where 100 is highest quality
        quality: u8,
    },
}

impl OutputFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
            OutputFormat::Jpeg { .. } => "image/jpeg",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg { .. } => "jpg",
        }
    }
}

/// Encode an RGBA image in the given format.
pub fn encode_image(image: &RgbaImage, format: &OutputFormat) -> Result<Vec<u8>, EncodeError> {
    let (width, height) = image.dimensions();
    match format {
        OutputFormat::Png => encode_png(image.as_raw(), width, height),
        OutputFormat::Jpeg { quality } => encode_jpeg(image.as_raw(), width, height, *quality),
    }
}

/// Shared argument checks for every encoder.
fn validate_rgba(pixels: &[u8], width: u32, height: u32) -> Result<(), EncodeError> {
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let expected = (width as usize) * (height as usize) * 4;
    if pixels.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: pixels.len(),
        });
    }
    Ok(())
}
