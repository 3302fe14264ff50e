//! Decoder error and EXIF orientation types.

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error types for image decoding operations.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The file format is not recognized or supported.
    #[error("Invalid or unsupported image format")]
    InvalidFormat,

    /// The image file is corrupted or incomplete.
    #[error("Corrupted or incomplete image file: {0}")]
    CorruptedFile(String),

    /// Decoded image has no pixels.
    #[error("Decoded image is empty ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
}

/// How stored pixels must be turned to appear upright, per the EXIF
/// `Orientation` tag (values 1-8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Orientation {
    #[default]
    Normal = 1,
    FlipHorizontal = 2,
    Rotate180 = 3,
    FlipVertical = 4,
    /// Mirrored across the main diagonal.
    Transpose = 5,
    Rotate90CW = 6,
    /// Mirrored across the anti-diagonal.
    Transverse = 7,
    Rotate270CW = 8,
}

impl Orientation {
    /// Map a raw tag value. Out-of-range values are treated as upright.
    pub fn from_exif(value: u32) -> Self {
        match value {
            2 => Self::FlipHorizontal,
            3 => Self::Rotate180,
            4 => Self::FlipVertical,
            5 => Self::Transpose,
            6 => Self::Rotate90CW,
            7 => Self::Transverse,
            8 => Self::Rotate270CW,
            _ => Self::Normal,
        }
    }

    /// Turn `img` upright.
    pub fn apply(self, img: DynamicImage) -> DynamicImage {
        match self {
            Self::Normal => img,
            Self::FlipHorizontal => img.fliph(),
            Self::Rotate180 => img.rotate180(),
            Self::FlipVertical => img.flipv(),
            Self::Transpose => img.rotate90().fliph(),
            Self::Rotate90CW => img.rotate90(),
            Self::Transverse => img.rotate270().fliph(),
            Self::Rotate270CW => img.rotate270(),
        }
    }
}
