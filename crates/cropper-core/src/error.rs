//! Error types for the crop pipeline.
//!
//! Every error aborts the single render, export or publish call that raised
//! it. Previously published artifacts are never touched on failure.

use thiserror::Error;

use crate::decode::DecodeError;
use crate::encode::EncodeError;

/// Errors raised by the crop, preview and export pipeline.
#[derive(Debug, Error)]
pub enum CropError {
    /// The caller handed the pipeline something it cannot work with.
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] InvalidInput),

    /// The image source could not be decoded.
    #[error("Decoding failed: {0}")]
    DecodeFailed(#[from] DecodeError),

    /// No drawing context could be acquired for a surface of this size.
    #[error("No drawing context available for a {width}x{height} surface")]
    RenderContextUnavailable { width: u32, height: u32 },

    /// The output surface could not be encoded.
    #[error("Encoding failed: {0}")]
    EncodeFailed(#[from] EncodeError),

    /// The blob registry refused to mint a handle.
    #[error("Publishing failed: {0}")]
    PublishFailed(String),
}

/// Reasons an input is rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidInput {
    /// Displayed size has a zero edge, so scale factors are undefined.
    #[error("displayed size {width}x{height} has a zero dimension")]
    ZeroDisplayedDimension { width: u32, height: u32 },

    /// The source image has no pixels.
    #[error("natural size {width}x{height} has a zero dimension")]
    ZeroNaturalDimension { width: u32, height: u32 },

    /// No completed, non-empty crop rectangle exists.
    #[error("no completed crop")]
    NoActiveCrop,

    /// No image has been loaded into the session.
    #[error("no image loaded")]
    NoImage,

    /// Export was requested before a preview was rendered for the current crop.
    #[error("preview has not been rendered")]
    PreviewNotRendered,

    /// Crop rectangle has a negative or non-finite component.
    #[error("crop rectangle {x},{y} {width}x{height} is not valid")]
    InvalidCrop { x: f64, y: f64, width: f64, height: f64 },

    /// Device pixel ratio must be finite and at least 1.
    #[error("pixel ratio {0} must be finite and >= 1")]
    InvalidPixelRatio(f64),

    /// Transform scale must be finite and non-negative.
    #[error("scale {0} must be finite and >= 0")]
    InvalidScale(f64),

    /// Rotation must be finite.
    #[error("rotation {0} must be finite")]
    InvalidRotation(f64),

    /// JPEG quality outside 1-100.
    #[error("JPEG quality {0} must be between 1 and 100")]
    InvalidQuality(u8),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_display() {
        let err = CropError::from(InvalidInput::NoActiveCrop);
        assert_eq!(err.to_string(), "Invalid input: no completed crop");

        let err = CropError::from(InvalidInput::ZeroDisplayedDimension {
            width: 0,
            height: 375,
        });
        assert_eq!(
            err.to_string(),
            "Invalid input: displayed size 0x375 has a zero dimension"
        );
    }

    #[test]
    fn test_render_context_display() {
        let err = CropError::RenderContextUnavailable {
            width: 0,
            height: 10,
        };
        assert_eq!(
            err.to_string(),
            "No drawing context available for a 0x10 surface"
        );
    }

    #[test]
    fn test_encode_error_converts() {
        let err = CropError::from(EncodeError::InvalidDimensions {
            width: 0,
            height: 0,
        });
        assert!(matches!(err, CropError::EncodeFailed(_)));
    }

    #[test]
    fn test_decode_error_converts() {
        let err = CropError::from(DecodeError::InvalidFormat);
        assert_eq!(
            err.to_string(),
            "Decoding failed: Invalid or unsupported image format"
        );
    }
}
