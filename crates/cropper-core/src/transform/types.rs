//! Geometry value types shared by the mapper, renderer and exporter.

use serde::{Deserialize, Serialize};

use crate::error::InvalidInput;

/// Integer pixel dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True if either edge is zero.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Number of pixels, widened so large surfaces cannot overflow.
    #[inline]
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// A crop rectangle in displayed-pixel space.
///
/// Values may be fractional; the selection UI reports sub-pixel positions
/// while dragging.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CropRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CropRect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A zero-area rectangle never counts as a completed crop.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Reject non-finite components and negative extents.
    pub fn validate(&self) -> Result<(), InvalidInput> {
        let finite = self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite();
        if !finite || self.width < 0.0 || self.height < 0.0 {
            return Err(InvalidInput::InvalidCrop {
                x: self.x,
                y: self.y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

/// Post-crop scale and rotation, both pivoting on the natural image center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransformParams {
    /// Uniform zoom factor (>= 0).
    pub scale: f64,
    /// Rotation in degrees, clockwise on screen (y axis points down).
    pub rotate_degrees: f64,
}

impl Default for TransformParams {
    fn default() -> Self {
        Self {
            scale: 1.0,
            rotate_degrees: 0.0,
        }
    }
}

impl TransformParams {
    pub fn new(scale: f64, rotate_degrees: f64) -> Self {
        Self {
            scale,
            rotate_degrees,
        }
    }

    /// Check if this is the identity transform.
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    pub fn validate(&self) -> Result<(), InvalidInput> {
        if !self.scale.is_finite() || self.scale < 0.0 {
            return Err(InvalidInput::InvalidScale(self.scale));
        }
        if !self.rotate_degrees.is_finite() {
            return Err(InvalidInput::InvalidRotation(self.rotate_degrees));
        }
        Ok(())
    }
}
