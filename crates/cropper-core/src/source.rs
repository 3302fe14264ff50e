//! Decoded source images and their on-screen layout.

use image::RgbaImage;

use crate::error::InvalidInput;
use crate::transform::{scale_factors, ScaleFactors, Size};

/// A decoded image together with the size it is displayed at.
///
/// Both sizes are guaranteed non-zero, so the scale factors between them are
/// always defined.
#[derive(Debug, Clone)]
pub struct ImageHandle {
    pixels: RgbaImage,
    displayed: Size,
}

impl ImageHandle {
    /// Wrap decoded pixels laid out at `displayed`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the image or the displayed size has a zero
    /// dimension.
    pub fn new(pixels: RgbaImage, displayed: Size) -> Result<Self, InvalidInput> {
        let (width, height) = pixels.dimensions();
        if width == 0 || height == 0 {
            return Err(InvalidInput::ZeroNaturalDimension { width, height });
        }
        check_displayed(displayed)?;
        Ok(Self { pixels, displayed })
    }

    /// Wrap decoded pixels and lay them out inside `bounds` without upscaling.
    pub fn fitted(pixels: RgbaImage, bounds: Size) -> Result<Self, InvalidInput> {
        let natural = Size::new(pixels.width(), pixels.height());
        let displayed = fit_within(natural, bounds);
        Self::new(pixels, displayed)
    }

    /// Source dimensions in pixels.
    pub fn natural(&self) -> Size {
        Size::new(self.pixels.width(), self.pixels.height())
    }

    /// Dimensions as laid out on screen.
    pub fn displayed(&self) -> Size {
        self.displayed
    }

    /// Update the on-screen size after a relayout.
    pub fn set_displayed(&mut self, displayed: Size) -> Result<(), InvalidInput> {
        check_displayed(displayed)?;
        self.displayed = displayed;
        Ok(())
    }

    pub fn scale_factors(&self) -> ScaleFactors {
        // both sizes are non-zero by construction
        ScaleFactors {
            x: self.pixels.width() as f64 / self.displayed.width as f64,
            y: self.pixels.height() as f64 / self.displayed.height as f64,
        }
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

fn check_displayed(displayed: Size) -> Result<(), InvalidInput> {
    // reuse the mapper's guard so both paths report the same error
    scale_factors(Size::new(1, 1), displayed).map(|_| ())
}

/// Size an image takes when laid out inside `bounds`, the way
/// `max-width`/`max-height` shrink an `<img>`: aspect ratio preserved, never
/// enlarged, never below one pixel per edge.
pub fn fit_within(natural: Size, bounds: Size) -> Size {
    if natural.is_empty() || bounds.is_empty() {
        return natural;
    }
    if natural.width <= bounds.width && natural.height <= bounds.height {
        return natural;
    }

    let ratio = (bounds.width as f64 / natural.width as f64)
        .min(bounds.height as f64 / natural.height as f64);
    let width = (natural.width as f64 * ratio).round() as u32;
    let height = (natural.height as f64 * ratio).round() as u32;
    Size::new(
        width.clamp(1, bounds.width),
        height.clamp(1, bounds.height),
    )
}
