//! Conversion between displayed and natural pixel space.
//!
//! The selection UI reports crops against the image as laid out on screen.
//! Everything drawn or exported works against the natural (decoded) pixels,
//! so every crop goes through the scale factors computed here first.

use super::types::{CropRect, Size, TransformParams};
use crate::error::InvalidInput;

/// Natural-per-displayed pixel ratios on each axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactors {
    pub x: f64,
    pub y: f64,
}

/// Compute `natural / displayed` on each axis.
///
/// # Errors
///
/// Returns `InvalidInput::ZeroDisplayedDimension` if either displayed edge is
/// zero, since the ratio is undefined.
pub fn scale_factors(natural: Size, displayed: Size) -> Result<ScaleFactors, InvalidInput> {
    if displayed.is_empty() {
        return Err(InvalidInput::ZeroDisplayedDimension {
            width: displayed.width,
            height: displayed.height,
        });
    }
    Ok(ScaleFactors {
        x: natural.width as f64 / displayed.width as f64,
        y: natural.height as f64 / displayed.height as f64,
    })
}

/// A crop resolved into natural space, with the pivot and rotation the
/// renderer needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropMapping {
    pub scale_x: f64,
    pub scale_y: f64,
    /// Crop origin in natural pixels.
    pub crop_x: f64,
    pub crop_y: f64,
    pub rotate_radians: f64,
    /// Natural image center, the pivot for rotation and scale.
    pub center_x: f64,
    pub center_y: f64,
    /// Uniform zoom about the center.
    pub scale: f64,
}

/// Resolve `crop` (displayed space) against an image of the given sizes.
pub fn map_crop(
    natural: Size,
    displayed: Size,
    crop: &CropRect,
    params: &TransformParams,
) -> Result<CropMapping, InvalidInput> {
    crop.validate()?;
    params.validate()?;
    let factors = scale_factors(natural, displayed)?;

    Ok(CropMapping {
        scale_x: factors.x,
        scale_y: factors.y,
        crop_x: crop.x * factors.x,
        crop_y: crop.y * factors.y,
        rotate_radians: params.rotate_degrees.to_radians(),
        center_x: natural.width as f64 / 2.0,
        center_y: natural.height as f64 / 2.0,
        scale: params.scale,
    })
}

/// Size of the preview surface: `floor(crop * scale * pixel_ratio)` per axis.
///
/// The multiplication order matters for exactness and matches the renderer.
pub fn preview_size(crop: &CropRect, factors: ScaleFactors, pixel_ratio: f64) -> Size {
    Size::new(
        (crop.width * factors.x * pixel_ratio).floor() as u32,
        (crop.height * factors.y * pixel_ratio).floor() as u32,
    )
}

/// Size of the exported raster: the crop at natural resolution.
///
/// Fractional results truncate toward zero, like an integer surface
/// constructor would.
pub fn natural_crop_size(crop: &CropRect, factors: ScaleFactors) -> Size {
    Size::new(
        (crop.width * factors.x).trunc() as u32,
        (crop.height * factors.y).trunc() as u32,
    )
}

/// Validate a device pixel ratio.
pub fn check_pixel_ratio(pixel_ratio: f64) -> Result<(), InvalidInput> {
    if !pixel_ratio.is_finite() || pixel_ratio < 1.0 {
        return Err(InvalidInput::InvalidPixelRatio(pixel_ratio));
    }
    Ok(())
}

impl CropMapping {
    pub fn factors(&self) -> ScaleFactors {
        ScaleFactors {
            x: self.scale_x,
            y: self.scale_y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NATURAL: Size = Size::new(4000, 3000);
    const DISPLAYED: Size = Size::new(500, 375);

    #[test]
    fn test_scale_factors() {
        let f = scale_factors(NATURAL, DISPLAYED).unwrap();
        assert_eq!(f, ScaleFactors { x: 8.0, y: 8.0 });

        let f = scale_factors(Size::new(300, 100), Size::new(200, 100)).unwrap();
        assert_eq!(f.x, 1.5);
        assert_eq!(f.y, 1.0);
    }

    #[test]
    fn test_zero_displayed_rejected() {
        assert_eq!(
            scale_factors(NATURAL, Size::new(0, 375)),
            Err(InvalidInput::ZeroDisplayedDimension {
                width: 0,
                height: 375
            })
        );
        assert!(scale_factors(NATURAL, Size::new(500, 0)).is_err());
    }

    #[test]
    fn test_map_crop() {
        let crop = CropRect::new(100.0, 75.0, 200.0, 150.0);
        let m = map_crop(NATURAL, DISPLAYED, &crop, &TransformParams::new(1.5, 90.0)).unwrap();

        assert_eq!(m.crop_x, 800.0);
        assert_eq!(m.crop_y, 600.0);
        assert_eq!(m.center_x, 2000.0);
        assert_eq!(m.center_y, 1500.0);
        assert_eq!(m.scale, 1.5);
        assert!((m.rotate_radians - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_map_crop_rejects_bad_input() {
        let crop = CropRect::new(0.0, 0.0, -5.0, 10.0);
        assert!(matches!(
            map_crop(NATURAL, DISPLAYED, &crop, &TransformParams::default()),
            Err(InvalidInput::InvalidCrop { .. })
        ));

        let crop = CropRect::new(0.0, 0.0, 5.0, 10.0);
        assert!(matches!(
            map_crop(NATURAL, DISPLAYED, &crop, &TransformParams::new(-1.0, 0.0)),
            Err(InvalidInput::InvalidScale(_))
        ));
    }

    #[test]
    fn test_example_sizes() {
        let crop = CropRect::new(100.0, 75.0, 200.0, 150.0);
        let f = scale_factors(NATURAL, DISPLAYED).unwrap();

        assert_eq!(preview_size(&crop, f, 2.0), Size::new(3200, 2400));
        assert_eq!(natural_crop_size(&crop, f), Size::new(1600, 1200));
    }

    #[test]
    fn test_preview_size_floors() {
        let f = ScaleFactors { x: 1.5, y: 1.5 };
        let crop = CropRect::new(0.0, 0.0, 10.3, 7.7);
        // 10.3 * 1.5 * 1.25 = 19.3125, 7.7 * 1.5 * 1.25 = 14.4375
        assert_eq!(preview_size(&crop, f, 1.25), Size::new(19, 14));
        // 15.45, 11.55
        assert_eq!(natural_crop_size(&crop, f), Size::new(15, 11));
    }

    #[test]
    fn test_pixel_ratio_check() {
        assert!(check_pixel_ratio(1.0).is_ok());
        assert!(check_pixel_ratio(2.625).is_ok());
        assert!(check_pixel_ratio(0.9).is_err());
        assert!(check_pixel_ratio(f64::NAN).is_err());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: preview size is exactly floor(width * Wn/Wd * ratio).
        #[test]
        fn prop_preview_size_exact(
            (natural_w, natural_h) in (1u32..=8000, 1u32..=8000),
            (displayed_w, displayed_h) in (1u32..=2000, 1u32..=2000),
            (fx, fy, fw, fh) in (0.0f64..=1.0, 0.0f64..=1.0, 0.0f64..=1.0, 0.0f64..=1.0),
            pixel_ratio in 1.0f64..=4.0,
        ) {
            let natural = Size::new(natural_w, natural_h);
            let displayed = Size::new(displayed_w, displayed_h);
            // keep the crop inside the displayed image
            let x = fx * displayed_w as f64;
            let y = fy * displayed_h as f64;
            let crop = CropRect::new(
                x,
                y,
                fw * (displayed_w as f64 - x),
                fh * (displayed_h as f64 - y),
            );

            let f = scale_factors(natural, displayed).unwrap();
            let size = preview_size(&crop, f, pixel_ratio);

            let expected_w = (crop.width * (natural_w as f64 / displayed_w as f64) * pixel_ratio).floor() as u32;
            let expected_h = (crop.height * (natural_h as f64 / displayed_h as f64) * pixel_ratio).floor() as u32;
            prop_assert_eq!(size, Size::new(expected_w, expected_h));
        }

        /// Property: integer scale factors give exact natural sizes.
        #[test]
        fn prop_natural_size_exact_for_integer_factors(
            displayed_w in 1u32..=1000,
            factor in 1u32..=10,
            crop_w in 0u32..=1000,
        ) {
            let natural = Size::new(displayed_w * factor, displayed_w * factor);
            let displayed = Size::new(displayed_w, displayed_w);
            let crop_w = crop_w.min(displayed_w) as f64;
            let crop = CropRect::new(0.0, 0.0, crop_w, crop_w);

            let f = scale_factors(natural, displayed).unwrap();
            let size = natural_crop_size(&crop, f);
            prop_assert_eq!(size.width, crop_w as u32 * factor);
            prop_assert_eq!(size.height, crop_w as u32 * factor);
        }

        /// Property: mapped crop origin lies inside the natural image when the
        /// displayed crop lies inside the displayed image.
        #[test]
        fn prop_origin_inside_natural(
            (natural_w, natural_h) in (1u32..=5000, 1u32..=5000),
            (displayed_w, displayed_h) in (1u32..=1000, 1u32..=1000),
            (fx, fy) in (0.0f64..1.0, 0.0f64..1.0),
        ) {
            let crop = CropRect::new(fx * displayed_w as f64, fy * displayed_h as f64, 0.0, 0.0);
            let m = map_crop(
                Size::new(natural_w, natural_h),
                Size::new(displayed_w, displayed_h),
                &crop,
                &TransformParams::default(),
            ).unwrap();
            prop_assert!(m.crop_x >= 0.0 && m.crop_x < natural_w as f64 + 1e-9);
            prop_assert!(m.crop_y >= 0.0 && m.crop_y < natural_h as f64 + 1e-9);
        }
    }
}
