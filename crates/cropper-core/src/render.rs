//! Live preview rendering.
//!
//! The preview surface holds the crop at natural resolution inflated by the
//! device pixel ratio, so it stays sharp on high-density displays. Rotation
//! and scale pivot on the natural image center regardless of where the crop
//! sits.

use log::debug;

use crate::error::CropError;
use crate::source::ImageHandle;
use crate::surface::RenderTarget;
use crate::transform::{
    check_pixel_ratio, map_crop, preview_size, CropRect, InterpolationFilter, TransformParams,
};

/// Render `crop` (displayed space) of `image` into `target`.
///
/// `target` is resized to `floor(crop * scale_factor * pixel_ratio)` on each
/// axis, which clears it, then the whole natural image is drawn through
/// the crop transform with Lanczos3 resampling.
///
/// # Errors
///
/// - `CropError::InvalidInput` for a malformed crop, transform or pixel ratio
/// - `CropError::RenderContextUnavailable` if the resized surface has zero
///   area or exceeds its pixel ceiling
pub fn render_preview(
    image: &ImageHandle,
    target: &mut RenderTarget,
    crop: &CropRect,
    params: &TransformParams,
    pixel_ratio: f64,
) -> Result<(), CropError> {
    check_pixel_ratio(pixel_ratio)?;
    let natural = image.natural();
    let mapping = map_crop(natural, image.displayed(), crop, params)?;

    let size = preview_size(crop, mapping.factors(), pixel_ratio);
    target.resize(size);
    let mut ctx = target.context()?;
    ctx.set_filter(InterpolationFilter::Lanczos3);

    // Points pass through these in reverse: the image center moves to the
    // origin, gets scaled and rotated there, moves back, then the crop origin
    // shifts to the surface origin and device pixels inflate everything.
    ctx.scale(pixel_ratio, pixel_ratio);
    ctx.translate(-mapping.crop_x, -mapping.crop_y);
    ctx.translate(mapping.center_x, mapping.center_y);
    ctx.rotate(mapping.rotate_radians);
    ctx.scale(mapping.scale, mapping.scale);
    ctx.translate(-mapping.center_x, -mapping.center_y);

    ctx.draw_image(
        image.pixels(),
        0.0,
        0.0,
        natural.width as f64,
        natural.height as f64,
    );

    debug!(
        "rendered preview {}x{} (crop origin {:.1},{:.1}, ratio {}, rotate {:.3} rad, scale {})",
        size.width,
        size.height,
        mapping.crop_x,
        mapping.crop_y,
        pixel_ratio,
        mapping.rotate_radians,
        mapping.scale
    );
    Ok(())
}
