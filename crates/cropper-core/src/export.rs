//! Export of the rendered preview at natural resolution.
//!
//! The preview surface is inflated by the device pixel ratio. Export undoes
//! that by resampling the whole surface into one sized to the crop in natural
//! pixels, then encodes the result.

use image::RgbaImage;
use log::debug;

use crate::encode::{encode_image, OutputFormat};
use crate::error::{CropError, InvalidInput};
use crate::source::ImageHandle;
use crate::surface::RenderTarget;
use crate::transform::{natural_crop_size, CropRect, InterpolationFilter, Size};

/// An encoded export, immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedBlob {
    bytes: Vec<u8>,
    mime_type: &'static str,
    size: Size,
}

impl ExportedBlob {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime_type(&self) -> &'static str {
        self.mime_type
    }

    /// Pixel dimensions of the encoded raster.
    pub fn size(&self) -> Size {
        self.size
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Resample `rendered` to the natural size of `crop` and encode it.
///
/// `crop` is the completed selection in displayed space; `None` or a
/// zero-area rectangle means there is nothing to export.
///
/// # Errors
///
/// - `InvalidInput::NoActiveCrop` without a usable crop
/// - `InvalidInput::PreviewNotRendered` if `rendered` holds no pixels
/// - `CropError::RenderContextUnavailable` if the natural size truncates to
///   zero or exceeds the surface ceiling of `rendered`
/// - `CropError::EncodeFailed` if the encoder rejects the raster
pub fn export_crop(
    image: &ImageHandle,
    rendered: &RenderTarget,
    crop: Option<&CropRect>,
    format: &OutputFormat,
) -> Result<ExportedBlob, CropError> {
    let crop = match crop {
        Some(crop) if !crop.is_empty() => crop,
        _ => return Err(InvalidInput::NoActiveCrop.into()),
    };
    crop.validate()?;
    let preview = rendered.image().ok_or(InvalidInput::PreviewNotRendered)?;

    let size = natural_crop_size(crop, image.scale_factors());
    let pixels = resample_to(preview, size, rendered.max_pixels())?;
    let bytes = encode_image(&pixels, format)?;

    debug!(
        "exported {}x{} {} ({} bytes) from {}x{} preview",
        size.width,
        size.height,
        format.mime_type(),
        bytes.len(),
        preview.width(),
        preview.height()
    );
    Ok(ExportedBlob {
        bytes,
        mime_type: format.mime_type(),
        size,
    })
}

fn resample_to(preview: &RgbaImage, size: Size, max_pixels: u64) -> Result<RgbaImage, CropError> {
    let mut output = RenderTarget::with_max_pixels(max_pixels);
    output.resize(size);
    {
        let mut ctx = output.context()?;
        ctx.set_filter(InterpolationFilter::Lanczos3);
        ctx.draw_resampled(preview);
    }
    output
        .into_image()
        .ok_or(CropError::RenderContextUnavailable {
            width: size.width,
            height: size.height,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::render_preview;
    use crate::transform::TransformParams;
    use image::Rgba;

    fn gradient(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 5 % 256) as u8, (y * 9 % 256) as u8, 77, 255])
        })
    }

    fn rendered(
        image: &ImageHandle,
        crop: &CropRect,
        params: TransformParams,
        pixel_ratio: f64,
    ) -> RenderTarget {
        let mut target = RenderTarget::new();
        render_preview(image, &mut target, crop, &params, pixel_ratio).unwrap();
        target
    }

    fn decoded_size(blob: &ExportedBlob) -> (u32, u32) {
        let img = image::load_from_memory(blob.bytes()).unwrap();
        (img.width(), img.height())
    }

    #[test]
    fn test_zoomed_out_export_keeps_edge_color() {
        let white = RgbaImage::from_pixel(40, 40, Rgba([255, 255, 255, 255]));
        let image = ImageHandle::new(white, Size::new(40, 40)).unwrap();
        let crop = CropRect::new(0.0, 0.0, 40.0, 40.0);
        let target = rendered(&image, &crop, TransformParams::new(0.5, 45.0), 3.0);

        let blob = export_crop(&image, &target, Some(&crop), &OutputFormat::Png).unwrap();
        let decoded = image::load_from_memory(blob.bytes()).unwrap().into_rgba8();
        assert_eq!(decoded.dimensions(), (40, 40));

        let mut partial = 0;
        for p in decoded.pixels().filter(|p| p.0[3] > 0) {
            assert!(p.0[..3].iter().all(|&c| c >= 250), "darkened edge: {p:?}");
            if p.0[3] < 255 {
                partial += 1;
            }
        }
        assert!(partial > 0);
    }

    #[test]
    fn test_export_undoes_pixel_ratio() {
        // 8x scale factor, pixel ratio 2
        let image = ImageHandle::new(gradient(160, 120), Size::new(20, 15)).unwrap();
        let crop = CropRect::new(4.0, 3.0, 8.0, 6.0);
        let target = rendered(&image, &crop, TransformParams::default(), 2.0);
        assert_eq!(target.size(), Size::new(128, 96));

        let blob = export_crop(&image, &target, Some(&crop), &OutputFormat::Png).unwrap();
        assert_eq!(blob.size(), Size::new(64, 48));
        assert_eq!(blob.mime_type(), "image/png");
        assert_eq!(decoded_size(&blob), (64, 48));
    }

    #[test]
    fn test_export_size_ignores_rotation() {
        let image = ImageHandle::new(gradient(160, 120), Size::new(20, 15)).unwrap();
        let crop = CropRect::new(4.0, 3.0, 8.0, 6.0);
        let target = rendered(&image, &crop, TransformParams::new(1.0, 90.0), 2.0);

        let blob = export_crop(&image, &target, Some(&crop), &OutputFormat::Png).unwrap();
        assert_eq!(decoded_size(&blob), (64, 48));
    }

    #[test]
    fn test_identity_export_is_exact_crop() {
        let source = gradient(30, 20);
        let image = ImageHandle::new(source.clone(), Size::new(30, 20)).unwrap();
        let crop = CropRect::new(7.0, 2.0, 9.0, 11.0);
        let target = rendered(&image, &crop, TransformParams::default(), 1.0);

        let blob = export_crop(&image, &target, Some(&crop), &OutputFormat::Png).unwrap();
        let decoded = image::load_from_memory(blob.bytes()).unwrap().into_rgba8();
        let expected = image::imageops::crop_imm(&source, 7, 2, 9, 11).to_image();
        assert_eq!(decoded, expected);
    }

    #[test]
    fn test_fractional_size_truncates() {
        // factor 1.5: 7 * 1.5 = 10.5, 5 * 1.5 = 7.5
        let image = ImageHandle::new(gradient(30, 30), Size::new(20, 20)).unwrap();
        let crop = CropRect::new(1.0, 1.0, 7.0, 5.0);
        let target = rendered(&image, &crop, TransformParams::default(), 1.0);

        let blob = export_crop(&image, &target, Some(&crop), &OutputFormat::Png).unwrap();
        assert_eq!(blob.size(), Size::new(10, 7));
    }

    #[test]
    fn test_jpeg_export() {
        let image = ImageHandle::new(gradient(40, 40), Size::new(40, 40)).unwrap();
        let crop = CropRect::new(0.0, 0.0, 16.0, 16.0);
        let target = rendered(&image, &crop, TransformParams::default(), 1.0);

        let blob =
            export_crop(&image, &target, Some(&crop), &OutputFormat::Jpeg { quality: 80 }).unwrap();
        assert_eq!(blob.mime_type(), "image/jpeg");
        assert_eq!(&blob.bytes()[0..2], &[0xFF, 0xD8]);
        assert_eq!(decoded_size(&blob), (16, 16));
    }

    #[test]
    fn test_missing_crop() {
        let image = ImageHandle::new(gradient(10, 10), Size::new(10, 10)).unwrap();
        let target = RenderTarget::new();

        let err = export_crop(&image, &target, None, &OutputFormat::Png).unwrap_err();
        assert!(matches!(
            err,
            CropError::InvalidInput(InvalidInput::NoActiveCrop)
        ));

        let empty = CropRect::new(3.0, 3.0, 0.0, 0.0);
        let err = export_crop(&image, &target, Some(&empty), &OutputFormat::Png).unwrap_err();
        assert!(matches!(
            err,
            CropError::InvalidInput(InvalidInput::NoActiveCrop)
        ));
    }

    #[test]
    fn test_unrendered_preview() {
        let image = ImageHandle::new(gradient(10, 10), Size::new(10, 10)).unwrap();
        let crop = CropRect::new(0.0, 0.0, 5.0, 5.0);

        let err = export_crop(&image, &RenderTarget::new(), Some(&crop), &OutputFormat::Png)
            .unwrap_err();
        assert!(matches!(
            err,
            CropError::InvalidInput(InvalidInput::PreviewNotRendered)
        ));
    }

    #[test]
    fn test_sub_pixel_natural_size_has_no_context() {
        // displayed larger than natural: a 1px crop is half a natural pixel
        let image = ImageHandle::new(gradient(10, 10), Size::new(20, 20)).unwrap();
        let crop = CropRect::new(0.0, 0.0, 1.0, 1.0);
        let target = rendered(&image, &crop, TransformParams::default(), 2.0);
        assert_eq!(target.size(), Size::new(1, 1));

        let err = export_crop(&image, &target, Some(&crop), &OutputFormat::Png).unwrap_err();
        assert!(matches!(
            err,
            CropError::RenderContextUnavailable {
                width: 0,
                height: 0
            }
        ));
    }
}
