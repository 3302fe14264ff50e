//! Owned RGBA drawing surfaces.
//!
//! A [`RenderTarget`] behaves like a canvas element: setting its size is cheap
//! and discards the previous contents, while the pixel buffer is only
//! allocated when a [`DrawContext`] is acquired. Acquisition fails for
//! zero-area surfaces and for surfaces above the configured pixel ceiling.

use image::{Rgba, Rgba32FImage, RgbaImage};
use log::debug;

use crate::error::CropError;
use crate::transform::{sample, Affine, InterpolationFilter, Size};

/// Largest surface area accepted by default (16384 x 16384).
pub const DEFAULT_MAX_SURFACE_PIXELS: u64 = 268_435_456;

/// A resizable drawing surface owned by a single session.
#[derive(Debug, Clone)]
pub struct RenderTarget {
    size: Size,
    pixels: Option<RgbaImage>,
    max_pixels: u64,
}

impl Default for RenderTarget {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderTarget {
    pub fn new() -> Self {
        Self::with_max_pixels(DEFAULT_MAX_SURFACE_PIXELS)
    }

    pub fn with_max_pixels(max_pixels: u64) -> Self {
        Self {
            size: Size::default(),
            pixels: None,
            max_pixels,
        }
    }

    /// Set the surface size. Any previous contents are discarded.
    pub fn resize(&mut self, size: Size) {
        self.size = size;
        self.pixels = None;
    }

    /// Drop the contents and collapse to zero size.
    pub fn clear(&mut self) {
        self.resize(Size::default());
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn max_pixels(&self) -> u64 {
        self.max_pixels
    }

    /// Rendered contents, or `None` if nothing was drawn since the last resize.
    pub fn image(&self) -> Option<&RgbaImage> {
        self.pixels.as_ref()
    }

    pub fn into_image(self) -> Option<RgbaImage> {
        self.pixels
    }

    /// Acquire a drawing context over a blank buffer of the current size.
    ///
    /// # Errors
    ///
    /// Returns `CropError::RenderContextUnavailable` for a zero-area surface
    /// or one larger than the pixel ceiling.
    pub fn context(&mut self) -> Result<DrawContext<'_>, CropError> {
        let Size { width, height } = self.size;
        if self.size.is_empty() || self.size.area() > self.max_pixels {
            return Err(CropError::RenderContextUnavailable { width, height });
        }

        let pixels = self
            .pixels
            .get_or_insert_with(|| RgbaImage::new(width, height));
        Ok(DrawContext {
            pixels,
            transform: Affine::IDENTITY,
            filter: InterpolationFilter::default(),
        })
    }
}

/// Transform-aware drawing operations over a [`RenderTarget`].
///
/// `scale`, `translate` and `rotate` post-multiply the current transform, so
/// a sequence of calls reads as the inverse of the order points pass through
/// it.
pub struct DrawContext<'a> {
    pixels: &'a mut RgbaImage,
    transform: Affine,
    filter: InterpolationFilter,
}

impl DrawContext<'_> {
    pub fn transform(&self) -> Affine {
        self.transform
    }

    pub fn scale(&mut self, sx: f64, sy: f64) {
        self.transform = self.transform.scale(sx, sy);
    }

    pub fn translate(&mut self, tx: f64, ty: f64) {
        self.transform = self.transform.translate(tx, ty);
    }

    pub fn rotate(&mut self, radians: f64) {
        self.transform = self.transform.rotate(radians);
    }

    pub fn set_filter(&mut self, filter: InterpolationFilter) {
        self.filter = filter;
    }

    pub fn filter(&self) -> InterpolationFilter {
        self.filter
    }

    /// Draw all of `source` into the user-space rectangle
    /// `(dx, dy, dw, dh)` through the current transform.
    ///
    /// Each device pixel whose center lands inside the rectangle samples the
    /// source with the current filter and is composited source-over.
    /// A non-invertible transform draws nothing.
    pub fn draw_image(&mut self, source: &RgbaImage, dx: f64, dy: f64, dw: f64, dh: f64) {
        let (src_w, src_h) = (source.width() as f64, source.height() as f64);
        if src_w == 0.0 || src_h == 0.0 || dw <= 0.0 || dh <= 0.0 {
            return;
        }
        let Some(inverse) = self.transform.invert() else {
            debug!("skipping draw: transform is not invertible");
            return;
        };

        let (kx, ky) = (src_w / dw, src_h / dh);
        for (x, y, pixel) in self.pixels.enumerate_pixels_mut() {
            let (ux, uy) = inverse.apply(x as f64 + 0.5, y as f64 + 0.5);
            let u = (ux - dx) * kx;
            let v = (uy - dy) * ky;
            if u < 0.0 || v < 0.0 || u >= src_w || v >= src_h {
                continue;
            }
            let src = sample(source, u, v, self.filter);
            *pixel = composite_over(*pixel, src);
        }
    }

    /// Replace the surface contents with `source` resampled to fill it
    /// exactly. The current transform is ignored.
    ///
    /// Resampling runs on premultiplied alpha, like [`draw_image`](Self::draw_image).
    pub fn draw_resampled(&mut self, source: &RgbaImage) {
        if source.width() == 0 || source.height() == 0 {
            return;
        }
        let (width, height) = self.pixels.dimensions();
        *self.pixels = if source.dimensions() == (width, height) {
            source.clone()
        } else {
            resize_premultiplied(source, width, height, self.filter)
        };
    }
}

fn resize_premultiplied(
    source: &RgbaImage,
    width: u32,
    height: u32,
    filter: InterpolationFilter,
) -> RgbaImage {
    let premultiplied = Rgba32FImage::from_fn(source.width(), source.height(), |x, y| {
        let [r, g, b, a] = source.get_pixel(x, y).0.map(|c| c as f32 / 255.0);
        Rgba([r * a, g * a, b * a, a])
    });
    let resized = image::imageops::resize(&premultiplied, width, height, filter.to_image_filter());

    let to_u8 = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    RgbaImage::from_fn(width, height, |x, y| {
        let [r, g, b, a] = resized.get_pixel(x, y).0;
        if a <= 0.0 {
            return Rgba([0; 4]);
        }
        Rgba([to_u8(r / a), to_u8(g / a), to_u8(b / a), to_u8(a)])
    })
}

/// Source-over compositing of straight-alpha pixels.
fn composite_over(dst: Rgba<u8>, src: [u8; 4]) -> Rgba<u8> {
    let sa = src[3] as f64 / 255.0;
    let da = dst.0[3] as f64 / 255.0;
    if sa >= 1.0 || da <= 0.0 {
        return Rgba(src);
    }
    if sa <= 0.0 {
        return dst;
    }

    let out_a = sa + da * (1.0 - sa);
    let mut out = [0u8; 4];
    for i in 0..3 {
        let c = (src[i] as f64 * sa + dst.0[i] as f64 * da * (1.0 - sa)) / out_a;
        out[i] = c.clamp(0.0, 255.0).round() as u8;
    }
    out[3] = (out_a * 255.0).clamp(0.0, 255.0).round() as u8;
    Rgba(out)
}
