//! Crop session bindings.
//!
//! JavaScript drives the session from its event handlers and timers. Every
//! time-dependent call takes `now` in milliseconds, normally
//! `performance.now()`.
//!
//! # Example
//!
//! ```typescript
//! import { JsCropSession } from '@cropper/wasm';
//!
//! const session = new JsCropSession({ output: { type: 'png' } });
//! session.load_image(new Uint8Array(await file.arrayBuffer()), img.width, img.height);
//!
//! cropper.onComplete = (c) => session.complete_crop(c.x, c.y, c.width, c.height, performance.now());
//! setInterval(() => {
//!   if (session.poll(performance.now())) {
//!     const data = new ImageData(new Uint8ClampedArray(session.preview_pixels()),
//!                                session.preview_width, session.preview_height);
//!     canvas.getContext('2d').putImageData(data, 0, 0);
//!   }
//! }, 16);
//!
//! downloadButton.onclick = () => session.export();
//! ```

use std::time::Duration;

use cropper_core::{CropError, CropRect, CropSession, CropperConfig, Size, TransformParams};
use wasm_bindgen::prelude::*;

use crate::browser::{device_pixel_ratio, normalize_pixel_ratio, AnchorDownload, ObjectUrlRegistry};

/// A crop session for one image editor on the page.
#[wasm_bindgen]
pub struct JsCropSession {
    inner: CropSession<ObjectUrlRegistry, AnchorDownload>,
}

#[wasm_bindgen]
impl JsCropSession {
    /// Create a session from a partial `CropperConfig` object (or nothing).
    ///
    /// Without an explicit `pixelRatio` the window's device pixel ratio is
    /// used.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<JsCropSession, JsValue> {
        let mut parsed: CropperConfig = if config.is_undefined() || config.is_null() {
            CropperConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config.clone())
                .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?
        };

        let explicit_ratio = config.is_object()
            && js_sys::Reflect::has(&config, &JsValue::from_str("pixelRatio")).unwrap_or(false);
        parsed.pixel_ratio = if explicit_ratio {
            normalize_pixel_ratio(parsed.pixel_ratio)
        } else {
            device_pixel_ratio()
        };

        let inner = CropSession::new(parsed, ObjectUrlRegistry, AnchorDownload).map_err(to_js)?;
        Ok(JsCropSession { inner })
    }

    /// Decode and load an image. Pass the `<img>` layout size, or omit it to
    /// fit the configured display bounds.
    pub fn load_image(
        &mut self,
        bytes: &[u8],
        displayed_width: Option<u32>,
        displayed_height: Option<u32>,
    ) -> Result<(), JsValue> {
        let displayed = match (displayed_width, displayed_height) {
            (Some(width), Some(height)) => Some(Size::new(width, height)),
            _ => None,
        };
        self.inner.load_bytes(bytes, displayed).map_err(to_js)
    }

    pub fn set_displayed_size(&mut self, width: u32, height: u32, now: f64) -> Result<(), JsValue> {
        self.inner
            .set_displayed_size(Size::new(width, height), millis(now))
            .map_err(to_js)
    }

    pub fn update_crop(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.inner.update_crop(CropRect::new(x, y, width, height));
    }

    pub fn complete_crop(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        now: f64,
    ) -> Result<(), JsValue> {
        self.inner
            .complete_crop(CropRect::new(x, y, width, height), millis(now))
            .map_err(to_js)
    }

    pub fn set_transform(&mut self, scale: f64, rotate_degrees: f64, now: f64) -> Result<(), JsValue> {
        self.inner
            .set_transform(TransformParams::new(scale, rotate_degrees), millis(now))
            .map_err(to_js)
    }

    /// Values below 1 are raised to 1.
    pub fn set_pixel_ratio(&mut self, pixel_ratio: f64, now: f64) -> Result<(), JsValue> {
        self.inner
            .set_pixel_ratio(normalize_pixel_ratio(pixel_ratio), millis(now))
            .map_err(to_js)
    }

    /// Render the preview if the debounce delay has passed. Returns whether
    /// the preview changed.
    pub fn poll(&mut self, now: f64) -> Result<bool, JsValue> {
        self.inner.poll(millis(now)).map_err(to_js)
    }

    pub fn render_preview(&mut self) -> Result<(), JsValue> {
        self.inner.render_preview().map_err(to_js)
    }

    /// Milliseconds timestamp of the pending render, if one is scheduled.
    pub fn next_render_at(&self) -> Option<f64> {
        self.inner
            .next_render_at()
            .map(|deadline| deadline.as_nanos() as f64 / 1e6)
    }

    #[wasm_bindgen(getter)]
    pub fn preview_width(&self) -> u32 {
        self.inner.target().size().width
    }

    #[wasm_bindgen(getter)]
    pub fn preview_height(&self) -> u32 {
        self.inner.target().size().height
    }

    /// RGBA preview pixels for `ImageData`. This copies.
    pub fn preview_pixels(&self) -> Option<Vec<u8>> {
        self.inner.target().image().map(|img| img.as_raw().clone())
    }

    /// Export the completed crop, start the download and return its object URL.
    pub fn export(&mut self) -> Result<String, JsValue> {
        self.inner
            .export()
            .map(|published| published.handle().to_string())
            .map_err(to_js)
    }

    /// Object URL of the latest export, if still live.
    #[wasm_bindgen(getter)]
    pub fn published_url(&self) -> Option<String> {
        self.inner
            .published()
            .map(|published| published.handle().to_string())
    }

    /// Drop the image, the preview and the published URL.
    pub fn close(&mut self) {
        self.inner.close();
    }
}

fn to_js(err: CropError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Timestamps from JS may be fractional; negative or non-finite values clamp
/// to zero.
fn millis(now: f64) -> Duration {
    if now.is_finite() && now > 0.0 {
        Duration::from_secs_f64(now / 1000.0)
    } else {
        Duration::ZERO
    }
}
