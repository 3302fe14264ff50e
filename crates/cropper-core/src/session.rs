//! Per-user crop session.
//!
//! A session ties the pipeline together: it owns the loaded image, the live
//! and completed crop, the transform, one render surface and one publisher
//! slot. Nothing is shared between sessions.
//!
//! Only the completed crop is ever rendered or exported. The live crop tracks
//! the selection while it is being dragged and is kept for display purposes.

use std::time::Duration;

use image::RgbaImage;
use log::{debug, info};

use crate::config::CropperConfig;
use crate::decode::decode_image;
use crate::error::{CropError, InvalidInput};
use crate::export::export_crop;
use crate::publish::{BlobRegistry, DownloadTrigger, PublishedArtifact, Publisher};
use crate::render::render_preview;
use crate::schedule::Debouncer;
use crate::source::ImageHandle;
use crate::surface::RenderTarget;
use crate::transform::{check_pixel_ratio, CropRect, Size, TransformParams};

/// Inputs the current preview was rendered from.
#[derive(Debug, Clone, Copy, PartialEq)]
struct RenderKey {
    crop: CropRect,
    params: TransformParams,
    pixel_ratio: f64,
    displayed: Size,
}

pub struct CropSession<R: BlobRegistry, D: DownloadTrigger> {
    config: CropperConfig,
    image: Option<ImageHandle>,
    live_crop: Option<CropRect>,
    completed_crop: Option<CropRect>,
    params: TransformParams,
    pixel_ratio: f64,
    target: RenderTarget,
    rendered: Option<RenderKey>,
    debouncer: Debouncer,
    publisher: Publisher<R, D>,
}

impl<R: BlobRegistry, D: DownloadTrigger> CropSession<R, D> {
    /// # Errors
    ///
    /// Returns `InvalidInput` if `config` does not validate.
    pub fn new(config: CropperConfig, registry: R, download: D) -> Result<Self, CropError> {
        config.validate()?;
        Ok(Self {
            image: None,
            live_crop: None,
            completed_crop: None,
            params: TransformParams::default(),
            pixel_ratio: config.pixel_ratio,
            target: RenderTarget::with_max_pixels(config.max_surface_pixels),
            rendered: None,
            debouncer: Debouncer::new(config.debounce_delay()),
            publisher: Publisher::new(registry, download),
            config,
        })
    }

    /// Decode `bytes` and load the result, see [`load_image`](Self::load_image).
    pub fn load_bytes(&mut self, bytes: &[u8], displayed: Option<Size>) -> Result<(), CropError> {
        let pixels = decode_image(bytes)?;
        self.load_image(pixels, displayed)
    }

    /// Replace the current image.
    ///
    /// `displayed` is the on-screen size; `None` lays the image out inside
    /// the configured display bounds. The preview surface, both crops and
    /// the published handle are torn down before this returns. If the new
    /// image is rejected the session is left as it was.
    pub fn load_image(
        &mut self,
        pixels: RgbaImage,
        displayed: Option<Size>,
    ) -> Result<(), CropError> {
        let handle = match displayed {
            Some(size) => ImageHandle::new(pixels, size)?,
            None => ImageHandle::fitted(pixels, self.config.display_bounds)?,
        };

        self.teardown();
        info!(
            "loaded {}x{} image displayed at {}x{}",
            handle.natural().width,
            handle.natural().height,
            handle.displayed().width,
            handle.displayed().height
        );
        self.image = Some(handle);
        Ok(())
    }

    /// Drop the image and every resource derived from it.
    pub fn close(&mut self) {
        self.teardown();
        self.image = None;
    }

    fn teardown(&mut self) {
        self.debouncer.cancel();
        self.target.clear();
        self.rendered = None;
        self.live_crop = None;
        self.completed_crop = None;
        self.publisher.release();
    }

    /// Record a relayout of the image. The preview goes stale.
    pub fn set_displayed_size(&mut self, displayed: Size, now: Duration) -> Result<(), CropError> {
        let image = self.image.as_mut().ok_or(InvalidInput::NoImage)?;
        image.set_displayed(displayed)?;
        self.debouncer.schedule(now);
        Ok(())
    }

    /// Track the selection while it is being dragged. Never renders.
    pub fn update_crop(&mut self, crop: CropRect) {
        self.live_crop = Some(crop);
    }

    /// Commit a finished selection and schedule a preview render.
    pub fn complete_crop(&mut self, crop: CropRect, now: Duration) -> Result<(), CropError> {
        crop.validate()?;
        self.live_crop = Some(crop);
        self.completed_crop = Some(crop);
        self.debouncer.schedule(now);
        Ok(())
    }

    pub fn set_transform(&mut self, params: TransformParams, now: Duration) -> Result<(), CropError> {
        params.validate()?;
        self.params = params;
        self.debouncer.schedule(now);
        Ok(())
    }

    pub fn set_pixel_ratio(&mut self, pixel_ratio: f64, now: Duration) -> Result<(), CropError> {
        check_pixel_ratio(pixel_ratio)?;
        self.pixel_ratio = pixel_ratio;
        self.debouncer.schedule(now);
        Ok(())
    }

    /// Run the debounced preview render if it is due.
    ///
    /// Returns `Ok(true)` if a render ran. A due render with no image or no
    /// usable completed crop is dropped silently.
    pub fn poll(&mut self, now: Duration) -> Result<bool, CropError> {
        if !self.debouncer.fire(now) {
            return Ok(false);
        }
        if self.image.is_none() || self.active_crop().is_none() {
            debug!("debounced render skipped: nothing to render");
            return Ok(false);
        }
        self.render_preview()?;
        Ok(true)
    }

    /// Render the completed crop into the preview surface now.
    pub fn render_preview(&mut self) -> Result<(), CropError> {
        let key = self.current_key()?;
        let image = self.image.as_ref().ok_or(InvalidInput::NoImage)?;

        match render_preview(image, &mut self.target, &key.crop, &key.params, key.pixel_ratio) {
            Ok(()) => {
                self.rendered = Some(key);
                Ok(())
            }
            Err(err) => {
                if self.target.image().is_none() {
                    self.rendered = None;
                }
                Err(err)
            }
        }
    }

    /// Export the completed crop and publish it.
    ///
    /// A stale preview is re-rendered first. On any error the previously
    /// published artifact stays live.
    pub fn export(&mut self) -> Result<&PublishedArtifact, CropError> {
        let key = self.current_key()?;
        if self.rendered != Some(key) {
            self.render_preview()?;
            self.debouncer.cancel();
        }

        let image = self.image.as_ref().ok_or(InvalidInput::NoImage)?;
        let blob = export_crop(image, &self.target, Some(&key.crop), &self.config.output)?;
        let filename = self.config.suggested_filename();
        self.publisher.publish(blob, &filename)
    }

    fn current_key(&self) -> Result<RenderKey, InvalidInput> {
        let image = self.image.as_ref().ok_or(InvalidInput::NoImage)?;
        let crop = self.active_crop().ok_or(InvalidInput::NoActiveCrop)?;
        Ok(RenderKey {
            crop,
            params: self.params,
            pixel_ratio: self.pixel_ratio,
            displayed: image.displayed(),
        })
    }

    /// The completed crop, unless it has zero area.
    pub fn active_crop(&self) -> Option<CropRect> {
        self.completed_crop.filter(|crop| !crop.is_empty())
    }

    pub fn live_crop(&self) -> Option<CropRect> {
        self.live_crop
    }

    pub fn completed_crop(&self) -> Option<CropRect> {
        self.completed_crop
    }

    pub fn image(&self) -> Option<&ImageHandle> {
        self.image.as_ref()
    }

    pub fn transform(&self) -> TransformParams {
        self.params
    }

    pub fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    pub fn config(&self) -> &CropperConfig {
        &self.config
    }

    /// The preview surface.
    pub fn target(&self) -> &RenderTarget {
        &self.target
    }

    /// Whether the preview matches the current crop, transform and layout.
    pub fn is_preview_current(&self) -> bool {
        self.rendered.is_some() && self.current_key().ok() == self.rendered
    }

    pub fn is_render_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// When the pending debounced render becomes due.
    pub fn next_render_at(&self) -> Option<Duration> {
        self.debouncer.deadline()
    }

    pub fn published(&self) -> Option<&PublishedArtifact> {
        self.publisher.current()
    }

    pub fn publisher(&self) -> &Publisher<R, D> {
        &self.publisher
    }
}
