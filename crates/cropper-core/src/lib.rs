//! Cropper Core - crop, preview and export pipeline
//!
//! This crate turns a crop rectangle chosen on screen into pixels from the
//! full-resolution source:
//!
//! - [`transform`] maps displayed coordinates into natural image space and
//!   provides the affine transform and resampling used for drawing.
//! - [`render`] draws the crop, optionally rotated and zoomed about the image
//!   center, onto a surface inflated by the device pixel ratio.
//! - [`export`] resamples that surface back to natural resolution and encodes
//!   it.
//! - [`publish`] keeps the single live handle to the latest export and hands
//!   it to a download trigger.
//!
//! [`CropSession`] wires these together with debounced rendering for one user.

pub mod config;
pub mod decode;
pub mod encode;
pub mod error;
pub mod export;
pub mod publish;
pub mod render;
pub mod schedule;
pub mod session;
pub mod source;
pub mod surface;
pub mod transform;

pub use config::CropperConfig;
pub use encode::OutputFormat;
pub use error::{CropError, InvalidInput};
pub use export::{export_crop, ExportedBlob};
pub use publish::{
    BlobHandle, BlobRegistry, DownloadTrigger, MemoryBlobRegistry, PublishedArtifact, Publisher,
};
pub use render::render_preview;
pub use schedule::Debouncer;
pub use session::CropSession;
pub use source::{fit_within, ImageHandle};
pub use surface::{RenderTarget, DEFAULT_MAX_SURFACE_PIXELS};
pub use transform::{CropRect, InterpolationFilter, Size, TransformParams};
