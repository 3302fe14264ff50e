//! Image decoding for the crop session's image source.
//!
//! Any container the `image` crate was built with (JPEG, PNG) decodes to
//! straight-alpha RGBA8. EXIF orientation is applied during decoding so the
//! pixels match what a browser shows for the same file.
//!
//! # Examples
//!
//! ```ignore
//! use cropper_core::decode::decode_image;
//!
//! let bytes = std::fs::read("photo.jpg").unwrap();
//! let image = decode_image(&bytes).unwrap();
//! println!("Decoded {}x{} image", image.width(), image.height());
//! ```

mod reader;
mod types;

pub use reader::decode_image;
pub use types::{DecodeError, Orientation};
