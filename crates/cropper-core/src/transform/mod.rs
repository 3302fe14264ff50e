//! Geometry for the crop pipeline: coordinate mapping, affine transforms and
//! resampling.
//!
//! # Coordinate Spaces
//!
//! - **Displayed space**: pixels of the image as laid out on screen. Crop
//!   rectangles arrive in this space.
//! - **Natural space**: pixels of the decoded source image.
//! - **Device space**: pixels of a render surface, natural space inflated by
//!   the device pixel ratio.
//!
//! Origin is the top-left corner and y points down, so positive rotation
//! angles turn clockwise on screen.

mod affine;
mod mapper;
mod sample;
mod types;

pub use affine::Affine;
pub use mapper::{
    check_pixel_ratio, map_crop, natural_crop_size, preview_size, scale_factors, CropMapping,
    ScaleFactors,
};
pub use sample::{sample, InterpolationFilter};
pub use types::{CropRect, Size, TransformParams};
