//! Session configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::encode::OutputFormat;
use crate::error::InvalidInput;
use crate::surface::DEFAULT_MAX_SURFACE_PIXELS;
use crate::transform::{check_pixel_ratio, Size};

/// Settings for a [`CropSession`](crate::CropSession).
///
/// Every field has a default, so partial objects deserialize cleanly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CropperConfig {
    /// Export encoding.
    pub output: OutputFormat,
    /// Suggested download name; its extension is replaced to match `output`.
    pub download_filename: String,
    /// Quiet period before a live preview render.
    pub preview_debounce_ms: u64,
    /// Largest drawing surface, in pixels, a render or export may allocate.
    pub max_surface_pixels: u64,
    /// Device pixel ratio for preview surfaces.
    pub pixel_ratio: f64,
    /// Box the image is laid out in when no explicit displayed size is given.
    pub display_bounds: Size,
}

impl Default for CropperConfig {
    fn default() -> Self {
        Self {
            output: OutputFormat::Png,
            download_filename: "cropped.png".to_string(),
            preview_debounce_ms: 100,
            max_surface_pixels: DEFAULT_MAX_SURFACE_PIXELS,
            pixel_ratio: 1.0,
            display_bounds: Size::new(500, 500),
        }
    }
}

impl CropperConfig {
    pub fn validate(&self) -> Result<(), InvalidInput> {
        check_pixel_ratio(self.pixel_ratio)?;
        if let OutputFormat::Jpeg { quality } = self.output {
            if !(1..=100).contains(&quality) {
                return Err(InvalidInput::InvalidQuality(quality));
            }
        }
        Ok(())
    }

    pub fn debounce_delay(&self) -> Duration {
        Duration::from_millis(self.preview_debounce_ms)
    }

    /// `download_filename` with the extension of the output format.
    pub fn suggested_filename(&self) -> String {
        let stem = Path::new(&self.download_filename)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "cropped".to_string());
        format!("{}.{}", stem, self.output.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CropperConfig::default();
        assert_eq!(config.output, OutputFormat::Png);
        assert_eq!(config.debounce_delay(), Duration::from_millis(100));
        assert_eq!(config.max_surface_pixels, 268_435_456);
        assert_eq!(config.suggested_filename(), "cropped.png");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_filename_follows_format() {
        let config = CropperConfig {
            output: OutputFormat::Jpeg { quality: 85 },
            download_filename: "holiday.png".to_string(),
            ..Default::default()
        };
        assert_eq!(config.suggested_filename(), "holiday.jpg");

        let config = CropperConfig {
            download_filename: "plain".to_string(),
            ..Default::default()
        };
        assert_eq!(config.suggested_filename(), "plain.png");

        let config = CropperConfig {
            download_filename: String::new(),
            ..Default::default()
        };
        assert_eq!(config.suggested_filename(), "cropped.png");
    }

    #[test]
    fn test_validate() {
        let config = CropperConfig {
            pixel_ratio: 0.5,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(InvalidInput::InvalidPixelRatio(0.5)));

        let config = CropperConfig {
            output: OutputFormat::Jpeg { quality: 0 },
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(InvalidInput::InvalidQuality(0)));

        let config = CropperConfig {
            output: OutputFormat::Jpeg { quality: 101 },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_serde_camel_case_with_defaults() {
        let config: CropperConfig = serde_json::from_str(
            r#"{"output":{"type":"jpeg","quality":70},"pixelRatio":2.0,"previewDebounceMs":250}"#,
        )
        .unwrap();
        assert_eq!(config.output, OutputFormat::Jpeg { quality: 70 });
        assert_eq!(config.pixel_ratio, 2.0);
        assert_eq!(config.preview_debounce_ms, 250);
        assert_eq!(config.download_filename, "cropped.png");
    }
}
