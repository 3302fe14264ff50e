//! Command-line interface definitions.

use clap::{Parser, ValueEnum};
use cropper_core::{CropRect, OutputFormat, Size};
use std::path::PathBuf;

/// Crop an image the way the browser editor does and write the export
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Image to crop (JPEG or PNG)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub input: PathBuf,

    /// Crop rectangle in displayed pixels: x,y,width,height
    #[arg(short, long, value_parser = parse_crop)]
    pub crop: CropRect,

    /// Displayed size of the image, e.g. 500x375 (default: fit within --bounds)
    #[arg(short, long, value_parser = parse_size)]
    pub display: Option<Size>,

    /// Layout box used when --display is not given
    #[arg(long, value_parser = parse_size, default_value = "500x500")]
    pub bounds: Size,

    /// Device pixel ratio of the preview surface
    #[arg(long, default_value_t = 1.0)]
    pub pixel_ratio: f64,

    /// Rotation about the image center, in degrees clockwise
    #[arg(short, long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub rotate: f64,

    /// Zoom about the image center
    #[arg(short, long, default_value_t = 1.0)]
    pub scale: f64,

    /// Output encoding
    #[arg(short, long, value_enum, default_value_t = Format::Png)]
    pub format: Format,

    /// JPEG quality (1-100)
    #[arg(short, long, default_value_t = 90)]
    pub quality: u8,

    /// Directory the export is written into
    #[arg(short, long, default_value = ".", value_hint = clap::ValueHint::DirPath)]
    pub out_dir: PathBuf,

    /// Suggested file name; the extension follows --format
    #[arg(long, default_value = "cropped.png")]
    pub filename: String,

    /// Log pipeline geometry (debug level)
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Png,
    Jpeg,
}

impl Cli {
    pub fn output_format(&self) -> OutputFormat {
        match self.format {
            Format::Png => OutputFormat::Png,
            Format::Jpeg => OutputFormat::Jpeg {
                quality: self.quality,
            },
        }
    }
}

fn parse_crop(value: &str) -> Result<CropRect, String> {
    let parts: Vec<f64> = value
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|e| format!("invalid number in crop: {e}"))?;

    match parts.as_slice() {
        &[x, y, width, height] => Ok(CropRect::new(x, y, width, height)),
        _ => Err(format!("expected x,y,width,height, got {} values", parts.len())),
    }
}

fn parse_size(value: &str) -> Result<Size, String> {
    let (width, height) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {value:?}"))?;
    let width = width.trim().parse().map_err(|e| format!("invalid width: {e}"))?;
    let height = height.trim().parse().map_err(|e| format!("invalid height: {e}"))?;
    Ok(Size::new(width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_crop() {
        assert_eq!(
            parse_crop("100,75,200,150"),
            Ok(CropRect::new(100.0, 75.0, 200.0, 150.0))
        );
        assert_eq!(
            parse_crop(" 1.5, 2 ,3,4"),
            Ok(CropRect::new(1.5, 2.0, 3.0, 4.0))
        );
        assert!(parse_crop("1,2,3").is_err());
        assert!(parse_crop("a,b,c,d").is_err());
    }

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("500x375"), Ok(Size::new(500, 375)));
        assert_eq!(parse_size("20X15"), Ok(Size::new(20, 15)));
        assert!(parse_size("500").is_err());
        assert!(parse_size("-1x5").is_err());
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["cropper", "photo.jpg", "--crop", "0,0,10,10"]).unwrap();
        assert_eq!(cli.input, PathBuf::from("photo.jpg"));
        assert_eq!(cli.display, None);
        assert_eq!(cli.bounds, Size::new(500, 500));
        assert_eq!(cli.pixel_ratio, 1.0);
        assert_eq!(cli.output_format(), OutputFormat::Png);
        assert_eq!(cli.out_dir, PathBuf::from("."));
    }

    #[test]
    fn test_cli_jpeg_and_rotation() {
        let cli = Cli::try_parse_from([
            "cropper",
            "photo.jpg",
            "--crop",
            "100,75,200,150",
            "--display",
            "500x375",
            "--rotate",
            "-90",
            "--format",
            "jpeg",
            "--quality",
            "70",
        ])
        .unwrap();
        assert_eq!(cli.rotate, -90.0);
        assert_eq!(cli.display, Some(Size::new(500, 375)));
        assert_eq!(cli.output_format(), OutputFormat::Jpeg { quality: 70 });
    }

    #[test]
    fn test_crop_is_required() {
        assert!(Cli::try_parse_from(["cropper", "photo.jpg"]).is_err());
    }
}
