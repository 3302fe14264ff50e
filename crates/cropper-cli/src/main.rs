//! Cropper - crop an image file from the command line.
//!
//! Runs the same pipeline as the browser editor: the crop is given in
//! displayed pixels, previewed at the requested pixel ratio, exported at
//! natural resolution and saved into the output directory.

mod args;
mod download;

use std::fs;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use cropper_core::{CropSession, CropperConfig, MemoryBlobRegistry, TransformParams};
use log::info;

use args::Cli;
use download::DirectoryDownload;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    run(&cli)
}

fn run(cli: &Cli) -> Result<()> {
    let config = CropperConfig {
        output: cli.output_format(),
        download_filename: cli.filename.clone(),
        pixel_ratio: cli.pixel_ratio,
        display_bounds: cli.bounds,
        ..Default::default()
    };

    let mut session = CropSession::new(
        config,
        MemoryBlobRegistry::new(),
        DirectoryDownload::new(&cli.out_dir),
    )
    .context("invalid options")?;

    let bytes = fs::read(&cli.input)
        .with_context(|| format!("failed to read {}", cli.input.display()))?;
    session
        .load_bytes(&bytes, cli.display)
        .with_context(|| format!("failed to load {}", cli.input.display()))?;

    let now = Duration::ZERO;
    session.set_transform(TransformParams::new(cli.scale, cli.rotate), now)?;
    session.complete_crop(cli.crop, now)?;

    let published = session.export().context("export failed")?;
    let size = published.blob().size();
    let filename = published.filename().to_string();

    let path = session
        .publisher()
        .download()
        .last_written()
        .with_context(|| format!("could not write {} into {}", filename, cli.out_dir.display()))?;
    info!("wrote {}x{} crop to {}", size.width, size.height, path.display());
    println!("{}", path.display());
    Ok(())
}
