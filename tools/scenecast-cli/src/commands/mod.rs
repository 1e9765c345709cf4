//! Subcommand implementations.

pub mod check;
pub mod crop_clip;
pub mod redact;
pub mod still;
pub mod trim;

use std::io::Write;

use anyhow::Context;
use scenecast_common::config::AppConfig;
use scenecast_composition_model::CropRegion;
use scenecast_frameproc::{PixelRegion, ProgressFn};
use scenecast_recorder::GstEncoderFactory;

/// Encoder factory honoring the configured codec override.
pub(crate) fn encoder_factory(config: &AppConfig) -> GstEncoderFactory {
    GstEncoderFactory {
        codec_override: config.recording.codec.clone(),
    }
}

/// Progress callback printing an in-place percentage line.
pub(crate) fn progress_printer() -> ProgressFn {
    Box::new(|fraction| {
        print!("\r  Progress: {:5.1}%  ", fraction * 100.0);
        let _ = std::io::stdout().flush();
    })
}

/// Parse `x,y,w,h` into a crop rectangle.
pub(crate) fn parse_crop(value: &str) -> anyhow::Result<CropRegion> {
    let fields = parse_fields(value, 4)?;
    let (width, height) = (fields[2], fields[3]);
    anyhow::ensure!(width > 0 && height > 0, "Crop must have a non-zero size");
    Ok(CropRegion {
        x: fields[0],
        y: fields[1],
        width,
        height,
    })
}

/// Parse `WxH` into an output size.
pub(crate) fn parse_size(value: &str) -> anyhow::Result<(u32, u32)> {
    let (w, h) = value
        .split_once(['x', 'X'])
        .with_context(|| format!("Expected WxH, got: {value}"))?;
    let width: u32 = w.trim().parse().with_context(|| format!("Bad width: {w}"))?;
    let height: u32 = h.trim().parse().with_context(|| format!("Bad height: {h}"))?;
    anyhow::ensure!(width > 0 && height > 0, "Size must be non-zero");
    Ok((width, height))
}

/// Parse `x,y,w,h,block` into a mosaic region and block size.
pub(crate) fn parse_mosaic(value: &str) -> anyhow::Result<(PixelRegion, u32)> {
    let fields = parse_fields(value, 5)?;
    let (width, height, block) = (fields[2], fields[3], fields[4]);
    anyhow::ensure!(width > 0 && height > 0, "Mosaic region must have a non-zero size");
    anyhow::ensure!(block > 0, "Mosaic block size must be non-zero");
    Ok((
        PixelRegion {
            x: fields[0],
            y: fields[1],
            width,
            height,
        },
        block,
    ))
}

fn parse_fields(value: &str, expected: usize) -> anyhow::Result<Vec<u32>> {
    let fields: Vec<u32> = value
        .split(',')
        .map(|f| f.trim().parse::<u32>())
        .collect::<Result<_, _>>()
        .with_context(|| format!("Expected {expected} comma-separated integers, got: {value}"))?;
    anyhow::ensure!(
        fields.len() == expected,
        "Expected {expected} comma-separated integers, got: {value}"
    );
    Ok(fields)
}
