//! Capture a single frame as a still image.

use std::path::PathBuf;

use scenecast_frameproc::{capture_still, GstClipSource, StillFormat};

use super::{parse_crop, parse_size};

pub fn run(
    input: PathBuf,
    output: PathBuf,
    at: f64,
    crop: Option<String>,
    size: Option<String>,
) -> anyhow::Result<()> {
    let crop = crop.as_deref().map(parse_crop).transpose()?;
    let size = size.as_deref().map(parse_size).transpose()?;
    let format = match output.extension().and_then(|e| e.to_str()) {
        Some("jpg") | Some("jpeg") => StillFormat::Jpeg,
        _ => StillFormat::Png,
    };

    println!("Capturing frame at {at:.2}s from {}", input.display());

    let mut source = GstClipSource::open(&input)?;
    let path = capture_still(&mut source, at, crop, size, format, &output)?;

    println!("Still frame: {}", path.display());
    Ok(())
}
