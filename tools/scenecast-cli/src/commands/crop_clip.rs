//! Extract a crop region of a recording as its own clip.

use std::path::PathBuf;

use scenecast_common::config::AppConfig;
use scenecast_frameproc::{
    cropped_target_size, extract_cropped_clip, ClipSource, GstClipSink, GstClipSource, JobContext,
};

use super::{encoder_factory, parse_crop, progress_printer};

pub fn run(
    config: &AppConfig,
    input: PathBuf,
    output: PathBuf,
    crop: String,
) -> anyhow::Result<()> {
    let crop = parse_crop(&crop)?;
    let target = cropped_target_size(&crop);

    println!(
        "Extracting {}x{} region at ({}, {}) from {} into {}x{}",
        crop.width,
        crop.height,
        crop.x,
        crop.y,
        input.display(),
        target.0,
        target.1
    );

    let mut source = GstClipSource::open(&input)?;
    let info = source.info();
    let sink = GstClipSink::create(
        target.0,
        target.1,
        info.fps,
        &output,
        &encoder_factory(config),
    )?;

    let ctx = JobContext::with_progress(progress_printer());
    let path = extract_cropped_clip(&mut source, Box::new(sink), crop, target, &ctx)?;

    println!("\nCropped clip: {}", path.display());
    Ok(())
}
