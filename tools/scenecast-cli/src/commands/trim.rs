//! Trim a recording to a sub-range.

use std::path::PathBuf;

use scenecast_common::config::AppConfig;
use scenecast_frameproc::{trim_clip, ClipSource, GstClipSink, GstClipSource, JobContext};

use super::{encoder_factory, progress_printer};

pub fn run(
    config: &AppConfig,
    input: PathBuf,
    output: PathBuf,
    start: f64,
    end: f64,
) -> anyhow::Result<()> {
    println!("Trimming {} to {start:.2}s..{end:.2}s", input.display());

    let mut source = GstClipSource::open(&input)?;
    let info = source.info();
    let sink = GstClipSink::create(
        info.width,
        info.height,
        info.fps,
        &output,
        &encoder_factory(config),
    )?;

    let ctx = JobContext::with_progress(progress_printer());
    let path = trim_clip(&mut source, Box::new(sink), start, end, &ctx)?;

    println!("\nTrimmed clip: {}", path.display());
    Ok(())
}
