//! Re-encode a recording with redaction effects and/or a watermark.

use std::path::PathBuf;

use scenecast_common::config::AppConfig;
use scenecast_composition_model::WatermarkSpec;
use scenecast_compositor::{OverlayFont, WatermarkRenderer};
use scenecast_frameproc::{
    redact_clip, ClipSource, GstClipSink, GstClipSource, HeadRemoval, JobContext,
};

use super::{encoder_factory, parse_mosaic, progress_printer};

pub fn run(
    config: &AppConfig,
    input: PathBuf,
    output: PathBuf,
    crop_band: Option<f64>,
    mosaic: Option<String>,
    watermark: Option<String>,
) -> anyhow::Result<()> {
    anyhow::ensure!(
        crop_band.is_some() || mosaic.is_some() || watermark.is_some(),
        "Nothing to do: pass --crop-band, --mosaic, and/or --watermark"
    );
    anyhow::ensure!(
        crop_band.is_none() || mosaic.is_none(),
        "--crop-band and --mosaic are mutually exclusive"
    );

    let head_removal = match (crop_band, mosaic.as_deref()) {
        (Some(pct), None) => Some(HeadRemoval::CropBand { crop_line_pct: pct }),
        (None, Some(spec)) => {
            let (region, block_size) = parse_mosaic(spec)?;
            Some(HeadRemoval::Mosaic { region, block_size })
        }
        _ => None,
    };

    let renderer = match &watermark {
        Some(_) => {
            let font = OverlayFont::load(&config.overlay_font)?;
            Some(WatermarkRenderer::new(font))
        }
        None => None,
    };
    let spec = watermark.map(|text| WatermarkSpec {
        text,
        ..WatermarkSpec::default()
    });

    println!("Redacting {}", input.display());

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
    let overlay = match (&renderer, &spec) {
        (Some(renderer), Some(spec)) => Some((renderer, spec)),
        _ => None,
    };
    let path = redact_clip(&mut source, Box::new(sink), head_removal, overlay, &ctx)?;

    println!("\nRedacted clip: {}", path.display());
    Ok(())
}
