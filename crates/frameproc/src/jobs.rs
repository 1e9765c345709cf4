//! The four offline jobs: trim, still capture, cropped-clip extraction,
//! and redaction/watermark re-encode.
//!
//! All four walk the same skeleton: seek, pull decoded frames, transform,
//! push to the sink, report `elapsed / total` progress. A cancelled job
//! stops sampling first and then finalizes its sink, so the encoder is
//! never left waiting on frames that will not arrive.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use image::ImageFormat;

use scenecast_common::error::{ScenecastError, ScenecastResult};
use scenecast_composition_model::{CropRegion, WatermarkSpec};
use scenecast_compositor::{Frame, WatermarkRenderer};

use crate::clip::{ClipSink, ClipSource};
use crate::transform::{apply_crop_band, apply_mosaic, PixelRegion};

/// Fractional progress callback, called with values in [0, 1].
pub type ProgressFn = Box<dyn Fn(f64) + Send>;

/// Progress reporting and cancellation for one job.
pub struct JobContext {
    progress: Option<ProgressFn>,
    cancel: Arc<AtomicBool>,
}

impl JobContext {
    pub fn new() -> Self {
        Self {
            progress: None,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_progress(progress: ProgressFn) -> Self {
        Self {
            progress: Some(progress),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Shared flag a caller sets to stop the job at the next frame.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.cancel.clone()
    }

    fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    fn report(&self, fraction: f64) {
        if let Some(progress) = &self.progress {
            progress(fraction.clamp(0.0, 1.0));
        }
    }
}

impl Default for JobContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Redaction applied to each frame before re-encoding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HeadRemoval {
    /// Fill the top `crop_line_pct` percent of frame height with black.
    CropBand { crop_line_pct: f64 },
    /// Pixelate a region with square blocks of `block_size`.
    Mosaic {
        region: PixelRegion,
        block_size: u32,
    },
}

/// Output encoding for still captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StillFormat {
    Jpeg,
    Png,
}

/// Copy the `[start, end)` range of a recording into the sink.
///
/// Output duration ≈ `end - start`. The seek completes before sampling
/// starts, and frames an inexact seek delivers from before `start` are
/// skipped rather than encoded.
pub fn trim_clip(
    source: &mut dyn ClipSource,
    sink: Box<dyn ClipSink>,
    start_secs: f64,
    end_secs: f64,
    ctx: &JobContext,
) -> ScenecastResult<PathBuf> {
    if end_secs <= start_secs {
        return Err(ScenecastError::frame_processing(format!(
            "Invalid trim range: {start_secs:.3}..{end_secs:.3}"
        )));
    }

    let total = end_secs - start_secs;
    process_range(source, sink, start_secs, Some(end_secs), ctx, |_frame| Ok(()), total)
}

/// Capture one frame at `at_secs` as a compressed still image.
///
/// An optional crop is taken from the source rectangle first; an optional
/// target size scales the result (crop-then-scale).
pub fn capture_still(
    source: &mut dyn ClipSource,
    at_secs: f64,
    crop: Option<CropRegion>,
    target_size: Option<(u32, u32)>,
    format: StillFormat,
    output: &Path,
) -> ScenecastResult<PathBuf> {
    source.seek(at_secs)?;

    let mut frame = loop {
        let Some(decoded) = source.next_frame()? else {
            return Err(ScenecastError::frame_processing(format!(
                "No frame available at {at_secs:.3}s"
            )));
        };
        if decoded.pts_secs >= at_secs {
            break decoded.image;
        }
    };

    if let Some(region) = crop {
        frame = frame.crop(region.x, region.y, region.width, region.height);
    }
    if let Some((width, height)) = target_size {
        frame = frame.scaled_to(width, height);
    }

    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    match format {
        StillFormat::Png => {
            frame
                .as_image()
                .save_with_format(output, ImageFormat::Png)
                .map_err(|e| ScenecastError::frame_processing(format!("PNG encode failed: {e}")))?;
        }
        StillFormat::Jpeg => {
            // JPEG has no alpha channel.
            let rgb = image::DynamicImage::ImageRgba8(frame.as_image().clone()).into_rgb8();
            rgb.save_with_format(output, ImageFormat::Jpeg)
                .map_err(|e| ScenecastError::frame_processing(format!("JPEG encode failed: {e}")))?;
        }
    }

    tracing::info!(output = %output.display(), at_secs, "Still frame captured");
    Ok(output.to_path_buf())
}

/// Fixed downstream resolution for a cropped clip, chosen by crop aspect.
pub fn cropped_target_size(crop: &CropRegion) -> (u32, u32) {
    if crop.aspect() >= 1.0 {
        (1280, 720)
    } else {
        (720, 1280)
    }
}

/// Extract the crop region of every frame into a clip scaled to `target`.
pub fn extract_cropped_clip(
    source: &mut dyn ClipSource,
    sink: Box<dyn ClipSink>,
    crop: CropRegion,
    target: (u32, u32),
    ctx: &JobContext,
) -> ScenecastResult<PathBuf> {
    let total = source.info().duration_secs;
    process_range(
        source,
        sink,
        0.0,
        None,
        ctx,
        move |frame| {
            *frame = frame
                .crop(crop.x, crop.y, crop.width, crop.height)
                .scaled_to(target.0, target.1);
            Ok(())
        },
        total,
    )
}

/// Re-encode the full recording with redaction and/or a re-baked watermark.
pub fn redact_clip(
    source: &mut dyn ClipSource,
    sink: Box<dyn ClipSink>,
    head_removal: Option<HeadRemoval>,
    watermark: Option<(&WatermarkRenderer, &WatermarkSpec)>,
    ctx: &JobContext,
) -> ScenecastResult<PathBuf> {
    let total = source.info().duration_secs;
    process_range(
        source,
        sink,
        0.0,
        None,
        ctx,
        move |frame| {
            match head_removal {
                Some(HeadRemoval::CropBand { crop_line_pct }) => {
                    apply_crop_band(frame, crop_line_pct);
                }
                Some(HeadRemoval::Mosaic { region, block_size }) => {
                    apply_mosaic(frame, region, block_size);
                }
                None => {}
            }
            if let Some((renderer, spec)) = watermark {
                renderer.draw(frame, spec);
            }
            Ok(())
        },
        total,
    )
}

/// Shared decode-transform-encode loop.
///
/// Samples from `start_secs` until `end_secs` (or end of stream), applies
/// the transform in place, and finalizes the sink exactly once — also on
/// cancellation, so buffered output is still flushed.
fn process_range(
    source: &mut dyn ClipSource,
    mut sink: Box<dyn ClipSink>,
    start_secs: f64,
    end_secs: Option<f64>,
    ctx: &JobContext,
    mut transform: impl FnMut(&mut Frame) -> ScenecastResult<()>,
    total_secs: f64,
) -> ScenecastResult<PathBuf> {
    if start_secs > 0.0 {
        source.seek(start_secs)?;
    }

    let total = total_secs.max(f64::EPSILON);
    let mut pushed = 0u64;
    while !ctx.cancelled() {
        let Some(mut decoded) = source.next_frame()? else {
            break;
        };
        if decoded.pts_secs < start_secs {
            continue;
        }
        if let Some(end) = end_secs {
            if decoded.pts_secs >= end {
                break;
            }
        }

        transform(&mut decoded.image)?;
        sink.push(&decoded.image)?;
        pushed += 1;
        ctx.report((decoded.pts_secs - start_secs) / total);
    }

    let cancelled = ctx.cancelled();
    let path = sink.finish()?;
    if cancelled {
        tracing::info!(output = %path.display(), frames = pushed, "Job cancelled; partial output finalized");
    } else {
        ctx.report(1.0);
        tracing::info!(output = %path.display(), frames = pushed, "Offline job complete");
    }
    Ok(path)
}
