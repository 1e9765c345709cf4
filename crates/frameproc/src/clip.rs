//! The decode/encode seam for offline jobs.
//!
//! A [`ClipSource`] yields decoded RGBA frames in presentation order and
//! supports seeking; a [`ClipSink`] accepts frames and finalizes to an
//! output file. Jobs are written against the traits; production wires in
//! the GStreamer implementations below, tests use synthetic ones.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use gst::prelude::*;
use gstreamer as gst;
use gstreamer_app as gst_app;

use scenecast_common::error::{ScenecastError, ScenecastResult};
use scenecast_compositor::Frame;
use scenecast_recorder::encoder::EncoderPipeline;
use scenecast_recorder::{EncoderSettings, GstEncoderFactory, RecordingSink};

/// How long a stalled decoder is given before the job is failed instead
/// of left hanging.
const PULL_TIMEOUT: Duration = Duration::from_secs(5);
const SEEK_TIMEOUT: Duration = Duration::from_secs(10);

/// Stream properties of an opened recording.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipInfo {
    pub width: u32,
    pub height: u32,
    pub duration_secs: f64,
    pub fps: u32,
}

/// One decoded frame with its presentation timestamp.
#[derive(Debug, Clone)]
pub struct DecodedFrame {
    pub image: Frame,
    pub pts_secs: f64,
}

/// A seekable source of decoded frames.
pub trait ClipSource: Send {
    fn info(&self) -> ClipInfo;

    /// Seek to a position. Returns only once the seek has completed;
    /// frames read afterwards reflect the new position, never stale data.
    fn seek(&mut self, to_secs: f64) -> ScenecastResult<()>;

    /// The next frame in presentation order, or `None` at end of stream.
    fn next_frame(&mut self) -> ScenecastResult<Option<DecodedFrame>>;
}

/// An encoder accepting processed frames.
pub trait ClipSink: Send {
    fn push(&mut self, frame: &Frame) -> ScenecastResult<()>;

    /// Flush and close the output, returning its path.
    fn finish(self: Box<Self>) -> ScenecastResult<PathBuf>;
}

/// Decodes a recording through `uridecodebin` into RGBA frames.
pub struct GstClipSource {
    pipeline: gst::Pipeline,
    appsink: gst_app::AppSink,
    info: ClipInfo,
}

impl GstClipSource {
    /// Open a recording for frame-by-frame reading.
    ///
    /// The pipeline is prerolled before this returns, so stream
    /// properties are known and the first pull yields real data.
    pub fn open(path: &Path) -> ScenecastResult<Self> {
        init_gstreamer()?;

        let absolute = path.canonicalize().map_err(|_| ScenecastError::FileNotFound {
            path: path.to_path_buf(),
        })?;
        let uri = format!("file://{}", absolute.display());
        let launch = format!(
            "uridecodebin uri=\"{}\" ! videoconvert ! appsink name=frame-sink",
            uri.replace('"', "\\\"")
        );
        tracing::debug!(%launch, "Building decode pipeline");

        let element = gst::parse::launch(&launch).map_err(|e| {
            ScenecastError::frame_processing(format!("Failed to build decoder: {e}"))
        })?;
        let pipeline = element
            .dynamic_cast::<gst::Pipeline>()
            .map_err(|_| ScenecastError::frame_processing("Decode launch did not produce a pipeline"))?;

        let appsink = pipeline
            .by_name("frame-sink")
            .and_then(|e| e.dynamic_cast::<gst_app::AppSink>().ok())
            .ok_or_else(|| ScenecastError::frame_processing("Decode pipeline lost its appsink"))?;
        appsink.set_caps(Some(
            &gst::Caps::builder("video/x-raw").field("format", "RGBA").build(),
        ));
        // Offline processing runs as fast as decode allows.
        appsink.set_property("sync", false);

        pipeline.set_state(gst::State::Paused).map_err(|e| {
            ScenecastError::frame_processing(format!("Failed to preroll decoder: {e:?}"))
        })?;

        // try_pull_preroll bounds the wait; a source that never produces
        // data fails the open instead of hanging the job.
        let preroll = appsink
            .try_pull_preroll(gst::ClockTime::from_seconds(PULL_TIMEOUT.as_secs()))
            .ok_or_else(|| {
                let _ = pipeline.set_state(gst::State::Null);
                ScenecastError::frame_processing(format!(
                    "Source failed to decode: {}",
                    path.display()
                ))
            })?;

        let (width, height, fps) = dimensions_from_caps(preroll.caps())?;
        let duration_secs = pipeline
            .query_duration::<gst::ClockTime>()
            .map(|d| d.nseconds() as f64 / 1e9)
            .unwrap_or(0.0);

        pipeline.set_state(gst::State::Playing).map_err(|e| {
            ScenecastError::frame_processing(format!("Failed to start decoder: {e:?}"))
        })?;

        tracing::info!(
            input = %path.display(),
            width,
            height,
            fps,
            duration_secs,
            "Opened recording for frame processing"
        );

        Ok(Self {
            pipeline,
            appsink,
            info: ClipInfo {
                width,
                height,
                duration_secs,
                fps,
            },
        })
    }

    fn bus_error(&self) -> Option<String> {
        let bus = self.pipeline.bus()?;
        while let Some(msg) = bus.pop() {
            if let gst::MessageView::Error(e) = msg.view() {
                return Some(e.error().to_string());
            }
        }
        None
    }
}

impl ClipSource for GstClipSource {
    fn info(&self) -> ClipInfo {
        self.info
    }

    fn seek(&mut self, to_secs: f64) -> ScenecastResult<()> {
        let position = gst::ClockTime::from_nseconds((to_secs.max(0.0) * 1e9) as u64);
        self.pipeline
            .seek_simple(gst::SeekFlags::FLUSH | gst::SeekFlags::ACCURATE, position)
            .map_err(|e| ScenecastError::frame_processing(format!("Seek rejected: {e}")))?;

        // Frames sampled before AsyncDone would be stale pre-seek data.
        let bus = self
            .pipeline
            .bus()
            .ok_or_else(|| ScenecastError::frame_processing("Decode pipeline has no bus"))?;
        let timeout = gst::ClockTime::from_seconds(SEEK_TIMEOUT.as_secs());
        match bus.timed_pop_filtered(
            timeout,
            &[gst::MessageType::AsyncDone, gst::MessageType::Error],
        ) {
            Some(msg) => match msg.view() {
                gst::MessageView::AsyncDone(_) => Ok(()),
                gst::MessageView::Error(e) => Err(ScenecastError::frame_processing(format!(
                    "Seek failed: {}",
                    e.error()
                ))),
                _ => Ok(()),
            },
            None => Err(ScenecastError::frame_processing(format!(
                "Seek to {to_secs:.3}s did not complete within {}s",
                SEEK_TIMEOUT.as_secs()
            ))),
        }
    }

    fn next_frame(&mut self) -> ScenecastResult<Option<DecodedFrame>> {
        if self.appsink.is_eos() {
            return Ok(None);
        }

        let timeout = gst::ClockTime::from_seconds(PULL_TIMEOUT.as_secs());
        let Some(sample) = self.appsink.try_pull_sample(timeout) else {
            if self.appsink.is_eos() {
                return Ok(None);
            }
            if let Some(message) = self.bus_error() {
                return Err(ScenecastError::frame_processing(format!(
                    "Decode failed: {message}"
                )));
            }
            return Err(ScenecastError::frame_processing(format!(
                "Decoder produced no frame within {}s",
                PULL_TIMEOUT.as_secs()
            )));
        };

        let (width, height, _) = dimensions_from_caps(sample.caps())?;
        let buffer = sample
            .buffer()
            .ok_or_else(|| ScenecastError::frame_processing("Sample carried no buffer"))?;
        let pts_secs = buffer
            .pts()
            .map(|t| t.nseconds() as f64 / 1e9)
            .unwrap_or(0.0);
        let map = buffer
            .map_readable()
            .map_err(|_| ScenecastError::frame_processing("Failed to map decoded buffer"))?;

        let image = frame_from_rgba(width, height, map.as_slice())?;
        Ok(Some(DecodedFrame { image, pts_secs }))
    }
}

impl Drop for GstClipSource {
    fn drop(&mut self) {
        let _ = self.pipeline.set_state(gst::State::Null);
    }
}

/// Encodes processed frames through the recorder's pipeline, reusing the
/// same codec preference probe as live sessions.
pub struct GstClipSink {
    pipeline: EncoderPipeline,
}

impl GstClipSink {
    /// `output_stem` has no extension; the selected container appends one.
    pub fn create(
        width: u32,
        height: u32,
        fps: u32,
        output_stem: &Path,
        factory: &GstEncoderFactory,
    ) -> ScenecastResult<Self> {
        let codec = factory.select()?;
        let settings = EncoderSettings {
            width,
            height,
            fps,
            include_audio: false,
            sample_rate: 48_000,
            audio_channels: 2,
        };
        let path = output_stem.with_extension(codec.file_extension);
        let pipeline = EncoderPipeline::create("offline", codec, &settings, path)?;
        Ok(Self { pipeline })
    }
}

impl ClipSink for GstClipSink {
    fn push(&mut self, frame: &Frame) -> ScenecastResult<()> {
        self.pipeline.push_frame(frame)
    }

    fn finish(self: Box<Self>) -> ScenecastResult<PathBuf> {
        match self.pipeline.finish_blocking() {
            scenecast_recorder::EncoderEvent::Finished(path) => Ok(path),
            scenecast_recorder::EncoderEvent::Error(message) => Err(
                ScenecastError::frame_processing(format!("Encoder failed to finalize: {message}")),
            ),
        }
    }
}

fn dimensions_from_caps(caps: Option<&gst::CapsRef>) -> ScenecastResult<(u32, u32, u32)> {
    let structure = caps
        .and_then(|c| c.structure(0))
        .ok_or_else(|| ScenecastError::frame_processing("Decoded sample carried no caps"))?;
    let width = structure
        .get::<i32>("width")
        .map_err(|_| ScenecastError::frame_processing("Caps missing width"))?;
    let height = structure
        .get::<i32>("height")
        .map_err(|_| ScenecastError::frame_processing("Caps missing height"))?;
    let fps = structure
        .get::<gst::Fraction>("framerate")
        .ok()
        .map(|f| {
            let denom = f.denom().max(1);
            ((f.numer() as f64 / denom as f64).round() as u32).max(1)
        })
        .unwrap_or(30);
    Ok((width.max(1) as u32, height.max(1) as u32, fps))
}

/// Build a [`Frame`] from mapped buffer bytes, tolerating row padding.
fn frame_from_rgba(width: u32, height: u32, data: &[u8]) -> ScenecastResult<Frame> {
    let expected = width as usize * height as usize * 4;
    if data.len() == expected {
        return Frame::from_rgba_bytes(width, height, data.to_vec())
            .ok_or_else(|| ScenecastError::frame_processing("Decoded buffer size mismatch"));
    }
    if data.len() < expected {
        return Err(ScenecastError::frame_processing(format!(
            "Decoded buffer too small: {} < {expected}",
            data.len()
        )));
    }

    // Stride-aligned rows: copy the packed prefix of each row.
    let stride = data.len() / height as usize;
    let row_bytes = width as usize * 4;
    let mut packed = Vec::with_capacity(expected);
    for row in 0..height as usize {
        let start = row * stride;
        packed.extend_from_slice(&data[start..start + row_bytes]);
    }
    Frame::from_rgba_bytes(width, height, packed)
        .ok_or_else(|| ScenecastError::frame_processing("Decoded buffer size mismatch"))
}

fn init_gstreamer() -> ScenecastResult<()> {
    static GST_INIT: OnceLock<Result<(), String>> = OnceLock::new();
    let init_res = GST_INIT.get_or_init(|| gst::init().map_err(|e| e.to_string()));
    match init_res {
        Ok(()) => Ok(()),
        Err(e) => Err(ScenecastError::frame_processing(format!(
            "Failed to initialize GStreamer: {e}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_buffer_round_trips() {
        let data = vec![9u8; 4 * 4 * 4];
        let frame = frame_from_rgba(4, 4, &data).unwrap();
        assert_eq!(frame.width(), 4);
        assert_eq!(frame.get_pixel(3, 3), [9, 9, 9, 9]);
    }

    #[test]
    fn strided_buffer_drops_row_padding() {
        // 2x2 RGBA with 4 bytes of padding per row.
        let mut data = Vec::new();
        for row in 0..2u8 {
            for col in 0..2u8 {
                data.extend_from_slice(&[row, col, 0, 255]);
            }
            data.extend_from_slice(&[0xEE; 4]);
        }
        let frame = frame_from_rgba(2, 2, &data).unwrap();
        assert_eq!(frame.get_pixel(0, 0), [0, 0, 0, 255]);
        assert_eq!(frame.get_pixel(1, 1), [1, 1, 0, 255]);
    }

    #[test]
    fn short_buffer_is_an_error() {
        let err = frame_from_rgba(4, 4, &[0u8; 10]).unwrap_err();
        assert!(matches!(err, ScenecastError::FrameProcessing { .. }));
    }
}
