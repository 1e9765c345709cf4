//! Encoder pipelines and codec capability probing.
//!
//! Codec selection walks a fixed preference list and feature-detects each
//! candidate's GStreamer elements; the first fully supported candidate
//! wins, with H.264-in-Matroska as the generic fallback. Pipelines are
//! fed through `appsrc` elements: RGBA frames from the compositor (or
//! raw webcam) and interleaved F32 audio from the mix graph.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use gst::prelude::*;
use gstreamer as gst;
use gstreamer_app as gst_app;
use tokio::sync::oneshot;

use scenecast_common::error::{ScenecastError, ScenecastResult};
use scenecast_compositor::Frame;

/// One entry in the codec preference list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecCandidate {
    pub name: &'static str,
    pub video_encoder: &'static str,
    pub audio_encoder: &'static str,
    pub muxer: &'static str,
    pub file_extension: &'static str,
}

/// Preference order: VP9/Opus webm, VP8/Opus webm, then the generic
/// H.264/Opus Matroska fallback.
pub const CODEC_PREFERENCES: &[CodecCandidate] = &[
    CodecCandidate {
        name: "vp9-opus-webm",
        video_encoder: "vp9enc",
        audio_encoder: "opusenc",
        muxer: "webmmux",
        file_extension: "webm",
    },
    CodecCandidate {
        name: "vp8-opus-webm",
        video_encoder: "vp8enc",
        audio_encoder: "opusenc",
        muxer: "webmmux",
        file_extension: "webm",
    },
    CodecCandidate {
        name: "h264-opus-mkv",
        video_encoder: "x264enc",
        audio_encoder: "opusenc",
        muxer: "matroskamux",
        file_extension: "mkv",
    },
];

/// Whether a GStreamer element factory exists on this system.
pub fn element_available(element: &str) -> bool {
    if init_gstreamer().is_err() {
        return false;
    }
    gst::ElementFactory::find(element).is_some()
}

/// Pick the highest-priority candidate whose elements all probe as
/// available. The probe is injectable so selection logic is testable
/// without a GStreamer runtime.
pub fn select_codec(probe: impl Fn(&str) -> bool) -> ScenecastResult<&'static CodecCandidate> {
    for candidate in CODEC_PREFERENCES {
        let supported = probe(candidate.video_encoder)
            && probe(candidate.audio_encoder)
            && probe(candidate.muxer);
        if supported {
            tracing::info!(codec = candidate.name, "Selected encoder candidate");
            return Ok(candidate);
        }
        tracing::debug!(codec = candidate.name, "Encoder candidate unavailable");
    }

    Err(ScenecastError::encoding_unsupported(format!(
        "No supported codec among: {}",
        CODEC_PREFERENCES
            .iter()
            .map(|c| c.name)
            .collect::<Vec<_>>()
            .join(", ")
    )))
}

/// Stream parameters for one encoder pipeline.
#[derive(Debug, Clone, Copy)]
pub struct EncoderSettings {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub include_audio: bool,
    pub sample_rate: u32,
    pub audio_channels: u16,
}

fn video_encoder_fragment(codec: &CodecCandidate, fps: u32) -> String {
    // One keyframe every 2 seconds keeps files seekable without bloat.
    let keyint = fps.saturating_mul(2).max(2);
    match codec.video_encoder {
        "x264enc" => format!(
            "x264enc tune=zerolatency speed-preset=veryfast key-int-max={keyint} ! h264parse"
        ),
        encoder => format!("{encoder} deadline=1 cpu-used=4 keyframe-max-dist={keyint}"),
    }
}

/// Build the `gst::parse::launch` string for one encoder pipeline.
pub fn build_encode_launch(
    codec: &CodecCandidate,
    settings: &EncoderSettings,
    output_path: &Path,
) -> String {
    let path = escape_path(output_path);
    let video = video_encoder_fragment(codec, settings.fps);
    let mut launch = format!(
        "appsrc name=video-src format=time block=true caps=video/x-raw,format=RGBA,width={w},height={h},framerate={fps}/1 ! queue max-size-buffers=8 ! videoconvert ! {video} ! queue max-size-buffers=8 ! {mux} name=mux ! filesink location=\"{path}\"",
        w = settings.width,
        h = settings.height,
        fps = settings.fps.max(1),
        mux = codec.muxer,
    );

    if settings.include_audio {
        launch.push_str(&format!(
            " appsrc name=audio-src format=time block=true caps=audio/x-raw,format=F32LE,layout=interleaved,rate={rate},channels={ch} ! queue ! audioconvert ! audioresample ! {aenc} ! queue ! mux.",
            rate = settings.sample_rate.max(1),
            ch = settings.audio_channels.max(1),
            aenc = codec.audio_encoder,
        ));
    }

    launch
}

/// Terminal event emitted by an encoder once its output is flushed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncoderEvent {
    Finished(PathBuf),
    Error(String),
}

/// A sink accepting composited or raw frames for one recording.
///
/// `finalize` consumes the sink and reports completion over a channel so
/// the session can await both encoders in whatever order they finish.
pub trait RecordingSink: Send {
    fn output_path(&self) -> &Path;

    fn push_frame(&mut self, frame: &Frame) -> ScenecastResult<()>;

    fn push_audio(&mut self, samples: &[f32]) -> ScenecastResult<()>;

    fn finalize(self: Box<Self>) -> oneshot::Receiver<EncoderEvent>;
}

/// A GStreamer-backed encoder pipeline.
pub struct EncoderPipeline {
    name: String,
    pipeline: gst::Pipeline,
    video_src: gst_app::AppSrc,
    audio_src: Option<gst_app::AppSrc>,
    output_path: PathBuf,
    fps: u32,
    sample_rate: u32,
    audio_channels: u16,
    frames_pushed: u64,
    audio_frames_pushed: u64,
}

impl EncoderPipeline {
    /// Build and start the pipeline described by the codec candidate.
    pub fn create(
        name: impl Into<String>,
        codec: &CodecCandidate,
        settings: &EncoderSettings,
        output_path: PathBuf,
    ) -> ScenecastResult<Self> {
        init_gstreamer()?;
        let name = name.into();

        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let launch = build_encode_launch(codec, settings, &output_path);
        tracing::debug!(pipeline = %name, %launch, "Building encoder pipeline");

        let element = gst::parse::launch(&launch).map_err(|e| {
            ScenecastError::render(format!("Failed to build {name} encoder: {e}"))
        })?;
        let pipeline = element.dynamic_cast::<gst::Pipeline>().map_err(|_| {
            ScenecastError::render(format!("{name} launch did not produce a pipeline"))
        })?;

        let video_src = pipeline
            .by_name("video-src")
            .and_then(|e| e.dynamic_cast::<gst_app::AppSrc>().ok())
            .ok_or_else(|| ScenecastError::render(format!("{name} pipeline lost its appsrc")))?;

        let audio_src = if settings.include_audio {
            Some(
                pipeline
                    .by_name("audio-src")
                    .and_then(|e| e.dynamic_cast::<gst_app::AppSrc>().ok())
                    .ok_or_else(|| {
                        ScenecastError::render(format!("{name} pipeline lost its audio appsrc"))
                    })?,
            )
        } else {
            None
        };

        pipeline.set_state(gst::State::Playing).map_err(|e| {
            ScenecastError::render(format!("Failed to start {name} encoder: {e:?}"))
        })?;

        tracing::info!(pipeline = %name, output = %output_path.display(), "Encoder pipeline started");

        Ok(Self {
            name,
            pipeline,
            video_src,
            audio_src,
            output_path,
            fps: settings.fps.max(1),
            sample_rate: settings.sample_rate.max(1),
            audio_channels: settings.audio_channels.max(1),
            frames_pushed: 0,
            audio_frames_pushed: 0,
        })
    }

    /// Finalize synchronously. Used by offline pipelines that already run
    /// on a blocking thread; live sessions go through [`RecordingSink::finalize`].
    pub fn finish_blocking(mut self) -> EncoderEvent {
        self.finalize_blocking()
    }

    fn finalize_blocking(&mut self) -> EncoderEvent {
        let _ = self.video_src.end_of_stream();
        if let Some(audio) = &self.audio_src {
            let _ = audio.end_of_stream();
        }

        // Wait for EOS to propagate so the muxer can flush its output.
        // Bounded by a deadline so a wedged pipeline cannot hang stop().
        let mut result = EncoderEvent::Finished(self.output_path.clone());
        if let Some(bus) = self.pipeline.bus() {
            let deadline = Duration::from_secs(10);
            let start = std::time::Instant::now();
            loop {
                let elapsed = start.elapsed();
                if elapsed >= deadline {
                    tracing::warn!(pipeline = %self.name, "EOS drain timed out after 10s");
                    break;
                }
                let remaining = deadline - elapsed;
                match bus.timed_pop(gst::ClockTime::from_nseconds(remaining.as_nanos() as u64)) {
                    Some(msg) => match msg.view() {
                        gst::MessageView::Eos(_) => {
                            tracing::debug!(pipeline = %self.name, "EOS received; encoder drained");
                            break;
                        }
                        gst::MessageView::Error(e) => {
                            tracing::warn!(pipeline = %self.name, error = %e.error(), "Encoder error during drain");
                            result = EncoderEvent::Error(e.error().to_string());
                            break;
                        }
                        _ => {}
                    },
                    None => {
                        tracing::warn!(pipeline = %self.name, "EOS drain timed out after 10s");
                        break;
                    }
                }
            }
        }

        if let Err(e) = self.pipeline.set_state(gst::State::Null) {
            result = EncoderEvent::Error(format!("Failed to stop {}: {e:?}", self.name));
        }

        tracing::info!(
            pipeline = %self.name,
            frames = self.frames_pushed,
            output = %self.output_path.display(),
            "Encoder finalized"
        );
        result
    }
}

impl Drop for EncoderPipeline {
    fn drop(&mut self) {
        // Redundant after finalize; releases the pipeline when a session
        // is torn down without stopping cleanly.
        let _ = self.pipeline.set_state(gst::State::Null);
    }
}

impl RecordingSink for EncoderPipeline {
    fn output_path(&self) -> &Path {
        &self.output_path
    }

    fn push_frame(&mut self, frame: &Frame) -> ScenecastResult<()> {
        let frame_duration_ns = 1_000_000_000u64 / self.fps as u64;
        let pts_ns = self.frames_pushed * frame_duration_ns;

        let mut buffer = gst::Buffer::from_mut_slice(frame.to_rgba_bytes());
        if let Some(buffer) = buffer.get_mut() {
            buffer.set_pts(gst::ClockTime::from_nseconds(pts_ns));
            buffer.set_duration(gst::ClockTime::from_nseconds(frame_duration_ns));
        }

        self.video_src.push_buffer(buffer).map_err(|e| {
            ScenecastError::render(format!("{} rejected a frame: {e:?}", self.name))
        })?;
        self.frames_pushed += 1;
        Ok(())
    }

    fn push_audio(&mut self, samples: &[f32]) -> ScenecastResult<()> {
        let Some(audio_src) = &self.audio_src else {
            return Ok(());
        };

        let frames = samples.len() as u64 / self.audio_channels as u64;
        let pts_ns = self.audio_frames_pushed * 1_000_000_000 / self.sample_rate as u64;
        let duration_ns = frames * 1_000_000_000 / self.sample_rate as u64;

        let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
        let mut buffer = gst::Buffer::from_mut_slice(bytes);
        if let Some(buffer) = buffer.get_mut() {
            buffer.set_pts(gst::ClockTime::from_nseconds(pts_ns));
            buffer.set_duration(gst::ClockTime::from_nseconds(duration_ns));
        }

        audio_src.push_buffer(buffer).map_err(|e| {
            ScenecastError::render(format!("{} rejected audio: {e:?}", self.name))
        })?;
        self.audio_frames_pushed += frames;
        Ok(())
    }

    fn finalize(mut self: Box<Self>) -> oneshot::Receiver<EncoderEvent> {
        let (tx, rx) = oneshot::channel();
        tokio::task::spawn_blocking(move || {
            let event = self.finalize_blocking();
            let _ = tx.send(event);
        });
        rx
    }
}

/// Creates real GStreamer encoder pipelines for recording sessions.
#[derive(Debug, Clone, Default)]
pub struct GstEncoderFactory {
    /// When set, only this named candidate is considered.
    pub codec_override: Option<String>,
}

impl GstEncoderFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&self) -> ScenecastResult<&'static CodecCandidate> {
        match &self.codec_override {
            Some(name) => {
                let candidate = CODEC_PREFERENCES
                    .iter()
                    .find(|c| c.name == name)
                    .ok_or_else(|| {
                        ScenecastError::config(format!("Unknown codec override: {name}"))
                    })?;
                select_codec(|element| {
                    element_available(element)
                        && (candidate.video_encoder == element
                            || candidate.audio_encoder == element
                            || candidate.muxer == element)
                })
            }
            None => select_codec(element_available),
        }
    }
}

fn init_gstreamer() -> ScenecastResult<()> {
    static GST_INIT: OnceLock<Result<(), String>> = OnceLock::new();
    let init_res = GST_INIT.get_or_init(|| gst::init().map_err(|e| e.to_string()));
    match init_res {
        Ok(()) => Ok(()),
        Err(e) => Err(ScenecastError::render(format!(
            "Failed to initialize GStreamer: {e}"
        ))),
    }
}

fn escape_path(path: &Path) -> String {
    path.to_string_lossy().replace('"', "\\\"")
}
