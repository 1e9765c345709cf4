//! Recording session lifecycle.
//!
//! A session owns exactly one composited encoder and at most one raw
//! encoder. Both are started together on `start` and signalled together
//! on `stop`, but each finalizes independently through its own completion
//! channel; no ordering is assumed between the two.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use scenecast_common::clock::{CaptureGate, RecordingClock};
use scenecast_common::error::{ScenecastError, ScenecastResult};
use scenecast_composition_model::{compute_crop_region, CompositionConfig};
use scenecast_compositor::{CanvasCompositor, Frame, RecordingStatus, Scene};

use crate::encoder::{
    EncoderEvent, EncoderPipeline, EncoderSettings, GstEncoderFactory, RecordingSink,
};
use crate::mixer::{AudioChannel, MixGraph};
use crate::store::{RawRecordingMetadata, RawRecordingStore};

/// State of a recording session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Starting,
    Recording,
    Stopping,
    Complete,
    Error,
}

/// Which output an encoder serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncoderRole {
    Composited,
    Raw,
}

impl EncoderRole {
    fn label(self) -> &'static str {
        match self {
            EncoderRole::Composited => "composited",
            EncoderRole::Raw => "raw",
        }
    }
}

/// Creates encoder sinks for a session.
///
/// Injected so session coordination is testable without a GStreamer
/// runtime; `output_stem` has no extension, the factory appends one for
/// the container it selects.
pub trait EncoderFactory: Send + Sync {
    fn create(
        &self,
        role: EncoderRole,
        settings: &EncoderSettings,
        output_stem: &Path,
    ) -> ScenecastResult<Box<dyn RecordingSink>>;
}

impl EncoderFactory for GstEncoderFactory {
    fn create(
        &self,
        role: EncoderRole,
        settings: &EncoderSettings,
        output_stem: &Path,
    ) -> ScenecastResult<Box<dyn RecordingSink>> {
        let codec = self.select()?;
        let path = output_stem.with_extension(codec.file_extension);
        Ok(Box::new(EncoderPipeline::create(
            role.label(),
            codec,
            settings,
            path,
        )?))
    }
}

/// Configuration for starting a session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Directory recordings are written into.
    pub output_dir: PathBuf,

    /// Target encode frame rate.
    pub target_fps: u32,

    /// Display refresh rate driving the preview loop.
    pub display_hz: u32,

    /// Sample rate of the mixed audio track.
    pub sample_rate: u32,

    /// Channel count of the mixed audio track.
    pub audio_channels: u16,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            target_fps: 30,
            display_hz: 60,
            sample_rate: 48000,
            audio_channels: 2,
        }
    }
}

/// Non-fatal conditions and secondary results reported while recording.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The mix graph carries zero audio paths; recording proceeds silent.
    NoAudio,
    /// The raw recording was persisted for the downstream pipeline.
    RawRecordingSaved { session_id: String, path: PathBuf },
    /// Raw persistence failed; the composited recording is unaffected.
    StorageFailed { session_id: String, message: String },
    /// An encoder reported a fault.
    EncoderError { role: String, message: String },
}

/// Result of a completed session.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingOutput {
    pub session_id: String,
    pub composited: PathBuf,
    pub raw: Option<PathBuf>,
}

/// Coordinates the composited and raw encoders for one recording.
pub struct RecordingSession {
    options: SessionOptions,
    state: SessionState,
    id: Option<String>,
    clock: Option<RecordingClock>,
    gate: CaptureGate,
    samples_per_capture: usize,
    config: CompositionConfig,
    mixer: Option<MixGraph>,
    composited: Option<Box<dyn RecordingSink>>,
    raw: Option<Box<dyn RecordingSink>>,
    store: Option<Arc<dyn RawRecordingStore>>,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
    events_rx: Option<mpsc::UnboundedReceiver<SessionEvent>>,
}

impl RecordingSession {
    pub fn new(options: SessionOptions, store: Option<Arc<dyn RawRecordingStore>>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let gate = CaptureGate::new(options.display_hz, options.target_fps);
        Self {
            options,
            state: SessionState::Idle,
            id: None,
            clock: None,
            gate,
            samples_per_capture: 0,
            config: CompositionConfig::default(),
            mixer: None,
            composited: None,
            raw: None,
            store,
            events_tx,
            events_rx: Some(events_rx),
        }
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Session id, allocated on start.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Recording duration so far.
    pub fn elapsed_secs(&self) -> f64 {
        self.clock.as_ref().map(|c| c.elapsed_secs()).unwrap_or(0.0)
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.clock.as_ref().map(|c| c.elapsed_ms()).unwrap_or(0.0)
    }

    /// Take the event receiver. Call once, before `start`.
    pub fn take_events(&mut self) -> Option<mpsc::UnboundedReceiver<SessionEvent>> {
        self.events_rx.take()
    }

    /// Start recording.
    ///
    /// Builds the audio mix graph, creates the composited encoder, and
    /// (when a webcam is attached) the independent raw encoder. Starting
    /// an already-started session is a no-op.
    pub fn start(
        &mut self,
        factory: &dyn EncoderFactory,
        config: &CompositionConfig,
        audio: Vec<AudioChannel>,
        webcam_size: Option<(u32, u32)>,
    ) -> ScenecastResult<()> {
        if self.state != SessionState::Idle {
            tracing::debug!(state = ?self.state, "start ignored: session already started");
            return Ok(());
        }
        self.state = SessionState::Starting;

        let id = uuid::Uuid::new_v4().to_string();
        tracing::info!(session_id = %id, "Starting recording session");

        let mixer = MixGraph::build(
            audio,
            self.options.sample_rate,
            self.options.audio_channels,
        );
        if mixer.is_silent() {
            tracing::warn!(session_id = %id, "No audio tracks in mix; recording silently");
            let _ = self.events_tx.send(SessionEvent::NoAudio);
        }

        let canvas = config.orientation.canvas_size();
        let composited_settings = EncoderSettings {
            width: canvas.width,
            height: canvas.height,
            fps: self.options.target_fps,
            include_audio: !mixer.is_silent(),
            sample_rate: self.options.sample_rate,
            audio_channels: self.options.audio_channels,
        };

        let composited_stem = self.options.output_dir.join(format!("{id}-composited"));
        let composited = match factory.create(
            EncoderRole::Composited,
            &composited_settings,
            &composited_stem,
        ) {
            Ok(sink) => sink,
            Err(e) => {
                self.state = SessionState::Error;
                return Err(e);
            }
        };

        // The raw encoder records the unfiltered webcam stream; it is a
        // secondary artifact, so a creation failure downgrades the
        // session instead of aborting it.
        let raw = match webcam_size {
            Some((width, height)) => {
                let raw_settings = EncoderSettings {
                    width,
                    height,
                    fps: self.options.target_fps,
                    include_audio: false,
                    sample_rate: self.options.sample_rate,
                    audio_channels: self.options.audio_channels,
                };
                let raw_stem = self.options.output_dir.join(format!("{id}-raw"));
                match factory.create(EncoderRole::Raw, &raw_settings, &raw_stem) {
                    Ok(sink) => Some(sink),
                    Err(e) => {
                        tracing::warn!(session_id = %id, error = %e, "Raw encoder unavailable");
                        let _ = self.events_tx.send(SessionEvent::EncoderError {
                            role: EncoderRole::Raw.label().to_string(),
                            message: e.to_string(),
                        });
                        None
                    }
                }
            }
            None => None,
        };

        self.gate = CaptureGate::new(self.options.display_hz, self.options.target_fps);
        self.samples_per_capture =
            (self.options.sample_rate / self.options.target_fps.max(1)) as usize;
        self.config = config.clone();
        self.mixer = Some(mixer);
        self.composited = Some(composited);
        self.raw = raw;
        self.id = Some(id);
        self.clock = Some(RecordingClock::start());
        self.state = SessionState::Recording;

        tracing::info!(
            session_id = %self.id.as_deref().unwrap_or(""),
            dual = self.raw.is_some(),
            "Recording session started"
        );
        Ok(())
    }

    /// Offer one composited preview frame.
    ///
    /// The capture gate decides whether this display tick is also encoded;
    /// gated ticks push the frame plus the next mixed audio block.
    pub fn push_frame(&mut self, frame: &Frame) -> ScenecastResult<()> {
        if self.state != SessionState::Recording {
            return Ok(());
        }
        if !self.gate.tick() {
            return Ok(());
        }

        let Some(composited) = self.composited.as_mut() else {
            return Ok(());
        };

        if let Err(e) = composited.push_frame(frame) {
            self.state = SessionState::Error;
            let _ = self.events_tx.send(SessionEvent::EncoderError {
                role: EncoderRole::Composited.label().to_string(),
                message: e.to_string(),
            });
            return Err(e);
        }

        if let Some(mixer) = self.mixer.as_mut() {
            if let Some(block) = mixer.mix_block(self.samples_per_capture) {
                if let Err(e) = composited.push_audio(&block) {
                    self.state = SessionState::Error;
                    let _ = self.events_tx.send(SessionEvent::EncoderError {
                        role: EncoderRole::Composited.label().to_string(),
                        message: e.to_string(),
                    });
                    return Err(e);
                }
            }
        }

        Ok(())
    }

    /// Offer one unfiltered webcam frame to the raw encoder.
    ///
    /// Raw faults never interrupt the composited recording; the raw
    /// encoder is dropped on its first error.
    pub fn push_raw_frame(&mut self, frame: &Frame) {
        if self.state != SessionState::Recording {
            return;
        }
        let Some(raw) = self.raw.as_mut() else {
            return;
        };
        if let Err(e) = raw.push_frame(frame) {
            tracing::warn!(error = %e, "Raw encoder rejected a frame; dropping raw recording");
            let _ = self.events_tx.send(SessionEvent::EncoderError {
                role: EncoderRole::Raw.label().to_string(),
                message: e.to_string(),
            });
            self.raw = None;
        }
    }

    /// Stop recording and finalize both encoders.
    ///
    /// Idempotent: stopping a session that is not recording returns
    /// `Ok(None)`. The two encoders may complete in either order; the raw
    /// side additionally persists its output to the keyed store.
    pub async fn stop(&mut self) -> ScenecastResult<Option<RecordingOutput>> {
        if self.state != SessionState::Recording && self.state != SessionState::Starting {
            tracing::debug!(state = ?self.state, "stop ignored: session not recording");
            return Ok(None);
        }
        self.state = SessionState::Stopping;

        let session_id = self.id.clone().unwrap_or_default();
        tracing::info!(session_id = %session_id, elapsed_secs = self.elapsed_secs(), "Stopping recording session");

        let composited = self.composited.take().ok_or_else(|| {
            self.state = SessionState::Error;
            ScenecastError::render("Session lost its composited encoder")
        })?;
        let raw = self.raw.take();

        let composited_rx = composited.finalize();
        let raw_rx = raw.map(|sink| sink.finalize());

        let (composited_event, raw_event) = tokio::join!(composited_rx, async {
            match raw_rx {
                Some(rx) => Some(rx.await),
                None => None,
            }
        });

        let raw_path = match raw_event {
            Some(Ok(EncoderEvent::Finished(path))) => {
                self.persist_raw(&session_id, &path);
                Some(path)
            }
            Some(Ok(EncoderEvent::Error(message))) => {
                tracing::warn!(session_id = %session_id, %message, "Raw encoder failed to finalize");
                let _ = self.events_tx.send(SessionEvent::EncoderError {
                    role: EncoderRole::Raw.label().to_string(),
                    message,
                });
                None
            }
            Some(Err(_)) => {
                tracing::warn!(session_id = %session_id, "Raw encoder completion channel closed");
                None
            }
            None => None,
        };

        let composited_path = match composited_event {
            Ok(EncoderEvent::Finished(path)) => path,
            Ok(EncoderEvent::Error(message)) => {
                self.state = SessionState::Error;
                let _ = self.events_tx.send(SessionEvent::EncoderError {
                    role: EncoderRole::Composited.label().to_string(),
                    message: message.clone(),
                });
                return Err(ScenecastError::render(format!(
                    "Composited encoder failed: {message}"
                )));
            }
            Err(_) => {
                self.state = SessionState::Error;
                return Err(ScenecastError::render(
                    "Composited encoder completion channel closed",
                ));
            }
        };

        self.mixer = None;
        self.state = SessionState::Complete;
        tracing::info!(
            session_id = %session_id,
            composited = %composited_path.display(),
            raw = raw_path.is_some(),
            "Recording session complete"
        );

        Ok(Some(RecordingOutput {
            session_id,
            composited: composited_path,
            raw: raw_path,
        }))
    }

    /// Persist the raw recording. Failures are logged and reported but
    /// never propagated — the composited recording is the primary result.
    fn persist_raw(&self, session_id: &str, path: &Path) {
        let Some(store) = &self.store else {
            let _ = self.events_tx.send(SessionEvent::RawRecordingSaved {
                session_id: session_id.to_string(),
                path: path.to_path_buf(),
            });
            return;
        };

        let metadata = RawRecordingMetadata {
            session_id: session_id.to_string(),
            source_mode: self.config.source_mode,
            layout_mode: self.config.layout_mode,
            orientation: self.config.orientation,
            webcam_position: self.config.webcam_position,
            crop_region: compute_crop_region(
                self.config.source_mode,
                self.config.layout_mode,
                self.config.webcam_position,
                self.config.orientation,
            ),
            recorded_at: chrono::Utc::now().to_rfc3339(),
        };

        match store.save(&metadata, path) {
            Ok(()) => {
                let stored_path = store
                    .get(session_id)
                    .ok()
                    .flatten()
                    .map(|s| s.path)
                    .unwrap_or_else(|| path.to_path_buf());
                let _ = self.events_tx.send(SessionEvent::RawRecordingSaved {
                    session_id: session_id.to_string(),
                    path: stored_path,
                });
            }
            Err(e) => {
                tracing::warn!(session_id = %session_id, error = %e, "Failed to persist raw recording");
                let _ = self.events_tx.send(SessionEvent::StorageFailed {
                    session_id: session_id.to_string(),
                    message: e.to_string(),
                });
            }
        }
    }
}

/// Supplies one immutable [`Scene`] snapshot per display tick.
pub trait SceneProvider: Send {
    /// `None` ends the capture loop.
    fn next_scene(&mut self) -> Option<Scene>;
}

/// Drive the preview/capture loop until stopped.
///
/// Ticks at display rate, reads a fresh scene snapshot each tick, renders
/// it, and offers the result to the session (which gates encoding down to
/// the target frame rate). Raw webcam frames bypass the compositor.
pub async fn run_capture_loop(
    session: &mut RecordingSession,
    compositor: &mut CanvasCompositor,
    provider: &mut dyn SceneProvider,
    stop: Arc<AtomicBool>,
) -> ScenecastResult<()> {
    let period = Duration::from_secs_f64(1.0 / session.options.display_hz.max(1) as f64);
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    while !stop.load(Ordering::SeqCst) && session.state() == SessionState::Recording {
        interval.tick().await;

        let Some(mut scene) = provider.next_scene() else {
            break;
        };
        scene.recording = Some(RecordingStatus {
            elapsed_ms: session.elapsed_ms(),
        });

        let frame = compositor.render(&scene);
        session.push_frame(frame)?;

        if let Some(webcam) = &scene.webcam {
            if webcam.is_ready() {
                session.push_raw_frame(webcam.image());
            }
        }
    }

    Ok(())
}

/// Bound a user-gated device acquisition that may never resolve.
pub async fn with_acquisition_timeout<T>(
    what: &str,
    timeout: Duration,
    fut: impl Future<Output = ScenecastResult<T>>,
) -> ScenecastResult<T> {
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(ScenecastError::acquisition(format!(
            "{what} acquisition did not resolve within {}s",
            timeout.as_secs()
        ))),
    }
}
