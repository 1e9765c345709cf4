//! Scenecast Recorder
//!
//! Coordinates one recording session: the composited canvas stream and,
//! when a webcam is attached, a parallel raw webcam stream, encoded to
//! two independent output files.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────┐
//! │               RecordingSession                  │
//! │  ┌────────────┐  ┌──────────┐  ┌────────────┐  │
//! │  │ Composited │  │ MixGraph │  │    Raw     │  │
//! │  │  Encoder   │◄─┤ (audio)  │  │  Encoder   │  │
//! │  └─────┬──────┘  └──────────┘  └─────┬──────┘  │
//! │        │                             │          │
//! │        ▼                             ▼          │
//! │  session.webm                  raw recording ──►│── keyed store
//! └────────────────────────────────────────────────┘
//! ```
//!
//! The two encoders are started together but finalize independently; no
//! completion ordering is assumed between them.

pub mod encoder;
pub mod mixer;
pub mod session;
pub mod store;

pub use encoder::{
    select_codec, CodecCandidate, EncoderEvent, EncoderSettings, GstEncoderFactory,
    RecordingSink, CODEC_PREFERENCES,
};
pub use mixer::{AudioBlockSource, AudioChannel, MixGraph};
pub use session::{
    EncoderFactory, EncoderRole, RecordingOutput, RecordingSession, SessionEvent, SessionOptions,
    SessionState,
};
pub use store::{DirRawRecordingStore, RawRecordingMetadata, RawRecordingStore, StoredRawRecording};
