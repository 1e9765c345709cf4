//! Scenecast Frame Processor
//!
//! Re-decodes a finished recording frame-by-frame to trim it, capture a
//! still, extract a cropped sub-clip, or apply redaction effects and
//! re-bake a watermark. All four jobs share one skeleton:
//!
//! ```text
//! recording ──► ClipSource (decode) ──► per-frame transform ──► ClipSink (encode)
//!                      │                                             │
//!                      └──────────── progress = elapsed/total ◄──────┘
//! ```
//!
//! The decode/encode seam is a pair of traits so jobs are testable with
//! synthetic sources; production uses the GStreamer implementations.

pub mod clip;
pub mod jobs;
pub mod transform;

pub use clip::{ClipInfo, ClipSink, ClipSource, DecodedFrame, GstClipSink, GstClipSource};
pub use jobs::{
    capture_still, cropped_target_size, extract_cropped_clip, redact_clip, trim_clip,
    HeadRemoval, JobContext, ProgressFn, StillFormat,
};
pub use transform::{apply_crop_band, apply_mosaic, PixelRegion};
