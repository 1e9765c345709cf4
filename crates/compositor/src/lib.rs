//! Scenecast Compositor
//!
//! Assembles the live preview/recording canvas once per frame:
//!
//! ```text
//! content source ──┐
//!                  ├── Layout Resolver ──► pane blits
//! webcam source ───┘          │
//! (or face filter)            ├── seam divider
//!                             ├── REC indicator
//!                             ├── watermark pill
//!                             ▼
//!                      composited Frame ──► preview / encoder
//! ```
//!
//! The compositor never owns its sources; it consumes per-tick
//! [`Scene`] snapshots and skips any source that is not ready yet.

pub mod draw;
pub mod frame;
pub mod overlay;
pub mod scene;
pub mod source;

pub use draw::CanvasCompositor;
pub use frame::Frame;
pub use overlay::{OverlayFont, WatermarkRenderer};
pub use scene::{RecordingStatus, Scene};
pub use source::SourceFrame;
