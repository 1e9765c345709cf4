//! Scenecast Composition Model
//!
//! Defines the core data contracts for live compositions:
//! - **Config:** Source/layout/orientation selection, watermark spec,
//!   and audio channel descriptions
//! - **Geometry:** Pixel and percentage rectangle value types
//! - **Layout:** Pure resolvers mapping a composition config and source
//!   aspect ratios to draw rectangles
//! - **Crop:** The crop-region resolver shared by the live recorder and
//!   the offline extractor
//!
//! This crate is pure computation — no I/O, no platform dependencies.
//! All inputs are data; all outputs are data.

pub mod config;
pub mod crop;
pub mod geometry;
pub mod layout;

pub use config::*;
pub use crop::*;
pub use geometry::*;
pub use layout::*;
