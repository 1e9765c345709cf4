//! Crop region resolver.
//!
//! Maps a composition to the pixel rectangle on the composited canvas
//! known to contain only the webcam feed. Both the live recorder (which
//! stamps the region into raw-recording metadata) and the offline
//! extractor resolve regions through this one function, so the two always
//! agree bit-for-bit.
//!
//! Split layouts are resolved as exact 50/50 halves regardless of the
//! live split ratio; see DESIGN.md for the rationale.

use serde::{Deserialize, Serialize};

use crate::config::{LayoutMode, Orientation, SourceMode, WebcamPosition};
use crate::geometry::CanvasSize;

/// Fraction of canvas width a center-strip crop occupies.
const STRIP_CROP_FRACTION: f64 = 0.4;

/// A pixel rectangle on the composited canvas.
///
/// Only this module constructs crop regions; everything downstream
/// treats them as opaque values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRegion {
    /// Width / height.
    pub fn aspect(&self) -> f64 {
        self.width.max(1) as f64 / self.height.max(1) as f64
    }
}

/// Resolve the webcam crop region for a composition.
///
/// Deterministic in its inputs; returns `None` when no usable webcam
/// region exists on the canvas (picture-in-picture overlays are too small
/// for downstream use).
pub fn compute_crop_region(
    source_mode: SourceMode,
    layout_mode: LayoutMode,
    position: WebcamPosition,
    orientation: Orientation,
) -> Option<CropRegion> {
    let CanvasSize { width, height } = orientation.canvas_size();

    if source_mode == SourceMode::WebcamOnly {
        return Some(CropRegion {
            x: 0,
            y: 0,
            width,
            height,
        });
    }

    if layout_mode == LayoutMode::Pip {
        return None;
    }

    if position.is_center_strip() {
        let strip_w = (width as f64 * STRIP_CROP_FRACTION) as u32;
        let x = if position.is_leading() { 0 } else { width - strip_w };
        return Some(CropRegion {
            x,
            y: 0,
            width: strip_w,
            height,
        });
    }

    match layout_mode {
        LayoutMode::SideBySide => {
            let half = width / 2;
            let x = if position.is_leading() { 0 } else { half };
            Some(CropRegion {
                x,
                y: 0,
                width: half,
                height,
            })
        }
        LayoutMode::Stacked => {
            let half = height / 2;
            let y = if position.is_leading() { 0 } else { half };
            Some(CropRegion {
                x: 0,
                y,
                width,
                height: half,
            })
        }
        LayoutMode::Pip => unreachable!("handled above"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn webcam_only_is_full_frame() {
        let region = compute_crop_region(
            SourceMode::WebcamOnly,
            LayoutMode::Pip,
            WebcamPosition::BottomRight,
            Orientation::Landscape,
        )
        .unwrap();
        assert_eq!(
            region,
            CropRegion {
                x: 0,
                y: 0,
                width: 1920,
                height: 1080
            }
        );
    }

    #[test]
    fn pip_has_no_usable_region() {
        for source in [
            SourceMode::Screen,
            SourceMode::LibraryVideo,
            SourceMode::CustomUpload,
        ] {
            for position in [
                WebcamPosition::Left,
                WebcamPosition::RightCenter,
                WebcamPosition::TopLeft,
            ] {
                for orientation in [Orientation::Landscape, Orientation::Portrait] {
                    assert_eq!(
                        compute_crop_region(source, LayoutMode::Pip, position, orientation),
                        None
                    );
                }
            }
        }
    }

    #[test]
    fn center_strip_is_forty_percent_of_width() {
        let left = compute_crop_region(
            SourceMode::Screen,
            LayoutMode::SideBySide,
            WebcamPosition::LeftCenter,
            Orientation::Landscape,
        )
        .unwrap();
        assert_eq!((left.x, left.width, left.height), (0, 768, 1080));

        let right = compute_crop_region(
            SourceMode::Screen,
            LayoutMode::SideBySide,
            WebcamPosition::RightCenter,
            Orientation::Landscape,
        )
        .unwrap();
        assert_eq!((right.x, right.width), (1152, 768));
    }

    #[test]
    fn side_by_side_splits_width_in_half() {
        let left = compute_crop_region(
            SourceMode::Screen,
            LayoutMode::SideBySide,
            WebcamPosition::Left,
            Orientation::Landscape,
        )
        .unwrap();
        assert_eq!((left.x, left.width, left.height), (0, 960, 1080));

        let right = compute_crop_region(
            SourceMode::LibraryVideo,
            LayoutMode::SideBySide,
            WebcamPosition::Right,
            Orientation::Landscape,
        )
        .unwrap();
        assert_eq!((right.x, right.width), (960, 960));
    }

    #[test]
    fn stacked_splits_height_in_half() {
        let top = compute_crop_region(
            SourceMode::Screen,
            LayoutMode::Stacked,
            WebcamPosition::Left,
            Orientation::Portrait,
        )
        .unwrap();
        assert_eq!((top.y, top.width, top.height), (0, 1080, 960));

        let bottom = compute_crop_region(
            SourceMode::Screen,
            LayoutMode::Stacked,
            WebcamPosition::Right,
            Orientation::Portrait,
        )
        .unwrap();
        assert_eq!((bottom.y, bottom.height), (960, 960));
    }

    fn any_source() -> impl Strategy<Value = SourceMode> {
        prop_oneof![
            Just(SourceMode::Screen),
            Just(SourceMode::LibraryVideo),
            Just(SourceMode::CustomUpload),
            Just(SourceMode::WebcamOnly),
        ]
    }

    fn any_layout() -> impl Strategy<Value = LayoutMode> {
        prop_oneof![
            Just(LayoutMode::SideBySide),
            Just(LayoutMode::Stacked),
            Just(LayoutMode::Pip),
        ]
    }

    fn any_position() -> impl Strategy<Value = WebcamPosition> {
        prop_oneof![
            Just(WebcamPosition::Left),
            Just(WebcamPosition::Right),
            Just(WebcamPosition::LeftCenter),
            Just(WebcamPosition::RightCenter),
            Just(WebcamPosition::TopLeft),
            Just(WebcamPosition::TopRight),
            Just(WebcamPosition::BottomLeft),
            Just(WebcamPosition::BottomRight),
        ]
    }

    fn any_orientation() -> impl Strategy<Value = Orientation> {
        prop_oneof![Just(Orientation::Landscape), Just(Orientation::Portrait)]
    }

    proptest! {
        #[test]
        fn resolver_is_deterministic_and_in_bounds(
            source in any_source(),
            layout in any_layout(),
            position in any_position(),
            orientation in any_orientation(),
        ) {
            let first = compute_crop_region(source, layout, position, orientation);
            let second = compute_crop_region(source, layout, position, orientation);
            prop_assert_eq!(first, second);

            if let Some(region) = first {
                let canvas = orientation.canvas_size();
                prop_assert!(region.x + region.width <= canvas.width);
                prop_assert!(region.y + region.height <= canvas.height);
                prop_assert!(region.width > 0 && region.height > 0);
            }
        }
    }
}
