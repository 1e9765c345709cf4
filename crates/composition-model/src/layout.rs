//! Layout geometry resolver.
//!
//! Pure functions mapping (layout, orientation, positions, source aspect
//! ratios) to draw rectangles. All letterboxing uses standard fit-within
//! math: `scale = min(boxW / srcW, boxH / srcH)`, centered.

use serde::{Deserialize, Serialize};

use crate::config::{LayoutMode, Orientation, SourceMode, WebcamPosition};
use crate::geometry::{CanvasSize, PercentRect, Rect};

/// Split range for side-by-side and stacked layouts, percent.
pub const SPLIT_MIN: f64 = 20.0;
pub const SPLIT_MAX: f64 = 80.0;

/// A full-height webcam strip may take at most this fraction of the width.
pub const STRIP_MAX_WIDTH_FRACTION: f64 = 0.4;

/// Default PiP width as a fraction of the canvas's dominant axis.
pub const PIP_DEFAULT_FRACTION: f64 = 0.25;

/// At least this fraction of a PiP rect's own size must stay on-canvas.
pub const PIP_MIN_VISIBLE_FRACTION: f64 = 0.25;

/// Margin between a default PiP rect and its anchor corner, percent.
pub const PIP_MARGIN_PCT: f64 = 4.0;

/// Minimum PiP width while resizing, percent of canvas width.
pub const PIP_MIN_WIDTH_PCT: f64 = 5.0;

/// Seam line thickness between two panes, pixels.
pub const DIVIDER_THICKNESS: f64 = 2.0;

/// Resolved pane arrangement for one frame.
#[derive(Debug, Clone, PartialEq)]
pub enum PaneLayout {
    /// Content only (no webcam available).
    ContentOnly { content: Rect },
    /// Webcam and content in separate panes with a seam between them.
    Dual {
        webcam: Rect,
        content: Rect,
        divider: Rect,
    },
    /// Content under a floating webcam rectangle.
    Pip { content: Rect, webcam: Rect },
    /// Webcam letterboxed over the whole canvas.
    WebcamOnly { webcam: Rect },
}

/// Aspect-fit a source into a bounding box: the largest centered
/// rectangle with the source's aspect ratio that fits the box.
pub fn fit_within(src_aspect: f64, bounds: Rect) -> Rect {
    if src_aspect <= 0.0 || bounds.w <= 0.0 || bounds.h <= 0.0 {
        return bounds;
    }

    let box_aspect = bounds.w / bounds.h;
    let (w, h) = if src_aspect > box_aspect {
        (bounds.w, bounds.w / src_aspect)
    } else {
        (bounds.h * src_aspect, bounds.h)
    };

    Rect {
        x: bounds.x + (bounds.w - w) / 2.0,
        y: bounds.y + (bounds.h - h) / 2.0,
        w,
        h,
    }
}

/// Aspect-fit when the source aspect is known, else fill the box.
fn fit_or_fill(src_aspect: Option<f64>, bounds: Rect) -> Rect {
    match src_aspect {
        Some(aspect) => fit_within(aspect, bounds),
        None => bounds,
    }
}

fn clamp_split(split_pct: f64) -> f64 {
    split_pct.clamp(SPLIT_MIN, SPLIT_MAX)
}

/// Two panes split by a vertical seam at `split_pct` of canvas width.
pub fn side_by_side(
    canvas: CanvasSize,
    split_pct: f64,
    webcam_leading: bool,
    webcam_aspect: Option<f64>,
    content_aspect: Option<f64>,
) -> PaneLayout {
    let canvas_w = canvas.width as f64;
    let canvas_h = canvas.height as f64;
    let split_x = canvas_w * clamp_split(split_pct) / 100.0;

    let leading = Rect::new(0.0, 0.0, split_x, canvas_h);
    let trailing = Rect::new(split_x, 0.0, canvas_w - split_x, canvas_h);
    let (webcam_box, content_box) = if webcam_leading {
        (leading, trailing)
    } else {
        (trailing, leading)
    };

    PaneLayout::Dual {
        webcam: fit_or_fill(webcam_aspect, webcam_box),
        content: fit_or_fill(content_aspect, content_box),
        divider: Rect::new(
            split_x - DIVIDER_THICKNESS / 2.0,
            0.0,
            DIVIDER_THICKNESS,
            canvas_h,
        ),
    }
}

/// Two panes split by a horizontal seam at `split_pct` of canvas height.
pub fn stacked(
    canvas: CanvasSize,
    split_pct: f64,
    webcam_leading: bool,
    webcam_aspect: Option<f64>,
    content_aspect: Option<f64>,
) -> PaneLayout {
    let canvas_w = canvas.width as f64;
    let canvas_h = canvas.height as f64;
    let split_y = canvas_h * clamp_split(split_pct) / 100.0;

    let leading = Rect::new(0.0, 0.0, canvas_w, split_y);
    let trailing = Rect::new(0.0, split_y, canvas_w, canvas_h - split_y);
    let (webcam_box, content_box) = if webcam_leading {
        (leading, trailing)
    } else {
        (trailing, leading)
    };

    PaneLayout::Dual {
        webcam: fit_or_fill(webcam_aspect, webcam_box),
        content: fit_or_fill(content_aspect, content_box),
        divider: Rect::new(
            0.0,
            split_y - DIVIDER_THICKNESS / 2.0,
            canvas_w,
            DIVIDER_THICKNESS,
        ),
    }
}

/// Webcam as a full-height column beside the content.
///
/// The strip is as wide as the webcam's aspect allows at full canvas
/// height, clamped to [`STRIP_MAX_WIDTH_FRACTION`] of the canvas width;
/// the content aspect-fits the remaining width.
pub fn full_height_strip(
    canvas: CanvasSize,
    on_left: bool,
    webcam_aspect: Option<f64>,
    content_aspect: Option<f64>,
) -> PaneLayout {
    let canvas_w = canvas.width as f64;
    let canvas_h = canvas.height as f64;
    let natural_w = canvas_h * webcam_aspect.unwrap_or(1.0);
    let strip_w = natural_w.min(canvas_w * STRIP_MAX_WIDTH_FRACTION);

    let (strip_box, content_box) = if on_left {
        (
            Rect::new(0.0, 0.0, strip_w, canvas_h),
            Rect::new(strip_w, 0.0, canvas_w - strip_w, canvas_h),
        )
    } else {
        (
            Rect::new(canvas_w - strip_w, 0.0, strip_w, canvas_h),
            Rect::new(0.0, 0.0, canvas_w - strip_w, canvas_h),
        )
    };

    let divider_x = if on_left {
        strip_w - DIVIDER_THICKNESS / 2.0
    } else {
        canvas_w - strip_w - DIVIDER_THICKNESS / 2.0
    };

    PaneLayout::Dual {
        webcam: fit_or_fill(webcam_aspect, strip_box),
        content: fit_or_fill(content_aspect, content_box),
        divider: Rect::new(divider_x, 0.0, DIVIDER_THICKNESS, canvas_h),
    }
}

/// The default corner-anchored PiP rectangle in percentage space.
///
/// Width is [`PIP_DEFAULT_FRACTION`] of the canvas's dominant axis;
/// height is derived as `width * canvas_aspect / webcam_aspect`, which
/// preserves the webcam aspect in the non-square percentage space.
pub fn default_pip_rect(
    position: WebcamPosition,
    orientation: Orientation,
    webcam_aspect: f64,
) -> PercentRect {
    let canvas = orientation.canvas_size();
    let dominant = canvas.width.max(canvas.height) as f64;
    let w = PIP_DEFAULT_FRACTION * dominant / canvas.width as f64 * 100.0;
    let h = pip_height_for_width(w, orientation.canvas_aspect(), webcam_aspect);

    let x = match position {
        WebcamPosition::TopLeft | WebcamPosition::BottomLeft => PIP_MARGIN_PCT,
        _ => 100.0 - PIP_MARGIN_PCT - w,
    };
    let y = match position {
        WebcamPosition::TopLeft | WebcamPosition::TopRight => PIP_MARGIN_PCT,
        _ => 100.0 - PIP_MARGIN_PCT - h,
    };

    PercentRect::new(x, y, w, h)
}

/// Percent-space height preserving the webcam aspect for a given width.
pub fn pip_height_for_width(width_pct: f64, canvas_aspect: f64, webcam_aspect: f64) -> f64 {
    if webcam_aspect <= 0.0 {
        return width_pct;
    }
    width_pct * canvas_aspect / webcam_aspect
}

/// Percent-space width preserving the webcam aspect for a given height.
pub fn pip_width_for_height(height_pct: f64, canvas_aspect: f64, webcam_aspect: f64) -> f64 {
    if canvas_aspect <= 0.0 {
        return height_pct;
    }
    height_pct * webcam_aspect / canvas_aspect
}

/// A drag handle on the PiP rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResizeHandle {
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl ResizeHandle {
    fn is_north(self) -> bool {
        matches!(
            self,
            ResizeHandle::North | ResizeHandle::NorthEast | ResizeHandle::NorthWest
        )
    }

    fn is_west(self) -> bool {
        matches!(
            self,
            ResizeHandle::West | ResizeHandle::NorthWest | ResizeHandle::SouthWest
        )
    }
}

/// Resize the PiP rectangle by a pointer delta in percentage space.
///
/// Edge handles adjust one axis and derive the other from the webcam
/// aspect; corner handles adjust width first and derive height. Handles
/// on the north or west side re-anchor the origin so the opposite edge
/// stays fixed under the resize.
pub fn resize_pip_rect(
    rect: PercentRect,
    handle: ResizeHandle,
    dx_pct: f64,
    dy_pct: f64,
    orientation: Orientation,
    webcam_aspect: f64,
) -> PercentRect {
    let canvas_aspect = orientation.canvas_aspect();

    let new_w = match handle {
        ResizeHandle::North => {
            let h = (rect.h - dy_pct).max(1.0);
            pip_width_for_height(h, canvas_aspect, webcam_aspect)
        }
        ResizeHandle::South => {
            let h = (rect.h + dy_pct).max(1.0);
            pip_width_for_height(h, canvas_aspect, webcam_aspect)
        }
        ResizeHandle::East | ResizeHandle::NorthEast | ResizeHandle::SouthEast => rect.w + dx_pct,
        ResizeHandle::West | ResizeHandle::NorthWest | ResizeHandle::SouthWest => rect.w - dx_pct,
    };

    let new_w = new_w.max(PIP_MIN_WIDTH_PCT);
    let new_h = pip_height_for_width(new_w, canvas_aspect, webcam_aspect);

    let x = if handle.is_west() {
        rect.x + rect.w - new_w
    } else {
        rect.x
    };
    let y = if handle.is_north() {
        rect.y + rect.h - new_h
    } else {
        rect.y
    };

    clamp_pip_bounds(PercentRect::new(x, y, new_w, new_h))
}

/// Keep at least [`PIP_MIN_VISIBLE_FRACTION`] of the rectangle's own
/// width and height within [0, 100] on every side.
pub fn clamp_pip_bounds(rect: PercentRect) -> PercentRect {
    let max_off_x = rect.w * (1.0 - PIP_MIN_VISIBLE_FRACTION);
    let max_off_y = rect.h * (1.0 - PIP_MIN_VISIBLE_FRACTION);

    PercentRect {
        x: rect.x.clamp(-max_off_x, 100.0 - rect.w + max_off_x),
        y: rect.y.clamp(-max_off_y, 100.0 - rect.h + max_off_y),
        w: rect.w,
        h: rect.h,
    }
}

/// Resolve the full pane arrangement for one frame.
///
/// `webcam_aspect`/`content_aspect` are `None` when the respective source
/// is absent or not yet ready; the resolver then falls back to filling
/// the pane box (the compositor skips drawing unready sources anyway).
#[allow(clippy::too_many_arguments)]
pub fn resolve_layout(
    source_mode: SourceMode,
    layout_mode: LayoutMode,
    orientation: Orientation,
    position: WebcamPosition,
    side_by_side_split: f64,
    stacked_split: f64,
    custom_pip_rect: Option<PercentRect>,
    webcam_aspect: Option<f64>,
    content_aspect: Option<f64>,
) -> PaneLayout {
    let canvas = orientation.canvas_size();
    let full = Rect::new(0.0, 0.0, canvas.width as f64, canvas.height as f64);

    if source_mode == SourceMode::WebcamOnly {
        return PaneLayout::WebcamOnly {
            webcam: fit_or_fill(webcam_aspect, full),
        };
    }

    if webcam_aspect.is_none() && layout_mode != LayoutMode::Pip {
        return PaneLayout::ContentOnly {
            content: fit_or_fill(content_aspect, full),
        };
    }

    match layout_mode {
        LayoutMode::Pip => {
            let pip = custom_pip_rect.unwrap_or_else(|| {
                default_pip_rect(position, orientation, webcam_aspect.unwrap_or(16.0 / 9.0))
            });
            PaneLayout::Pip {
                content: fit_or_fill(content_aspect, full),
                webcam: pip.to_pixels(canvas),
            }
        }
        _ if position.is_center_strip() => full_height_strip(
            canvas,
            position.is_leading(),
            webcam_aspect,
            content_aspect,
        ),
        LayoutMode::SideBySide => side_by_side(
            canvas,
            side_by_side_split,
            position.is_leading(),
            webcam_aspect,
            content_aspect,
        ),
        LayoutMode::Stacked => stacked(
            canvas,
            stacked_split,
            position.is_leading(),
            webcam_aspect,
            content_aspect,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const WEBCAM_16_9: f64 = 16.0 / 9.0;

    #[test]
    fn fit_within_letterboxes_wide_source() {
        let bounds = Rect::new(0.0, 0.0, 960.0, 1080.0);
        let fitted = fit_within(WEBCAM_16_9, bounds);
        assert_eq!(fitted.w, 960.0);
        assert_eq!(fitted.h, 540.0);
        assert_eq!(fitted.x, 0.0);
        assert_eq!(fitted.y, 270.0);
    }

    #[test]
    fn fit_within_pillarboxes_tall_source() {
        let bounds = Rect::new(0.0, 0.0, 1920.0, 1080.0);
        let fitted = fit_within(9.0 / 16.0, bounds);
        assert!((fitted.h - 1080.0).abs() < 1e-9);
        assert!((fitted.w - 607.5).abs() < 1e-9);
        assert!((fitted.x - (1920.0 - 607.5) / 2.0).abs() < 1e-9);
    }

    #[test]
    fn side_by_side_even_split_matches_reference_scenario() {
        // landscape 1920x1080, split 50, webcam left, both sources 16:9
        let layout = side_by_side(
            CanvasSize::new(1920, 1080),
            50.0,
            true,
            Some(WEBCAM_16_9),
            Some(WEBCAM_16_9),
        );
        let PaneLayout::Dual {
            webcam, content, ..
        } = layout
        else {
            panic!("expected dual pane layout");
        };
        assert_eq!(webcam.w, 960.0);
        assert_eq!(webcam.x, 0.0);
        assert_eq!(content.x, 960.0);
    }

    #[test]
    fn split_is_clamped_to_valid_range() {
        let layout = side_by_side(CanvasSize::new(1920, 1080), 5.0, true, None, None);
        let PaneLayout::Dual { webcam, .. } = layout else {
            panic!("expected dual pane layout");
        };
        assert_eq!(webcam.w, 1920.0 * SPLIT_MIN / 100.0);
    }

    #[test]
    fn stacked_splits_by_height() {
        let layout = stacked(CanvasSize::new(1920, 1080), 60.0, false, None, None);
        let PaneLayout::Dual {
            webcam, content, ..
        } = layout
        else {
            panic!("expected dual pane layout");
        };
        assert_eq!(content.h, 648.0);
        assert_eq!(webcam.y, 648.0);
        assert_eq!(webcam.h, 432.0);
    }

    #[test]
    fn strip_width_is_clamped_to_forty_percent() {
        // A very wide webcam would want 1080 * 16/9 = 1920px of strip.
        let layout = full_height_strip(
            CanvasSize::new(1920, 1080),
            true,
            Some(WEBCAM_16_9),
            Some(WEBCAM_16_9),
        );
        let PaneLayout::Dual {
            webcam, content, ..
        } = layout
        else {
            panic!("expected dual pane layout");
        };
        assert!(webcam.w <= 1920.0 * STRIP_MAX_WIDTH_FRACTION + 1e-9);
        assert!(content.x >= 768.0 - 1e-9);
    }

    #[test]
    fn narrow_webcam_strip_uses_natural_width() {
        // 9:16 webcam at 1080p canvas height wants 607.5px < 40% cap.
        let layout = full_height_strip(
            CanvasSize::new(1920, 1080),
            false,
            Some(9.0 / 16.0),
            Some(WEBCAM_16_9),
        );
        let PaneLayout::Dual { webcam, .. } = layout else {
            panic!("expected dual pane layout");
        };
        assert!((webcam.w - 607.5).abs() < 1e-9);
        assert!((webcam.right() - 1920.0).abs() < 1e-9);
    }

    #[test]
    fn default_pip_preserves_webcam_aspect_in_pixels() {
        for orientation in [Orientation::Landscape, Orientation::Portrait] {
            let rect = default_pip_rect(WebcamPosition::BottomRight, orientation, WEBCAM_16_9);
            let px = rect.to_pixels(orientation.canvas_size());
            assert!(
                (px.w / px.h - WEBCAM_16_9).abs() < 1e-6,
                "pixel aspect {} in {orientation:?}",
                px.w / px.h
            );
            // 25% of the dominant axis in both orientations
            assert!((px.w - 480.0).abs() < 1e-6);
        }
    }

    #[test]
    fn default_pip_anchors_to_each_corner() {
        let orientation = Orientation::Landscape;
        let tl = default_pip_rect(WebcamPosition::TopLeft, orientation, WEBCAM_16_9);
        let br = default_pip_rect(WebcamPosition::BottomRight, orientation, WEBCAM_16_9);
        assert_eq!(tl.x, PIP_MARGIN_PCT);
        assert_eq!(tl.y, PIP_MARGIN_PCT);
        assert!((br.x + br.w - (100.0 - PIP_MARGIN_PCT)).abs() < 1e-9);
        assert!((br.y + br.h - (100.0 - PIP_MARGIN_PCT)).abs() < 1e-9);
    }

    #[test]
    fn east_resize_derives_height() {
        let rect = PercentRect::new(10.0, 10.0, 25.0, 25.0);
        let resized = resize_pip_rect(
            rect,
            ResizeHandle::East,
            10.0,
            0.0,
            Orientation::Landscape,
            WEBCAM_16_9,
        );
        assert!((resized.w - 35.0).abs() < 1e-9);
        let expected_h = pip_height_for_width(35.0, Orientation::Landscape.canvas_aspect(), WEBCAM_16_9);
        assert!((resized.h - expected_h).abs() < 1e-9);
        assert_eq!(resized.x, 10.0);
        assert_eq!(resized.y, 10.0);
    }

    #[test]
    fn north_resize_keeps_south_edge_fixed() {
        let rect = PercentRect::new(10.0, 40.0, 25.0, 25.0);
        let resized = resize_pip_rect(
            rect,
            ResizeHandle::North,
            0.0,
            -10.0,
            Orientation::Landscape,
            WEBCAM_16_9,
        );
        assert!((resized.h - 35.0).abs() < 1e-9);
        assert!((resized.y + resized.h - 65.0).abs() < 1e-9);
    }

    #[test]
    fn west_corner_resize_keeps_east_edge_fixed() {
        let rect = PercentRect::new(30.0, 30.0, 25.0, 25.0);
        let resized = resize_pip_rect(
            rect,
            ResizeHandle::SouthWest,
            -5.0,
            0.0,
            Orientation::Landscape,
            WEBCAM_16_9,
        );
        assert!((resized.w - 30.0).abs() < 1e-9);
        assert!((resized.x + resized.w - 55.0).abs() < 1e-9);
        assert_eq!(resized.y, 30.0);
    }

    #[test]
    fn pip_bounds_allow_partial_offscreen() {
        let rect = PercentRect::new(-100.0, -100.0, 40.0, 30.0);
        let clamped = clamp_pip_bounds(rect);
        assert!((clamped.x - (-30.0)).abs() < 1e-9); // 75% of 40 off-canvas
        assert!((clamped.y - (-22.5)).abs() < 1e-9); // 75% of 30 off-canvas
    }

    #[test]
    fn webcam_only_letterboxes_whole_canvas() {
        let layout = resolve_layout(
            SourceMode::WebcamOnly,
            LayoutMode::SideBySide,
            Orientation::Portrait,
            WebcamPosition::Left,
            50.0,
            50.0,
            None,
            Some(WEBCAM_16_9),
            None,
        );
        let PaneLayout::WebcamOnly { webcam } = layout else {
            panic!("expected webcam-only layout");
        };
        assert_eq!(webcam.w, 1080.0);
        assert!((webcam.h - 1080.0 / WEBCAM_16_9).abs() < 1e-6);
    }

    #[test]
    fn missing_webcam_falls_back_to_content_only() {
        let layout = resolve_layout(
            SourceMode::Screen,
            LayoutMode::SideBySide,
            Orientation::Landscape,
            WebcamPosition::Left,
            50.0,
            50.0,
            None,
            None,
            Some(WEBCAM_16_9),
        );
        assert!(matches!(layout, PaneLayout::ContentOnly { .. }));
    }

    #[test]
    fn center_strip_position_overrides_split_layout() {
        let layout = resolve_layout(
            SourceMode::Screen,
            LayoutMode::SideBySide,
            Orientation::Landscape,
            WebcamPosition::RightCenter,
            50.0,
            50.0,
            None,
            Some(9.0 / 16.0),
            Some(WEBCAM_16_9),
        );
        let PaneLayout::Dual { webcam, .. } = layout else {
            panic!("expected dual pane layout");
        };
        assert!((webcam.right() - 1920.0).abs() < 1e-9);
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

    fn any_layout() -> impl Strategy<Value = LayoutMode> {
        prop_oneof![
            Just(LayoutMode::SideBySide),
            Just(LayoutMode::Stacked),
            Just(LayoutMode::Pip),
        ]
    }

    fn any_orientation() -> impl Strategy<Value = Orientation> {
        prop_oneof![Just(Orientation::Landscape), Just(Orientation::Portrait)]
    }

    proptest! {
        #[test]
        fn non_pip_rects_stay_within_canvas(
            layout_mode in any_layout(),
            orientation in any_orientation(),
            position in any_position(),
            split in 0.0f64..100.0,
            webcam_aspect in 0.3f64..3.0,
            content_aspect in 0.3f64..3.0,
        ) {
            let canvas = orientation.canvas_size();
            let resolved = resolve_layout(
                SourceMode::Screen,
                layout_mode,
                orientation,
                position,
                split,
                split,
                None,
                Some(webcam_aspect),
                Some(content_aspect),
            );

            match resolved {
                PaneLayout::Dual { webcam, content, .. } => {
                    prop_assert!(webcam.within(canvas));
                    prop_assert!(content.within(canvas));
                }
                PaneLayout::ContentOnly { content } => prop_assert!(content.within(canvas)),
                PaneLayout::WebcamOnly { webcam } => prop_assert!(webcam.within(canvas)),
                PaneLayout::Pip { content, .. } => prop_assert!(content.within(canvas)),
            }
        }

        #[test]
        fn clamped_pip_keeps_quarter_visible(
            x in -500.0f64..500.0,
            y in -500.0f64..500.0,
            w in 5.0f64..60.0,
            h in 5.0f64..60.0,
        ) {
            let clamped = clamp_pip_bounds(PercentRect::new(x, y, w, h));
            let visible_w = (clamped.x + clamped.w).min(100.0) - clamped.x.max(0.0);
            let visible_h = (clamped.y + clamped.h).min(100.0) - clamped.y.max(0.0);
            prop_assert!(visible_w >= w * PIP_MIN_VISIBLE_FRACTION - 1e-9);
            prop_assert!(visible_h >= h * PIP_MIN_VISIBLE_FRACTION - 1e-9);
        }

        #[test]
        fn resize_preserves_webcam_aspect(
            dx in -20.0f64..20.0,
            dy in -20.0f64..20.0,
            webcam_aspect in 0.5f64..2.5,
        ) {
            let orientation = Orientation::Landscape;
            let start = default_pip_rect(WebcamPosition::TopLeft, orientation, webcam_aspect);
            for handle in [
                ResizeHandle::North, ResizeHandle::South, ResizeHandle::East, ResizeHandle::West,
                ResizeHandle::NorthEast, ResizeHandle::NorthWest,
                ResizeHandle::SouthEast, ResizeHandle::SouthWest,
            ] {
                let resized = resize_pip_rect(start, handle, dx, dy, orientation, webcam_aspect);
                let px = resized.to_pixels(orientation.canvas_size());
                prop_assert!((px.w / px.h - webcam_aspect).abs() < 1e-6);
            }
        }
    }
}
