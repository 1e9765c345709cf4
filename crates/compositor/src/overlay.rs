//! On-canvas overlays: the REC indicator and the watermark pill.

use ab_glyph::{FontVec, PxScale};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_text_mut, text_size};
use scenecast_common::clock::format_elapsed;
use scenecast_common::error::{ScenecastError, ScenecastResult};
use scenecast_composition_model::{
    BackgroundStyle, CanvasSize, Rect, ShadowStyle, TextAlignment, WatermarkSpec,
};
use std::path::Path;

use crate::frame::Frame;

const REC_DOT_CENTER: (i32, i32) = (36, 36);
const REC_DOT_RADIUS: i32 = 10;
const REC_RING_RADIUS: f64 = 16.0;
const REC_RING_THICKNESS: f64 = 3.0;
const REC_COLOR: [u8; 4] = [226, 61, 61, 255];
const REC_LABEL_SIZE: f32 = 28.0;

/// A loaded TTF/OTF font for on-canvas text.
pub struct OverlayFont {
    font: FontVec,
}

impl OverlayFont {
    /// Load a font from a file path.
    pub fn load(path: &Path) -> ScenecastResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            ScenecastError::render(format!("Failed to read font {}: {e}", path.display()))
        })?;
        let font = FontVec::try_from_vec(bytes).map_err(|e| {
            ScenecastError::render(format!("Invalid font file {}: {e}", path.display()))
        })?;
        Ok(Self { font })
    }

    /// Measured pixel size of a laid-out text run.
    pub fn measure(&self, text: &str, size_px: f32) -> (f64, f64) {
        let (w, h) = text_size(PxScale::from(size_px), &self.font, text);
        (w as f64, h as f64)
    }

    /// Draw text with its top-left corner at `(x, y)`.
    pub fn draw(
        &self,
        image: &mut RgbaImage,
        x: i32,
        y: i32,
        size_px: f32,
        color: [u8; 4],
        text: &str,
    ) {
        draw_text_mut(image, Rgba(color), x, y, PxScale::from(size_px), &self.font, text);
    }
}

impl std::fmt::Debug for OverlayFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayFont").finish_non_exhaustive()
    }
}

/// Pulse alpha for the REC ring: `0.7 + 0.3 * sin(elapsed_ms / 300)`.
pub fn rec_pulse_alpha(elapsed_ms: f64) -> f64 {
    0.7 + 0.3 * (elapsed_ms / 300.0).sin()
}

/// Draw the recording indicator: filled dot, pulsing outline, elapsed label.
pub fn draw_rec_indicator(frame: &mut Frame, elapsed_ms: f64, font: Option<&OverlayFont>) {
    draw_filled_circle_mut(
        frame.as_image_mut(),
        REC_DOT_CENTER,
        REC_DOT_RADIUS,
        Rgba(REC_COLOR),
    );

    let pulse = rec_pulse_alpha(elapsed_ms);
    let ring_alpha = (REC_COLOR[3] as f64 * pulse).round().clamp(0.0, 255.0) as u8;
    stroke_circle_blend(
        frame,
        REC_DOT_CENTER,
        REC_RING_RADIUS,
        REC_RING_THICKNESS,
        [REC_COLOR[0], REC_COLOR[1], REC_COLOR[2], ring_alpha],
    );

    if let Some(font) = font {
        let label = format_elapsed(elapsed_ms / 1000.0);
        font.draw(
            frame.as_image_mut(),
            REC_DOT_CENTER.0 + 26,
            REC_DOT_CENTER.1 - (REC_LABEL_SIZE / 2.0) as i32,
            REC_LABEL_SIZE,
            [255, 255, 255, 255],
            &label,
        );
    }
}

fn stroke_circle_blend(
    frame: &mut Frame,
    center: (i32, i32),
    radius: f64,
    thickness: f64,
    color: [u8; 4],
) {
    let reach = (radius + thickness).ceil() as i32;
    for dy in -reach..=reach {
        for dx in -reach..=reach {
            let dist = ((dx * dx + dy * dy) as f64).sqrt();
            if (dist - radius).abs() <= thickness / 2.0 {
                let x = center.0 + dx;
                let y = center.1 + dy;
                if x >= 0 && y >= 0 {
                    frame.blend_pixel(x as u32, y as u32, color);
                }
            }
        }
    }
}

/// Resolved pill placement for a measured text run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PillGeometry {
    pub rect: Rect,
    pub corner_radius: f64,
    pub text_x: f64,
    pub text_y: f64,
}

/// Compute the pill rectangle for a measured text size.
///
/// The anchor is the percentage-derived pixel position; alignment decides
/// which edge of the pill the anchor pins horizontally, and the pill is
/// centered vertically on the anchor.
pub fn pill_geometry(
    text_w: f64,
    text_h: f64,
    position_pct: (f64, f64),
    alignment: TextAlignment,
    canvas: CanvasSize,
) -> PillGeometry {
    let pad_x = text_h * 0.6;
    let pad_y = text_h * 0.35;
    let pill_w = text_w + pad_x * 2.0;
    let pill_h = text_h + pad_y * 2.0;

    let anchor_x = position_pct.0 / 100.0 * canvas.width as f64;
    let anchor_y = position_pct.1 / 100.0 * canvas.height as f64;

    let x = match alignment {
        TextAlignment::Left => anchor_x,
        TextAlignment::Center => anchor_x - pill_w / 2.0,
        TextAlignment::Right => anchor_x - pill_w,
    };
    let y = anchor_y - pill_h / 2.0;

    PillGeometry {
        rect: Rect::new(x, y, pill_w, pill_h),
        corner_radius: pill_h / 2.0,
        text_x: x + pad_x,
        text_y: y + pad_y,
    }
}

/// Fill the rounded pill background per style.
pub fn draw_pill_background(frame: &mut Frame, geometry: &PillGeometry, style: BackgroundStyle) {
    if style == BackgroundStyle::None {
        return;
    }

    let rect = geometry.rect;
    let radius = geometry.corner_radius;
    let x0 = rect.x.floor().max(0.0) as u32;
    let y0 = rect.y.floor().max(0.0) as u32;
    let x1 = rect.right().ceil().min(frame.width() as f64).max(0.0) as u32;
    let y1 = rect.bottom().ceil().min(frame.height() as f64).max(0.0) as u32;

    for y in y0..y1 {
        for x in x0..x1 {
            let px = x as f64 + 0.5;
            let py = y as f64 + 0.5;
            if !inside_rounded_rect(px, py, rect, radius) {
                continue;
            }
            let color = match style {
                BackgroundStyle::Solid => [0, 0, 0, 255],
                BackgroundStyle::Translucent => [0, 0, 0, 110],
                BackgroundStyle::Gradient => {
                    let t = ((py - rect.y) / rect.h.max(1.0)).clamp(0.0, 1.0);
                    let v = (40.0 * (1.0 - t)) as u8;
                    [v, v, v, 230]
                }
                BackgroundStyle::None => unreachable!(),
            };
            frame.blend_pixel(x, y, color);
        }
    }
}

fn inside_rounded_rect(px: f64, py: f64, rect: Rect, radius: f64) -> bool {
    if px < rect.x || px > rect.right() || py < rect.y || py > rect.bottom() {
        return false;
    }

    let radius = radius.min(rect.w / 2.0).min(rect.h / 2.0);
    let cx = px.clamp(rect.x + radius, rect.right() - radius);
    let cy = py.clamp(rect.y + radius, rect.bottom() - radius);
    let dx = px - cx;
    let dy = py - cy;
    dx * dx + dy * dy <= radius * radius
}

/// Burns the watermark pill into frames.
pub struct WatermarkRenderer {
    font: OverlayFont,
}

impl WatermarkRenderer {
    pub fn new(font: OverlayFont) -> Self {
        Self { font }
    }

    pub fn font(&self) -> &OverlayFont {
        &self.font
    }

    /// Draw the watermark onto a frame sized to the given canvas.
    pub fn draw(&self, frame: &mut Frame, spec: &WatermarkSpec) {
        if spec.text.is_empty() {
            return;
        }

        let canvas = CanvasSize::new(frame.width(), frame.height());
        let (text_w, text_h) = self.font.measure(&spec.text, spec.size_px);
        let geometry = pill_geometry(text_w, text_h, spec.position_pct, spec.alignment, canvas);

        draw_pill_background(frame, &geometry, spec.background);

        match spec.shadow {
            ShadowStyle::None => {}
            ShadowStyle::Subtle => {
                self.draw_text_layer(frame, &geometry, spec, (1.0, 1.0), 1.5, [0, 0, 0, 120]);
            }
            ShadowStyle::Strong => {
                self.draw_text_layer(frame, &geometry, spec, (2.0, 2.0), 3.0, [0, 0, 0, 200]);
            }
            ShadowStyle::Neon => {
                // Glow in the text's own color; the second pass uses a
                // larger blur radius.
                let glow = [spec.color[0], spec.color[1], spec.color[2], 180];
                self.draw_text_layer(frame, &geometry, spec, (0.0, 0.0), 3.0, glow);
                self.draw_text_layer(frame, &geometry, spec, (0.0, 0.0), 7.0, glow);
            }
        }

        self.font.draw(
            frame.as_image_mut(),
            geometry.text_x.round() as i32,
            geometry.text_y.round() as i32,
            spec.size_px,
            spec.color,
            &spec.text,
        );
    }

    /// Render the text into a transparent layer, blur it, and composite
    /// it at an offset from the final text position.
    fn draw_text_layer(
        &self,
        frame: &mut Frame,
        geometry: &PillGeometry,
        spec: &WatermarkSpec,
        offset: (f64, f64),
        blur_sigma: f32,
        color: [u8; 4],
    ) {
        let margin = (blur_sigma * 3.0).ceil() as u32;
        let (text_w, text_h) = self.font.measure(&spec.text, spec.size_px);
        let layer_w = text_w.ceil() as u32 + margin * 2;
        let layer_h = text_h.ceil() as u32 + margin * 2;
        if layer_w == 0 || layer_h == 0 {
            return;
        }

        let mut layer = RgbaImage::from_pixel(layer_w, layer_h, Rgba([0, 0, 0, 0]));
        self.font
            .draw(&mut layer, margin as i32, margin as i32, spec.size_px, color, &spec.text);
        let blurred = imageproc::filter::gaussian_blur_f32(&layer, blur_sigma.max(0.1));

        image::imageops::overlay(
            frame.as_image_mut(),
            &blurred,
            (geometry.text_x + offset.0).round() as i64 - margin as i64,
            (geometry.text_y + offset.1).round() as i64 - margin as i64,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pulse_alpha_stays_in_band() {
        for ms in [0.0, 150.0, 471.0, 1000.0, 12_345.0] {
            let alpha = rec_pulse_alpha(ms);
            assert!((0.4..=1.0).contains(&alpha), "alpha {alpha} at {ms}ms");
        }
        assert!((rec_pulse_alpha(0.0) - 0.7).abs() < 1e-9);
    }

    #[test]
    fn rec_indicator_draws_dot_without_font() {
        let mut frame = Frame::new(200, 200);
        draw_rec_indicator(&mut frame, 0.0, None);
        let [r, g, b, _] = frame.get_pixel(36, 36);
        assert_eq!([r, g, b], [226, 61, 61]);
    }

    #[test]
    fn pill_geometry_alignment_pins_expected_edge() {
        let canvas = CanvasSize::new(1000, 1000);
        let left = pill_geometry(100.0, 20.0, (50.0, 50.0), TextAlignment::Left, canvas);
        let center = pill_geometry(100.0, 20.0, (50.0, 50.0), TextAlignment::Center, canvas);
        let right = pill_geometry(100.0, 20.0, (50.0, 50.0), TextAlignment::Right, canvas);

        assert_eq!(left.rect.x, 500.0);
        assert!((center.rect.x + center.rect.w / 2.0 - 500.0).abs() < 1e-9);
        assert!((right.rect.right() - 500.0).abs() < 1e-9);

        // All variants center vertically on the anchor.
        for g in [left, center, right] {
            assert!((g.rect.y + g.rect.h / 2.0 - 500.0).abs() < 1e-9);
        }
    }

    #[test]
    fn pill_padding_surrounds_text() {
        let canvas = CanvasSize::new(1000, 1000);
        let g = pill_geometry(100.0, 20.0, (10.0, 10.0), TextAlignment::Left, canvas);
        assert!(g.text_x > g.rect.x);
        assert!(g.text_y > g.rect.y);
        assert!(g.rect.w > 100.0);
        assert!(g.rect.h > 20.0);
        assert_eq!(g.corner_radius, g.rect.h / 2.0);
    }

    #[test]
    fn rounded_rect_excludes_corner_pixels() {
        let rect = Rect::new(0.0, 0.0, 100.0, 40.0);
        assert!(inside_rounded_rect(50.0, 20.0, rect, 20.0));
        assert!(inside_rounded_rect(2.0, 20.0, rect, 20.0));
        // The very corner lies outside the rounded boundary.
        assert!(!inside_rounded_rect(0.5, 0.5, rect, 20.0));
    }

    #[test]
    fn solid_background_fills_pill_center() {
        let mut frame = Frame::new(200, 100);
        frame.clear([10, 10, 10, 255]);
        let g = pill_geometry(60.0, 20.0, (50.0, 50.0), TextAlignment::Center, CanvasSize::new(200, 100));
        draw_pill_background(&mut frame, &g, BackgroundStyle::Solid);
        assert_eq!(frame.get_pixel(100, 50), [0, 0, 0, 255]);
    }

    #[test]
    fn none_background_leaves_frame_untouched() {
        let mut frame = Frame::new(200, 100);
        frame.clear([10, 10, 10, 255]);
        let g = pill_geometry(60.0, 20.0, (50.0, 50.0), TextAlignment::Center, CanvasSize::new(200, 100));
        draw_pill_background(&mut frame, &g, BackgroundStyle::None);
        assert_eq!(frame.get_pixel(100, 50), [10, 10, 10, 255]);
    }
}
