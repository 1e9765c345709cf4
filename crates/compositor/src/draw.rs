//! The per-frame draw routine.

use scenecast_composition_model::{resolve_layout, PaneLayout, SourceMode};

use crate::frame::Frame;
use crate::overlay::{draw_rec_indicator, WatermarkRenderer};
use crate::scene::Scene;
use crate::source::SourceFrame;

const CLEAR_COLOR: [u8; 4] = [0, 0, 0, 255];
const DIVIDER_COLOR: [u8; 4] = [255, 255, 255, 255];

/// Owns the composited canvas and renders one [`Scene`] per tick.
///
/// The backing buffer is reallocated only when the target dimensions
/// change (which can only happen between sessions, with an orientation
/// switch). Sources that are not ready are skipped for the frame rather
/// than failing the draw.
pub struct CanvasCompositor {
    canvas: Frame,
    watermark: Option<WatermarkRenderer>,
}

impl CanvasCompositor {
    pub fn new(width: u32, height: u32, watermark: Option<WatermarkRenderer>) -> Self {
        Self {
            canvas: Frame::new(width, height),
            watermark,
        }
    }

    /// The most recently rendered frame.
    pub fn canvas(&self) -> &Frame {
        &self.canvas
    }

    /// Render the scene and return the composited frame.
    pub fn render(&mut self, scene: &Scene) -> &Frame {
        let target = scene.config.orientation.canvas_size();
        if self.canvas.width() != target.width || self.canvas.height() != target.height {
            self.canvas = Frame::new(target.width, target.height);
        }

        self.canvas.clear(CLEAR_COLOR);

        let webcam = scene.effective_webcam().filter(|s| s.is_ready());
        let content = match scene.config.source_mode {
            SourceMode::WebcamOnly => None,
            _ => scene.content.as_ref().filter(|s| s.is_ready()),
        };

        let layout = resolve_layout(
            scene.config.source_mode,
            scene.config.layout_mode,
            scene.config.orientation,
            scene.config.webcam_position,
            scene.config.side_by_side_split,
            scene.config.stacked_split,
            scene.config.custom_pip_rect,
            webcam.and_then(SourceFrame::aspect),
            content.and_then(SourceFrame::aspect),
        );

        match layout {
            PaneLayout::ContentOnly { content: rect } => {
                if let Some(source) = content {
                    self.canvas.draw_scaled(source.image(), rect);
                }
            }
            PaneLayout::Dual {
                webcam: webcam_rect,
                content: content_rect,
                divider,
            } => {
                if let Some(source) = content {
                    self.canvas.draw_scaled(source.image(), content_rect);
                }
                if let Some(source) = webcam {
                    self.canvas.draw_scaled(source.image(), webcam_rect);
                }
                self.canvas.fill_rect(divider, DIVIDER_COLOR);
            }
            PaneLayout::Pip {
                content: content_rect,
                webcam: webcam_rect,
            } => {
                if let Some(source) = content {
                    self.canvas.draw_scaled(source.image(), content_rect);
                }
                if let Some(source) = webcam {
                    self.canvas.draw_scaled(source.image(), webcam_rect);
                }
            }
            PaneLayout::WebcamOnly { webcam: rect } => {
                if let Some(source) = webcam {
                    self.canvas.draw_scaled(source.image(), rect);
                }
            }
        }

        if let Some(status) = scene.recording {
            let font = self.watermark.as_ref().map(|w| w.font());
            draw_rec_indicator(&mut self.canvas, status.elapsed_ms, font);
        }

        if !scene.watermark_suppressed {
            if let (Some(renderer), Some(spec)) = (&self.watermark, &scene.config.watermark) {
                renderer.draw(&mut self.canvas, spec);
            }
        }

        &self.canvas
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::RecordingStatus;
    use scenecast_composition_model::{
        CompositionConfig, LayoutMode, Orientation, WebcamPosition,
    };

    const GREEN: [u8; 4] = [0, 200, 0, 255];
    const BLUE: [u8; 4] = [0, 0, 200, 255];

    fn solid_source(width: u32, height: u32, color: [u8; 4]) -> SourceFrame {
        let mut frame = Frame::new(width, height);
        frame.clear(color);
        SourceFrame::live(frame)
    }

    fn dual_scene() -> Scene {
        Scene {
            config: CompositionConfig {
                layout_mode: LayoutMode::SideBySide,
                webcam_position: WebcamPosition::Left,
                ..CompositionConfig::default()
            },
            content: Some(solid_source(1280, 720, GREEN)),
            webcam: Some(solid_source(1280, 720, BLUE)),
            ..Scene::default()
        }
    }

    #[test]
    fn side_by_side_places_sources_and_divider() {
        let mut compositor = CanvasCompositor::new(1920, 1080, None);
        let frame = compositor.render(&dual_scene());

        // Webcam pane center (left half, letterboxed 960x540).
        assert_eq!(frame.get_pixel(480, 540), BLUE);
        // Content pane center.
        assert_eq!(frame.get_pixel(1440, 540), GREEN);
        // Letterbox bands stay black.
        assert_eq!(frame.get_pixel(480, 100), [0, 0, 0, 255]);
        // 2px seam at the split point.
        assert_eq!(frame.get_pixel(960, 10), [255, 255, 255, 255]);
    }

    #[test]
    fn unready_source_is_skipped_silently() {
        let mut scene = dual_scene();
        scene.content = Some(SourceFrame::Video {
            image: Frame::new(1, 1),
            natural_width: 0,
            natural_height: 0,
        });

        let mut compositor = CanvasCompositor::new(1920, 1080, None);
        let frame = compositor.render(&scene);
        // Content pane stays black; webcam still draws.
        assert_eq!(frame.get_pixel(1440, 540), [0, 0, 0, 255]);
        assert_eq!(frame.get_pixel(480, 540), BLUE);
    }

    #[test]
    fn pip_draws_webcam_over_content() {
        let mut scene = dual_scene();
        scene.config.layout_mode = LayoutMode::Pip;
        scene.config.webcam_position = WebcamPosition::BottomRight;

        let mut compositor = CanvasCompositor::new(1920, 1080, None);
        let frame = compositor.render(&scene);

        // Content fills the canvas (16:9 source on a 16:9 canvas).
        assert_eq!(frame.get_pixel(200, 200), GREEN);
        // Default PiP rect sits in the bottom-right corner.
        assert_eq!(frame.get_pixel(1600, 900), BLUE);
    }

    #[test]
    fn face_filter_canvas_replaces_webcam_pane() {
        let mut scene = dual_scene();
        scene.config.face_filter_enabled = true;
        scene.face_filter = Some(SourceFrame::canvas({
            let mut f = Frame::new(1280, 720);
            f.clear([200, 0, 200, 255]);
            f
        }));

        let mut compositor = CanvasCompositor::new(1920, 1080, None);
        let frame = compositor.render(&scene);
        assert_eq!(frame.get_pixel(480, 540), [200, 0, 200, 255]);
    }

    #[test]
    fn rec_indicator_appears_only_while_recording() {
        let mut compositor = CanvasCompositor::new(1920, 1080, None);

        let mut scene = dual_scene();
        let frame = compositor.render(&scene);
        assert_ne!(frame.get_pixel(36, 36), [226, 61, 61, 255]);

        scene.recording = Some(RecordingStatus { elapsed_ms: 0.0 });
        let frame = compositor.render(&scene);
        assert_eq!(frame.get_pixel(36, 36), [226, 61, 61, 255]);
    }

    #[test]
    fn orientation_switch_reallocates_canvas() {
        let mut compositor = CanvasCompositor::new(1920, 1080, None);
        let mut scene = dual_scene();

        compositor.render(&scene);
        assert_eq!(compositor.canvas().width(), 1920);

        scene.config.orientation = Orientation::Portrait;
        compositor.render(&scene);
        assert_eq!(compositor.canvas().width(), 1080);
        assert_eq!(compositor.canvas().height(), 1920);
    }

    #[test]
    fn webcam_only_letterboxes_webcam() {
        let mut scene = dual_scene();
        scene.config.source_mode = SourceMode::WebcamOnly;
        scene.config.orientation = Orientation::Portrait;

        let mut compositor = CanvasCompositor::new(1080, 1920, None);
        let frame = compositor.render(&scene);

        // 16:9 webcam on a portrait canvas: horizontal band in the middle.
        assert_eq!(frame.get_pixel(540, 960), BLUE);
        assert_eq!(frame.get_pixel(540, 100), [0, 0, 0, 255]);
    }
}
