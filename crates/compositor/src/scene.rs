//! Per-tick scene snapshots.

use scenecast_composition_model::CompositionConfig;

use crate::source::SourceFrame;

/// Recording state shown by the on-canvas indicator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordingStatus {
    /// Milliseconds since the session started.
    pub elapsed_ms: f64,
}

/// Everything the compositor reads for one frame.
///
/// Built fresh at the start of each draw tick from the current config and
/// the sources' latest frames; the draw loop never holds a live reference
/// into mutable caller state.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub config: CompositionConfig,

    /// Current frame of the content source, if any.
    pub content: Option<SourceFrame>,

    /// Current raw webcam frame, if a webcam is attached.
    pub webcam: Option<SourceFrame>,

    /// Filtered stand-in for the webcam, substituted for this frame only
    /// when the config enables the face filter.
    pub face_filter: Option<SourceFrame>,

    /// Present while a recording session is active.
    pub recording: Option<RecordingStatus>,

    /// True while an external drag-to-reposition overlay is shown; the
    /// burned-in watermark is hidden so it is not drawn twice.
    pub watermark_suppressed: bool,
}

impl Scene {
    /// The webcam source to draw this frame: the face-filter canvas when
    /// enabled and present, else the raw webcam.
    pub fn effective_webcam(&self) -> Option<&SourceFrame> {
        if self.config.face_filter_enabled {
            if let Some(filtered) = &self.face_filter {
                return Some(filtered);
            }
        }
        self.webcam.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Frame;

    #[test]
    fn face_filter_substitutes_when_enabled() {
        let mut scene = Scene {
            webcam: Some(SourceFrame::live(Frame::new(2, 2))),
            face_filter: Some(SourceFrame::canvas(Frame::new(4, 4))),
            ..Scene::default()
        };

        scene.config.face_filter_enabled = false;
        assert_eq!(scene.effective_webcam().unwrap().width(), 2);

        scene.config.face_filter_enabled = true;
        assert_eq!(scene.effective_webcam().unwrap().width(), 4);
    }

    #[test]
    fn face_filter_falls_back_to_raw_webcam() {
        let mut scene = Scene {
            webcam: Some(SourceFrame::live(Frame::new(2, 2))),
            ..Scene::default()
        };
        scene.config.face_filter_enabled = true;
        assert_eq!(scene.effective_webcam().unwrap().width(), 2);
    }
}
