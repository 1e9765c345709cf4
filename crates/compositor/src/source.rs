//! Source handles consumed by the compositor.

use crate::frame::Frame;

/// A non-owning view of one source's current frame.
///
/// The tag records where the pixels came from, which determines the
/// readiness check: decoded video carries its natural dimensions (zero
/// while the decoder is still buffering), a live stream is ready as soon
/// as a frame exists, and a canvas (e.g. a face-filter output) is always
/// ready.
#[derive(Debug, Clone)]
pub enum SourceFrame {
    /// A frame decoded from a video file (library or upload playback).
    Video {
        image: Frame,
        natural_width: u32,
        natural_height: u32,
    },
    /// A frame pulled from a live capture stream (screen or webcam).
    LiveStream { image: Frame },
    /// An already-rendered canvas, substituted as-is.
    Canvas { image: Frame },
}

impl SourceFrame {
    pub fn video(image: Frame) -> Self {
        let natural_width = image.width();
        let natural_height = image.height();
        SourceFrame::Video {
            image,
            natural_width,
            natural_height,
        }
    }

    pub fn live(image: Frame) -> Self {
        SourceFrame::LiveStream { image }
    }

    pub fn canvas(image: Frame) -> Self {
        SourceFrame::Canvas { image }
    }

    /// Source width in pixels (natural dimensions for decoded video).
    pub fn width(&self) -> u32 {
        match self {
            SourceFrame::Video { natural_width, .. } => *natural_width,
            SourceFrame::LiveStream { image } | SourceFrame::Canvas { image } => image.width(),
        }
    }

    /// Source height in pixels.
    pub fn height(&self) -> u32 {
        match self {
            SourceFrame::Video { natural_height, .. } => *natural_height,
            SourceFrame::LiveStream { image } | SourceFrame::Canvas { image } => image.height(),
        }
    }

    /// Whether this source has decoded data worth drawing.
    pub fn is_ready(&self) -> bool {
        match self {
            SourceFrame::Video {
                natural_width,
                natural_height,
                ..
            } => *natural_width > 0 && *natural_height > 0,
            SourceFrame::LiveStream { image } => image.width() > 0 && image.height() > 0,
            SourceFrame::Canvas { .. } => true,
        }
    }

    /// Width / height, `None` until the source is ready.
    pub fn aspect(&self) -> Option<f64> {
        if !self.is_ready() {
            return None;
        }
        Some(self.width() as f64 / self.height().max(1) as f64)
    }

    pub fn image(&self) -> &Frame {
        match self {
            SourceFrame::Video { image, .. }
            | SourceFrame::LiveStream { image }
            | SourceFrame::Canvas { image } => image,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffering_video_is_not_ready() {
        let source = SourceFrame::Video {
            image: Frame::new(1, 1),
            natural_width: 0,
            natural_height: 0,
        };
        assert!(!source.is_ready());
        assert_eq!(source.aspect(), None);
    }

    #[test]
    fn live_stream_with_frame_is_ready() {
        let source = SourceFrame::live(Frame::new(1280, 720));
        assert!(source.is_ready());
        assert!((source.aspect().unwrap() - 16.0 / 9.0).abs() < 1e-9);
    }

    #[test]
    fn canvas_is_always_ready() {
        assert!(SourceFrame::canvas(Frame::new(4, 4)).is_ready());
    }
}
