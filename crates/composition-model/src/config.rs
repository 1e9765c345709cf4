//! Composition configuration: what is on the canvas and how it is arranged.
//!
//! The config is owned by the caller (typically a UI layer). The draw and
//! capture loops read an immutable snapshot once per tick; writers replace
//! the whole value between ticks rather than mutating fields in place.

use serde::{Deserialize, Serialize};

use crate::geometry::{CanvasSize, PercentRect};

/// Which content source fills the main pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceMode {
    /// Screen or window capture.
    Screen,
    /// A video played back from the library.
    LibraryVideo,
    /// A video uploaded by the user.
    CustomUpload,
    /// No content pane; the webcam fills the canvas.
    WebcamOnly,
}

/// How the webcam and content panes are arranged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutMode {
    SideBySide,
    Stacked,
    Pip,
}

/// Canvas orientation. Pixel dimensions are fixed per orientation and may
/// only change between recording sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Orientation {
    Landscape,
    Portrait,
}

impl Orientation {
    /// The canvas pixel dimensions for this orientation.
    pub fn canvas_size(self) -> CanvasSize {
        match self {
            Orientation::Landscape => CanvasSize::new(1920, 1080),
            Orientation::Portrait => CanvasSize::new(1080, 1920),
        }
    }

    /// Canvas width / height.
    pub fn canvas_aspect(self) -> f64 {
        let size = self.canvas_size();
        size.width as f64 / size.height as f64
    }
}

/// Where the webcam pane sits relative to the content.
///
/// `Left`/`Right` select the pane order in split layouts; the `*Center`
/// variants request a full-height strip; the four corner variants anchor
/// the default picture-in-picture rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WebcamPosition {
    Left,
    Right,
    LeftCenter,
    RightCenter,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl WebcamPosition {
    /// Whether the webcam takes the leading pane in a split layout
    /// (left half side-by-side, top half stacked).
    pub fn is_leading(self) -> bool {
        matches!(
            self,
            WebcamPosition::Left
                | WebcamPosition::LeftCenter
                | WebcamPosition::TopLeft
                | WebcamPosition::BottomLeft
        )
    }

    /// Whether this position requests a full-height webcam strip.
    pub fn is_center_strip(self) -> bool {
        matches!(self, WebcamPosition::LeftCenter | WebcamPosition::RightCenter)
    }
}

/// Text alignment of the watermark relative to its anchor position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextAlignment {
    Left,
    Center,
    Right,
}

/// Shadow treatment for the watermark text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShadowStyle {
    None,
    Subtle,
    Strong,
    /// Glow: the text is drawn a second time with a wider blur.
    Neon,
}

/// Background treatment for the watermark pill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackgroundStyle {
    None,
    Solid,
    Gradient,
    Translucent,
}

/// The text watermark burned into preview and recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatermarkSpec {
    pub text: String,

    /// Anchor position as percentages of canvas width/height.
    pub position_pct: (f64, f64),

    /// Font family name (resolved to a font file by the host).
    pub font_family: String,

    /// Text color, RGBA.
    pub color: [u8; 4],

    /// Text size in canvas pixels.
    pub size_px: f32,

    pub shadow: ShadowStyle,
    pub background: BackgroundStyle,
    pub alignment: TextAlignment,
}

impl Default for WatermarkSpec {
    fn default() -> Self {
        Self {
            text: String::new(),
            position_pct: (50.0, 92.0),
            font_family: "sans-serif".to_string(),
            color: [255, 255, 255, 255],
            size_px: 36.0,
            shadow: ShadowStyle::Subtle,
            background: BackgroundStyle::Translucent,
            alignment: TextAlignment::Center,
        }
    }
}

/// One audio input feeding the mixed output track.
///
/// The stream itself is supplied to the recorder separately; this spec
/// carries only the routing description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioChannelSpec {
    pub label: String,

    /// Channel volume. Always clamped to [0, 1].
    gain: f32,

    pub enabled: bool,
}

impl AudioChannelSpec {
    pub fn new(label: impl Into<String>, gain: f32, enabled: bool) -> Self {
        Self {
            label: label.into(),
            gain: gain.clamp(0.0, 1.0),
            enabled,
        }
    }

    pub fn gain(&self) -> f32 {
        self.gain.clamp(0.0, 1.0)
    }
}

/// The full composition read by the compositor once per frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionConfig {
    pub source_mode: SourceMode,
    pub layout_mode: LayoutMode,
    pub orientation: Orientation,
    pub webcam_position: WebcamPosition,

    /// Split point for side-by-side layouts, percent of canvas width.
    pub side_by_side_split: f64,

    /// Split point for stacked layouts, percent of canvas height.
    pub stacked_split: f64,

    /// User-dragged picture-in-picture rectangle, percentage space.
    /// `None` selects the corner-anchored default.
    pub custom_pip_rect: Option<PercentRect>,

    pub watermark: Option<WatermarkSpec>,

    /// When set, the compositor substitutes a filtered canvas for the raw
    /// webcam source each frame.
    pub face_filter_enabled: bool,
}

impl Default for CompositionConfig {
    fn default() -> Self {
        Self {
            source_mode: SourceMode::Screen,
            layout_mode: LayoutMode::SideBySide,
            orientation: Orientation::Landscape,
            webcam_position: WebcamPosition::Left,
            side_by_side_split: 50.0,
            stacked_split: 50.0,
            custom_pip_rect: None,
            watermark: None,
            face_filter_enabled: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orientation_canvas_sizes_are_fixed() {
        assert_eq!(Orientation::Landscape.canvas_size(), CanvasSize::new(1920, 1080));
        assert_eq!(Orientation::Portrait.canvas_size(), CanvasSize::new(1080, 1920));
    }

    #[test]
    fn audio_channel_gain_is_clamped() {
        assert_eq!(AudioChannelSpec::new("mic", 1.5, true).gain(), 1.0);
        assert_eq!(AudioChannelSpec::new("mic", -0.2, true).gain(), 0.0);
        assert_eq!(AudioChannelSpec::new("mic", 0.4, true).gain(), 0.4);
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = CompositionConfig {
            layout_mode: LayoutMode::Pip,
            webcam_position: WebcamPosition::BottomRight,
            watermark: Some(WatermarkSpec {
                text: "@creator".to_string(),
                ..WatermarkSpec::default()
            }),
            ..CompositionConfig::default()
        };

        let json = serde_json::to_string(&config).unwrap();
        let parsed: CompositionConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
        assert!(json.contains("\"pip\""));
        assert!(json.contains("\"bottom-right\""));
    }
}
