//! Error types shared across Scenecast crates.

use std::path::PathBuf;

/// Top-level error type for Scenecast operations.
#[derive(Debug, thiserror::Error)]
pub enum ScenecastError {
    #[error("Acquisition error: {message}")]
    Acquisition { message: String },

    #[error("No supported encoding configuration: {message}")]
    EncodingUnsupported { message: String },

    #[error("Frame processing error: {message}")]
    FrameProcessing { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Mixer error: {message}")]
    Mixer { message: String },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using ScenecastError.
pub type ScenecastResult<T> = Result<T, ScenecastError>;

impl ScenecastError {
    pub fn acquisition(msg: impl Into<String>) -> Self {
        Self::Acquisition {
            message: msg.into(),
        }
    }

    pub fn encoding_unsupported(msg: impl Into<String>) -> Self {
        Self::EncodingUnsupported {
            message: msg.into(),
        }
    }

    pub fn frame_processing(msg: impl Into<String>) -> Self {
        Self::FrameProcessing {
            message: msg.into(),
        }
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage {
            message: msg.into(),
        }
    }

    pub fn mixer(msg: impl Into<String>) -> Self {
        Self::Mixer {
            message: msg.into(),
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }
}
