//! Durable keyed store for raw webcam recordings.
//!
//! The raw recording is a secondary artifact consumed (and then deleted)
//! by a downstream pipeline. Each entry is a directory bundle keyed by
//! session id: the recording file plus a `metadata.json` describing the
//! composition it was captured under, including the computed crop region.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use scenecast_common::error::{ScenecastError, ScenecastResult};
use scenecast_composition_model::{
    CropRegion, LayoutMode, Orientation, SourceMode, WebcamPosition,
};

/// Composition metadata persisted beside a raw recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecordingMetadata {
    pub session_id: String,
    pub source_mode: SourceMode,
    pub layout_mode: LayoutMode,
    pub orientation: Orientation,
    pub webcam_position: WebcamPosition,
    pub crop_region: Option<CropRegion>,
    pub recorded_at: String,
}

/// A stored raw recording retrieved by session id.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRawRecording {
    pub path: PathBuf,
    pub metadata: RawRecordingMetadata,
}

/// Keyed persistence for raw recordings.
pub trait RawRecordingStore: Send + Sync {
    fn save(&self, metadata: &RawRecordingMetadata, recording: &Path) -> ScenecastResult<()>;

    fn get(&self, session_id: &str) -> ScenecastResult<Option<StoredRawRecording>>;

    fn delete(&self, session_id: &str) -> ScenecastResult<()>;
}

/// Directory-bundle implementation: `<root>/<session_id>/`.
#[derive(Debug, Clone)]
pub struct DirRawRecordingStore {
    root: PathBuf,
}

impl DirRawRecordingStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn entry_dir(&self, session_id: &str) -> PathBuf {
        self.root.join(session_id)
    }

    fn metadata_path(&self, session_id: &str) -> PathBuf {
        self.entry_dir(session_id).join("metadata.json")
    }
}

impl RawRecordingStore for DirRawRecordingStore {
    fn save(&self, metadata: &RawRecordingMetadata, recording: &Path) -> ScenecastResult<()> {
        if !recording.exists() {
            return Err(ScenecastError::storage(format!(
                "Raw recording missing: {}",
                recording.display()
            )));
        }

        let dir = self.entry_dir(&metadata.session_id);
        std::fs::create_dir_all(&dir)
            .map_err(|e| ScenecastError::storage(format!("Failed to create {}: {e}", dir.display())))?;

        let extension = recording
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("webm");
        let dest = dir.join(format!("raw.{extension}"));

        // Rename when possible; fall back to a copy across filesystems.
        if std::fs::rename(recording, &dest).is_err() {
            std::fs::copy(recording, &dest).map_err(|e| {
                ScenecastError::storage(format!("Failed to store raw recording: {e}"))
            })?;
            let _ = std::fs::remove_file(recording);
        }

        let json = serde_json::to_string_pretty(metadata)
            .map_err(|e| ScenecastError::storage(format!("Failed to encode metadata: {e}")))?;
        std::fs::write(self.metadata_path(&metadata.session_id), json)
            .map_err(|e| ScenecastError::storage(format!("Failed to write metadata: {e}")))?;

        tracing::info!(
            session_id = %metadata.session_id,
            path = %dest.display(),
            "Raw recording persisted"
        );
        Ok(())
    }

    fn get(&self, session_id: &str) -> ScenecastResult<Option<StoredRawRecording>> {
        let metadata_path = self.metadata_path(session_id);
        if !metadata_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&metadata_path)
            .map_err(|e| ScenecastError::storage(format!("Failed to read metadata: {e}")))?;
        let metadata: RawRecordingMetadata = serde_json::from_str(&content)
            .map_err(|e| ScenecastError::storage(format!("Corrupt metadata for {session_id}: {e}")))?;

        let dir = self.entry_dir(session_id);
        let recording = std::fs::read_dir(&dir)
            .map_err(|e| ScenecastError::storage(format!("Failed to list {}: {e}", dir.display())))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .find(|path| {
                path.file_stem()
                    .map(|stem| stem == "raw")
                    .unwrap_or(false)
            });

        match recording {
            Some(path) => Ok(Some(StoredRawRecording { path, metadata })),
            None => Ok(None),
        }
    }

    fn delete(&self, session_id: &str) -> ScenecastResult<()> {
        let dir = self.entry_dir(session_id);
        if dir.exists() {
            std::fs::remove_dir_all(&dir)
                .map_err(|e| ScenecastError::storage(format!("Failed to delete {session_id}: {e}")))?;
        }
        Ok(())
    }
}
