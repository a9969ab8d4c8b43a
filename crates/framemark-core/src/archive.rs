//! JSON archive of a whole frame store, for moving annotations between
//! sessions or handing them to other tools.

use crate::frame_store::{FrameDrawing, FrameStore};
use crate::scene::Scene;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Current archive format version.
pub const ARCHIVE_FORMAT_VERSION: u32 = 1;

/// Archive errors.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Unsupported archive version {found} (newest supported is {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },
}

/// Result type for archive operations.
pub type ArchiveResult<T> = Result<T, ArchiveError>;

/// Every drawing of a review session, ordered by frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameArchive {
    pub version: u32,
    /// Frame rate the indices were computed with.
    pub frame_rate: f64,
    pub exported_at: DateTime<Utc>,
    pub drawings: Vec<FrameDrawing>,
}

impl FrameArchive {
    /// Snapshot a store.
    pub fn from_store(store: &FrameStore, frame_rate: f64) -> Self {
        Self {
            version: ARCHIVE_FORMAT_VERSION,
            frame_rate,
            exported_at: Utc::now(),
            drawings: store.all(),
        }
    }

    /// Rebuild a store. Records that do not decode or hold no objects are
    /// skipped so the store keeps its one-record-per-annotated-frame shape.
    pub fn into_store(self) -> FrameStore {
        let mut store = FrameStore::new();
        for drawing in self.drawings {
            match Scene::deserialize(&drawing.scene) {
                Ok(scene) if scene.is_empty() => {
                    log::debug!("Skipping empty drawing on frame {}", drawing.frame);
                }
                Ok(_) => {
                    if store.insert(drawing).is_some() {
                        log::warn!("Archive has more than one drawing for a frame; keeping the last");
                    }
                }
                Err(e) => {
                    log::warn!("Skipping unreadable drawing on frame {}: {}", drawing.frame, e);
                }
            }
        }
        store
    }

    /// Number of frames with a drawing.
    pub fn len(&self) -> usize {
        self.drawings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drawings.is_empty()
    }

    pub fn to_json(&self) -> ArchiveResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| ArchiveError::Serialization(e.to_string()))
    }

    pub fn from_json(json: &str) -> ArchiveResult<Self> {
        let archive: Self =
            serde_json::from_str(json).map_err(|e| ArchiveError::Serialization(e.to_string()))?;
        if archive.version > ARCHIVE_FORMAT_VERSION {
            return Err(ArchiveError::UnsupportedVersion {
                found: archive.version,
                supported: ARCHIVE_FORMAT_VERSION,
            });
        }
        Ok(archive)
    }

    /// Write the archive as pretty-printed JSON.
    pub fn write_to(&self, path: &Path) -> ArchiveResult<()> {
        let json = self.to_json()?;
        fs::write(path, json)
            .map_err(|e| ArchiveError::Io(format!("Failed to write {}: {}", path.display(), e)))
    }

    pub fn read_from(path: &Path) -> ArchiveResult<Self> {
        let json = fs::read_to_string(path)
            .map_err(|e| ArchiveError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_json(&json).map_err(|e| match e {
            ArchiveError::Serialization(msg) => {
                ArchiveError::Serialization(format!("Failed to parse {}: {}", path.display(), msg))
            }
            other => other,
        })
    }
}
