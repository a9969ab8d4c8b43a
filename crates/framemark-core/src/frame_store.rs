//! Per-frame persistence of serialized scenes.
//!
//! The store outlives any single annotation session: a session borrows it
//! for its lifetime and hands it back on teardown.

use crate::frame_clock::FrameIndex;
use crate::scene::{Scene, SceneError, SerializedScene};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A persisted drawing for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameDrawing {
    /// Frame the drawing belongs to.
    pub frame: FrameIndex,
    /// Serialized scene; always holds at least one object.
    pub scene: SerializedScene,
    /// When the record was last written.
    pub saved_at: DateTime<Utc>,
}

/// Effect of a [`FrameStore::save`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// A record was created or overwritten.
    Stored { objects: usize },
    /// The scene was empty and an existing record was deleted.
    Removed,
    /// The scene was empty and there was nothing to delete.
    Unchanged,
}

/// Map from frame index to the drawing made on that frame.
#[derive(Debug, Clone, Default)]
pub struct FrameStore {
    drawings: BTreeMap<FrameIndex, FrameDrawing>,
}

impl FrameStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Persist `scene` for `frame`. Empty scenes delete the record instead.
    pub fn save(&mut self, frame: FrameIndex, scene: &Scene) -> Result<SaveOutcome, SceneError> {
        if scene.is_empty() {
            return Ok(match self.drawings.remove(&frame) {
                Some(_) => SaveOutcome::Removed,
                None => SaveOutcome::Unchanged,
            });
        }

        let drawing = FrameDrawing {
            frame,
            scene: scene.serialize()?,
            saved_at: Utc::now(),
        };
        self.drawings.insert(frame, drawing);
        Ok(SaveOutcome::Stored {
            objects: scene.len(),
        })
    }

    /// Decode the scene stored for `frame`, if any.
    pub fn load(&self, frame: FrameIndex) -> Result<Option<Scene>, SceneError> {
        self.drawings
            .get(&frame)
            .map(|d| Scene::deserialize(&d.scene))
            .transpose()
    }

    /// Insert a record as-is, replacing any record for the same frame.
    pub fn insert(&mut self, drawing: FrameDrawing) -> Option<FrameDrawing> {
        self.drawings.insert(drawing.frame, drawing)
    }

    /// Delete the record for `frame`.
    pub fn remove(&mut self, frame: FrameIndex) -> Option<FrameDrawing> {
        self.drawings.remove(&frame)
    }

    pub fn get(&self, frame: FrameIndex) -> Option<&FrameDrawing> {
        self.drawings.get(&frame)
    }

    pub fn contains(&self, frame: FrameIndex) -> bool {
        self.drawings.contains_key(&frame)
    }

    /// Every stored drawing, ordered by frame.
    pub fn all(&self) -> Vec<FrameDrawing> {
        self.drawings.values().cloned().collect()
    }

    /// Frames that have a drawing, in ascending order.
    pub fn frames(&self) -> impl Iterator<Item = FrameIndex> + '_ {
        self.drawings.keys().copied()
    }

    /// First annotated frame strictly after `frame`.
    pub fn next_annotated(&self, frame: FrameIndex) -> Option<FrameIndex> {
        self.drawings
            .range(frame.saturating_add(1)..)
            .next()
            .map(|(f, _)| *f)
            .filter(|f| *f > frame)
    }

    /// Last annotated frame strictly before `frame`.
    pub fn previous_annotated(&self, frame: FrameIndex) -> Option<FrameIndex> {
        self.drawings.range(..frame).next_back().map(|(f, _)| *f)
    }

    pub fn len(&self) -> usize {
        self.drawings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drawings.is_empty()
    }
}
