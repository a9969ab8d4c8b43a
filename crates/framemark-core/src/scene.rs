//! The set of vector objects visible on one video frame.

use crate::shapes::{Shape, ShapeId};
use kurbo::Rect;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Current version of the serialized scene format.
pub const SCENE_FORMAT_VERSION: u32 = 1;

/// Scene codec errors.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("Malformed scene data: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Unsupported scene format version {found} (newest known is {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },
}

/// Opaque serialized form of a scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SerializedScene(String);

impl SerializedScene {
    /// Wrap raw serialized data without validating it.
    pub fn from_raw(data: impl Into<String>) -> Self {
        Self(data.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// On-the-wire shape of a serialized scene.
#[derive(Serialize, Deserialize)]
struct SceneDocument {
    #[serde(default = "legacy_version")]
    version: u32,
    objects: Vec<Shape>,
}

fn legacy_version() -> u32 {
    1
}

/// An ordered scene plus a single transient preview slot.
///
/// The preview belongs to the gesture in progress; it is rendered on top of
/// the objects but never serialized or counted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    objects: Vec<Shape>,
    preview: Option<Shape>,
}

impl Scene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an object on top of the others.
    pub fn push(&mut self, shape: Shape) {
        self.objects.push(shape);
    }

    /// Remove an object by ID.
    pub fn remove(&mut self, id: ShapeId) -> Option<Shape> {
        let index = self.objects.iter().position(|s| s.id() == id)?;
        Some(self.objects.remove(index))
    }

    /// Remove every object and the preview.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.preview = None;
    }

    /// Objects in draw order (back to front).
    pub fn objects(&self) -> &[Shape] {
        &self.objects
    }

    /// Put a preview shape in the slot, replacing any previous one.
    pub fn set_preview(&mut self, preview: Option<Shape>) {
        self.preview = preview;
    }

    /// Remove the preview shape, if any.
    pub fn take_preview(&mut self) -> Option<Shape> {
        self.preview.take()
    }

    pub fn preview(&self) -> Option<&Shape> {
        self.preview.as_ref()
    }

    /// Objects followed by the preview, in render order.
    pub fn render_list(&self) -> impl Iterator<Item = &Shape> {
        self.objects.iter().chain(self.preview.iter())
    }

    /// Check if the scene has no committed objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Get the number of committed objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Get the bounding box of all committed objects.
    pub fn bounds(&self) -> Option<Rect> {
        self.objects
            .iter()
            .map(Shape::bounds)
            .reduce(|acc, b| acc.union(b))
    }

    /// Serialize the committed objects.
    pub fn serialize(&self) -> Result<SerializedScene, SceneError> {
        #[derive(Serialize)]
        struct Borrowed<'a> {
            version: u32,
            objects: &'a [Shape],
        }

        let json = serde_json::to_string(&Borrowed {
            version: SCENE_FORMAT_VERSION,
            objects: &self.objects,
        })?;
        Ok(SerializedScene(json))
    }

    /// Decode a serialized scene. The result has no preview.
    pub fn deserialize(data: &SerializedScene) -> Result<Self, SceneError> {
        let document: SceneDocument = serde_json::from_str(&data.0)?;
        if document.version > SCENE_FORMAT_VERSION {
            return Err(SceneError::UnsupportedVersion {
                found: document.version,
                supported: SCENE_FORMAT_VERSION,
            });
        }
        Ok(Self {
            objects: document.objects,
            preview: None,
        })
    }
}
