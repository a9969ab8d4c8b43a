//! Framemark Core Library
//!
//! Frame-synchronized vector annotation for video review: drawings are made
//! on a transparent canvas over the video and stored per frame, so scrubbing
//! back to a frame brings its annotations back.

pub mod annotator;
pub mod archive;
pub mod config;
pub mod frame_clock;
pub mod frame_store;
pub mod guard;
pub mod history;
pub mod input;
pub mod playback;
pub mod scene;
pub mod scheduler;
pub mod shapes;
pub mod tools;

pub use annotator::{Annotator, AnnotatorEvent};
pub use archive::{ArchiveError, FrameArchive};
pub use config::{AnnotatorConfig, ConfigError};
pub use frame_clock::{FrameClock, FrameIndex};
pub use frame_store::{FrameDrawing, FrameStore, SaveOutcome};
pub use guard::{SyncGuard, SyncState};
pub use history::History;
pub use input::{MouseButton, PointerEvent};
pub use playback::{FrameChange, PlaybackSync};
pub use scene::{Scene, SceneError, SerializedScene};
pub use scheduler::Debouncer;
pub use shapes::{ColorError, SerializableColor, Shape, ShapeStyle};
pub use tools::{ShapeBuilder, ToolKind, ToolState};
