//! Mapping from continuous playback time to discrete frame indices.

use serde::{Deserialize, Serialize};

/// Index of a video frame, the key for all per-frame annotation state.
pub type FrameIndex = u64;

/// Frame rate used when none is configured.
pub const DEFAULT_FRAME_RATE: f64 = 30.0;

/// Derives frame indices from playback time at a fixed frame rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameClock {
    frame_rate: f64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_RATE)
    }
}

impl FrameClock {
    /// Create a clock for the given frame rate (frames per second).
    pub fn new(frame_rate: f64) -> Self {
        Self { frame_rate }
    }

    /// Frames per second.
    pub fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    /// `floor(time * frame_rate)`. Negative and non-finite times map to frame 0.
    pub fn frame_index(&self, time_seconds: f64) -> FrameIndex {
        let scaled = (time_seconds * self.frame_rate).floor();
        if scaled.is_finite() && scaled > 0.0 {
            scaled as FrameIndex
        } else {
            0
        }
    }

    /// Playback time at which `frame` begins.
    pub fn frame_start(&self, frame: FrameIndex) -> f64 {
        frame as f64 / self.frame_rate
    }
}
