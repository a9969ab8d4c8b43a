//! Detection of frame boundaries in the playback time stream.

use crate::frame_clock::{FrameClock, FrameIndex};

/// A move from one frame to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameChange {
    /// Frame being left, if one was observed before.
    pub from: Option<FrameIndex>,
    /// Frame being entered.
    pub to: FrameIndex,
}

/// Tracks the last observed frame and reports boundary crossings.
#[derive(Debug, Clone)]
pub struct PlaybackSync {
    clock: FrameClock,
    last_frame: Option<FrameIndex>,
}

impl PlaybackSync {
    pub fn new(clock: FrameClock) -> Self {
        Self {
            clock,
            last_frame: None,
        }
    }

    pub fn clock(&self) -> FrameClock {
        self.clock
    }

    pub fn last_frame(&self) -> Option<FrameIndex> {
        self.last_frame
    }

    /// Record `frame` as observed without reporting a change.
    pub fn mark_observed(&mut self, frame: FrameIndex) {
        self.last_frame = Some(frame);
    }

    /// Feed a playback time. Returns a change only when the frame index
    /// differs from the last one observed; sub-frame jitter is ignored.
    pub fn observe(&mut self, time_seconds: f64) -> Option<FrameChange> {
        let frame = self.clock.frame_index(time_seconds);
        if self.last_frame == Some(frame) {
            return None;
        }

        let change = FrameChange {
            from: self.last_frame,
            to: frame,
        };
        self.last_frame = Some(frame);
        Some(change)
    }
}
