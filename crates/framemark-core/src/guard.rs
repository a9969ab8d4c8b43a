//! Re-entrancy guard for the live scene.
//!
//! Only one of "hydrating from storage" and "writing to storage" may be in
//! flight at a time. Saves requested while a load is outstanding are refused
//! so programmatic hydration is never mistaken for a user edit.

use thiserror::Error;

/// What is currently happening to the live scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncState {
    #[default]
    Idle,
    Loading,
    Saving,
}

/// A transition the guard does not allow.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("Illegal scene guard transition from {from:?} to {to:?}")]
pub struct GuardError {
    pub from: SyncState,
    pub to: SyncState,
}

/// Checked state machine over [`SyncState`].
#[derive(Debug, Clone, Default)]
pub struct SyncGuard {
    state: SyncState,
}

impl SyncGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == SyncState::Idle
    }

    pub fn is_loading(&self) -> bool {
        self.state == SyncState::Loading
    }

    /// Enter `Loading`. Re-entering while already loading retargets the load.
    pub fn begin_load(&mut self) -> Result<(), GuardError> {
        self.transition(SyncState::Loading)
    }

    /// Leave `Loading`.
    pub fn finish_load(&mut self) -> Result<(), GuardError> {
        self.leave(SyncState::Loading)
    }

    /// Enter `Saving`. Refused while a load or another save is in progress.
    pub fn begin_save(&mut self) -> Result<(), GuardError> {
        self.transition(SyncState::Saving)
    }

    /// Leave `Saving`.
    pub fn finish_save(&mut self) -> Result<(), GuardError> {
        self.leave(SyncState::Saving)
    }

    /// Force the guard back to `Idle`, abandoning whatever was in flight.
    pub fn reset(&mut self) {
        self.state = SyncState::Idle;
    }

    fn transition(&mut self, to: SyncState) -> Result<(), GuardError> {
        let allowed = matches!(
            (self.state, to),
            (SyncState::Idle, SyncState::Loading)
                | (SyncState::Loading, SyncState::Loading)
                | (SyncState::Idle, SyncState::Saving)
        );
        if !allowed {
            return Err(GuardError {
                from: self.state,
                to,
            });
        }
        self.state = to;
        Ok(())
    }

    fn leave(&mut self, expected: SyncState) -> Result<(), GuardError> {
        if self.state != expected {
            return Err(GuardError {
                from: self.state,
                to: SyncState::Idle,
            });
        }
        self.state = SyncState::Idle;
        Ok(())
    }
}
