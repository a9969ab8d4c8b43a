//! Bounded linear undo/redo over serialized scene snapshots.

use crate::scene::SerializedScene;
use std::collections::VecDeque;

/// Default maximum number of undo states to keep.
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// Undo and redo stacks of scene snapshots.
///
/// Callers push the state *before* a change; `undo` trades the current state
/// for the most recent snapshot and `redo` reverses that trade.
#[derive(Debug, Clone)]
pub struct History {
    undo_stack: VecDeque<SerializedScene>,
    redo_stack: Vec<SerializedScene>,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl History {
    /// Create an empty history keeping at most `limit` undo states.
    pub fn new(limit: usize) -> Self {
        Self {
            undo_stack: VecDeque::with_capacity(limit),
            redo_stack: Vec::new(),
            limit,
        }
    }

    /// Record a state for undo and invalidate redo.
    pub fn snapshot(&mut self, state: SerializedScene) {
        self.undo_stack.push_back(state);
        self.redo_stack.clear();

        while self.undo_stack.len() > self.limit {
            self.undo_stack.pop_front();
        }
    }

    /// Swap `current` for the previous state.
    /// Returns the state to restore, or `None` if there is nothing to undo.
    pub fn undo(&mut self, current: SerializedScene) -> Option<SerializedScene> {
        let previous = self.undo_stack.pop_back()?;
        self.redo_stack.push(current);
        Some(previous)
    }

    /// Swap `current` for the next state.
    /// Returns the state to restore, or `None` if there is nothing to redo.
    pub fn redo(&mut self, current: SerializedScene) -> Option<SerializedScene> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push_back(current);
        while self.undo_stack.len() > self.limit {
            self.undo_stack.pop_front();
        }
        Some(next)
    }

    /// Drop every recorded state.
    pub fn reset(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(n: usize) -> SerializedScene {
        SerializedScene::from_raw(format!("state-{n}"))
    }

    #[test]
    fn test_undo_redo_cycle() {
        let mut history = History::default();
        history.snapshot(state(0));

        assert_eq!(history.undo(state(1)), Some(state(0)));
        assert!(!history.can_undo());
        assert!(history.can_redo());

        assert_eq!(history.redo(state(0)), Some(state(1)));
        assert!(history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_empty_stacks_are_noops() {
        let mut history = History::default();
        assert_eq!(history.undo(state(0)), None);
        assert_eq!(history.redo(state(0)), None);
        assert_eq!(history.redo_depth(), 0);
    }

    #[test]
    fn test_limit_drops_oldest() {
        let mut history = History::new(20);
        for n in 0..25 {
            history.snapshot(state(n));
        }
        assert_eq!(history.undo_depth(), 20);

        let mut current = state(25);
        let mut restored = Vec::new();
        while let Some(previous) = history.undo(current.clone()) {
            restored.push(previous.clone());
            current = previous;
        }
        assert_eq!(restored.len(), 20);
        assert_eq!(restored.last(), Some(&state(5)));
    }

    #[test]
    fn test_snapshot_clears_redo() {
        let mut history = History::default();
        history.snapshot(state(0));
        history.undo(state(1));
        assert!(history.can_redo());

        history.snapshot(state(0));
        assert!(!history.can_redo());
        assert_eq!(history.redo(state(2)), None);
    }

    #[test]
    fn test_reset() {
        let mut history = History::default();
        history.snapshot(state(0));
        history.snapshot(state(1));
        history.undo(state(2));
        history.reset();
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }
}
