//! Undo/redo history for polygon editing.
//!
//! The history is a bounded dual stack of immutable collection snapshots,
//! recorded once per completed user operation (a vertex commit, a deletion,
//! a slice, a creation), never per pointer-move. Undo and redo exchange the
//! current state with the top of the opposite stack, so an undo followed by
//! a redo restores the exact prior state. Recording after an undo discards
//! the redo branch: history is linear.

use crate::constants::DEFAULT_HISTORY_DEPTH;
use crate::store::Snapshot;

/// Configuration for the history stack.
#[derive(Debug, Clone)]
pub struct HistoryConfig {
    /// Maximum number of snapshots to keep; oldest entries drop first.
    pub max_depth: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_HISTORY_DEPTH,
        }
    }
}

/// Bounded undo/redo stack of collection snapshots.
#[derive(Debug, Clone, Default)]
pub struct History {
    /// States preceding the current one, most recent last.
    undo_stack: Vec<Snapshot>,
    /// States undone from, most recent last.
    redo_stack: Vec<Snapshot>,
    config: HistoryConfig,
}

impl History {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom configuration.
    pub fn with_config(config: HistoryConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Record the state that a completed operation replaced.
    /// This clears the redo stack (no branching).
    pub fn record(&mut self, before: Snapshot) {
        self.undo_stack.push(before);
        self.redo_stack.clear();

        while self.undo_stack.len() > self.config.max_depth {
            self.undo_stack.remove(0);
        }
        log::debug!(
            "history: recorded snapshot ({} undoable)",
            self.undo_stack.len()
        );
    }

    /// Check if undo is available.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Step back: returns the snapshot to restore, moving `current` onto
    /// the redo stack. `None` when there is nothing to undo.
    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let previous = self.undo_stack.pop()?;
        self.redo_stack.push(current);
        log::debug!("history: undo ({} redoable)", self.redo_stack.len());
        Some(previous)
    }

    /// Step forward: returns the snapshot to restore, moving `current`
    /// onto the undo stack. `None` when there is nothing to redo.
    pub fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push(current);
        log::debug!("history: redo ({} undoable)", self.undo_stack.len());
        Some(next)
    }

    /// Drop all history (reload path: the collection baseline changed).
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Number of undoable snapshots.
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    /// Number of redoable snapshots.
    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Point, Polygon};

    fn state(tag: f64) -> Snapshot {
        Snapshot {
            polygons: vec![Polygon::external(vec![
                Point::new(tag, 0.0),
                Point::new(tag + 1.0, 0.0),
                Point::new(tag, 1.0),
            ])],
            selected_id: None,
        }
    }

    #[test]
    fn test_undo_redo_round_trip() {
        let mut history = History::new();
        let s0 = state(0.0);
        let s1 = state(1.0);

        // An operation moved the state from s0 to s1
        history.record(s0.clone());

        let restored = history.undo(s1.clone()).unwrap();
        assert_eq!(restored, s0);

        let replayed = history.redo(restored).unwrap();
        assert_eq!(replayed, s1);
    }

    #[test]
    fn test_empty_stacks_return_none() {
        let mut history = History::new();
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert!(history.undo(state(0.0)).is_none());
        assert!(history.redo(state(0.0)).is_none());
    }

    #[test]
    fn test_record_discards_redo_branch() {
        let mut history = History::new();
        history.record(state(0.0));
        let _ = history.undo(state(1.0));
        assert!(history.can_redo());

        history.record(state(2.0));
        assert!(!history.can_redo());
        assert_eq!(history.undo_count(), 1);
    }

    #[test]
    fn test_bounded_depth_drops_oldest() {
        let mut history = History::with_config(HistoryConfig { max_depth: 3 });
        for i in 0..5 {
            history.record(state(i as f64));
        }
        assert_eq!(history.undo_count(), 3);

        // The oldest surviving snapshot is state(2)
        let mut last = None;
        let mut current = state(5.0);
        while let Some(s) = history.undo(current.clone()) {
            last = Some(s.clone());
            current = s;
        }
        assert_eq!(last, Some(state(2.0)));
    }

    #[test]
    fn test_multiple_undo_redo_sequence() {
        let mut history = History::new();
        let states: Vec<Snapshot> = (0..4).map(|i| state(i as f64)).collect();
        for s in &states[..3] {
            history.record(s.clone());
        }

        // Walk all the way back from states[3]
        let mut current = states[3].clone();
        for expected in states[..3].iter().rev() {
            current = history.undo(current).unwrap();
            assert_eq!(&current, expected);
        }

        // And all the way forward again
        for expected in &states[1..] {
            current = history.redo(current).unwrap();
            assert_eq!(&current, expected);
        }
        assert!(!history.can_redo());
    }

    #[test]
    fn test_clear() {
        let mut history = History::new();
        history.record(state(0.0));
        let _ = history.undo(state(1.0));
        history.clear();
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }
}
