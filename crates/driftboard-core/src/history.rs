//! Snapshot-based undo/redo with transaction batching.

use crate::edge::Edge;
use crate::lock::Lock;
use crate::nodes::Node;
use std::collections::VecDeque;

/// Default number of undo entries kept per document.
pub const DEFAULT_HISTORY_LIMIT: usize = 30;

/// A deep copy of the structural document state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub locks: Vec<Lock>,
}

/// Undo and redo stacks for one document.
///
/// The undo stack is bounded and evicts its oldest entry on overflow. Redo is
/// unbounded but is cleared by every newly recorded action.
#[derive(Debug, Clone)]
pub struct History {
    undo: VecDeque<Snapshot>,
    redo: Vec<Snapshot>,
    limit: usize,
    /// Open transaction nesting depth.
    depth: usize,
    /// Whether the open transaction already pushed its snapshot.
    recorded: bool,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl History {
    pub fn new(limit: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            limit: limit.max(1),
            depth: 0,
            recorded: false,
        }
    }

    /// Record the pre-mutation state. Call before applying a structural change.
    ///
    /// Inside a transaction only the first call takes a snapshot; `snapshot`
    /// is not evaluated for the others.
    pub fn record_with(&mut self, snapshot: impl FnOnce() -> Snapshot) {
        if self.depth > 0 {
            if self.recorded {
                return;
            }
            self.recorded = true;
        }

        self.undo.push_back(snapshot());
        self.redo.clear();

        if self.depth == 0 {
            self.evict_overflow();
        }
    }

    /// Drop the oldest entries beyond the limit. Not called while a
    /// transaction is open.
    fn evict_overflow(&mut self) {
        while self.undo.len() > self.limit {
            self.undo.pop_front();
            log::debug!("History full, evicted oldest entry (limit {})", self.limit);
        }
    }

    pub fn begin_transaction(&mut self) {
        if self.depth == 0 {
            self.recorded = false;
        }
        self.depth += 1;
    }

    /// Close one level of transaction. When the outermost level closes and
    /// the state equals the snapshot it started from, that snapshot is
    /// dropped. Returns true if a no-op entry was discarded.
    pub fn end_transaction(&mut self, current: &Snapshot) -> bool {
        if self.depth == 0 {
            return false;
        }
        self.depth -= 1;
        if self.depth > 0 || !self.recorded {
            return false;
        }
        self.recorded = false;

        if self.undo.back() == Some(current) {
            self.undo.pop_back();
            log::debug!("Discarded no-op transaction");
            return true;
        }
        self.evict_overflow();
        false
    }

    pub fn in_transaction(&self) -> bool {
        self.depth > 0
    }

    /// Pop the latest undo entry, storing `current` for redo.
    /// Any open transaction is closed.
    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        self.abort_transaction();
        let snapshot = self.undo.pop_back()?;
        self.redo.push(current);
        Some(snapshot)
    }

    /// Pop the latest redo entry, storing `current` for undo.
    pub fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        self.abort_transaction();
        let snapshot = self.redo.pop()?;
        self.undo.push_back(current);
        self.evict_overflow();
        Some(snapshot)
    }

    fn abort_transaction(&mut self) {
        if self.depth > 0 {
            log::debug!("Transaction interrupted by undo/redo");
        }
        self.depth = 0;
        self.recorded = false;
        self.evict_overflow();
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Oldest-first view of the undo stack.
    pub fn undo_entries(&self) -> impl Iterator<Item = &Snapshot> {
        self.undo.iter()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
        self.abort_transaction();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(n: usize) -> Snapshot {
        Snapshot {
            nodes: (0..n)
                .map(|i| Node::text(i as f64, 0.0, "").with_id(format!("n{}", i)))
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_undo_redo_roundtrip() {
        let mut history = History::default();
        history.record_with(|| state(0));

        let restored = history.undo(state(1)).unwrap();
        assert_eq!(restored, state(0));
        assert!(history.can_redo());

        let again = history.redo(state(0)).unwrap();
        assert_eq!(again, state(1));
        assert!(!history.can_redo());
        assert!(history.can_undo());
    }

    #[test]
    fn test_empty_stacks() {
        let mut history = History::default();
        assert!(history.undo(state(0)).is_none());
        assert!(history.redo(state(0)).is_none());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_new_action_clears_redo() {
        let mut history = History::default();
        history.record_with(|| state(0));
        history.undo(state(1));
        assert!(history.can_redo());

        history.record_with(|| state(0));
        assert!(!history.can_redo());
    }

    #[test]
    fn test_limit_evicts_oldest() {
        let mut history = History::new(3);
        for i in 0..5 {
            history.record_with(|| state(i));
        }
        assert_eq!(history.undo_len(), 3);
        let oldest: Vec<usize> = history.undo_entries().map(|s| s.nodes.len()).collect();
        assert_eq!(oldest, vec![2, 3, 4]);
    }

    #[test]
    fn test_transaction_coalesces() {
        let mut history = History::default();
        history.begin_transaction();
        let mut calls = 0;
        for i in 0..4 {
            history.record_with(|| {
                calls += 1;
                state(i)
            });
        }
        assert!(!history.end_transaction(&state(9)));
        assert_eq!(calls, 1);
        assert_eq!(history.undo_len(), 1);
    }

    #[test]
    fn test_noop_transaction_discarded() {
        let mut history = History::default();
        history.begin_transaction();
        history.record_with(|| state(2));
        assert!(history.end_transaction(&state(2)));
        assert_eq!(history.undo_len(), 0);
    }

    #[test]
    fn test_nested_transaction_closes_once() {
        let mut history = History::default();
        history.begin_transaction();
        history.begin_transaction();
        history.record_with(|| state(0));
        history.end_transaction(&state(1));
        assert!(history.in_transaction());
        history.record_with(|| state(1));
        history.end_transaction(&state(2));
        assert!(!history.in_transaction());
        assert_eq!(history.undo_len(), 1);
    }

    #[test]
    fn test_full_history_keeps_oldest_after_noop_transaction() {
        let mut history = History::new(3);
        for i in 0..3 {
            history.record_with(|| state(i));
        }

        history.begin_transaction();
        history.record_with(|| state(3));
        assert!(history.end_transaction(&state(3)));

        let kept: Vec<usize> = history.undo_entries().map(|s| s.nodes.len()).collect();
        assert_eq!(kept, vec![0, 1, 2]);
    }

    #[test]
    fn test_full_history_evicts_when_transaction_commits() {
        let mut history = History::new(3);
        for i in 0..3 {
            history.record_with(|| state(i));
        }

        history.begin_transaction();
        history.record_with(|| state(3));
        assert_eq!(history.undo_len(), 4);
        assert!(!history.end_transaction(&state(4)));

        let kept: Vec<usize> = history.undo_entries().map(|s| s.nodes.len()).collect();
        assert_eq!(kept, vec![1, 2, 3]);
    }

    #[test]
    fn test_empty_transaction_leaves_history_alone() {
        let mut history = History::default();
        history.record_with(|| state(0));
        history.begin_transaction();
        // Matches the existing top entry, but this transaction recorded nothing.
        assert!(!history.end_transaction(&state(0)));
        assert_eq!(history.undo_len(), 1);
    }
}
