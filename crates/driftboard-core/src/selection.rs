//! Ordered node selection.
//!
//! Order matters: when linking the selection, the first entry is the source.
//! Entries are unique by construction.

use crate::nodes::NodeId;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<NodeId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ids(&self) -> &[NodeId] {
        &self.ids
    }

    pub fn first(&self) -> Option<&NodeId> {
        self.ids.first()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|s| s == id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Append if absent. Returns true if the selection changed.
    pub fn add(&mut self, id: &str) -> bool {
        if self.contains(id) {
            return false;
        }
        self.ids.push(id.to_string());
        true
    }

    /// Remove if present. Returns true if the selection changed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.ids.len();
        self.ids.retain(|s| s != id);
        self.ids.len() != before
    }

    /// Add if absent, remove if present.
    pub fn toggle(&mut self, id: &str) {
        if !self.remove(id) {
            self.add(id);
        }
    }

    /// Replace the whole selection, dropping duplicates in `ids`.
    /// Returns true if the selection changed.
    pub fn select_only<I, S>(&mut self, ids: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut next: Vec<NodeId> = Vec::new();
        for id in ids {
            let id = id.as_ref();
            if !next.iter().any(|s| s == id) {
                next.push(id.to_string());
            }
        }
        if next == self.ids {
            return false;
        }
        self.ids = next;
        true
    }

    /// Returns true if anything was cleared.
    pub fn clear(&mut self) -> bool {
        let changed = !self.ids.is_empty();
        self.ids.clear();
        changed
    }

    /// Keep only ids for which `keep` returns true. Returns true if any were dropped.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) -> bool {
        let before = self.ids.len();
        self.ids.retain(|id| keep(id));
        self.ids.len() != before
    }
}
