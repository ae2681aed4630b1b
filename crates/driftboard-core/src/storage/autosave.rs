//! Debounced document persistence.
//!
//! Every mutation reschedules the write, so a burst of edits produces one
//! save per quiet period. Time is passed in by the caller: the manager never
//! spawns timers of its own.

use crate::canvas::CanvasDocument;
use crate::storage::{Storage, StorageResult};
use std::sync::Arc;

#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

#[cfg(target_arch = "wasm32")]
use web_time::{Duration, Instant};

/// Default quiet period before a pending save is written.
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Tracks which documents have unsaved changes and when they are due.
pub struct AutoSaveManager<S: Storage> {
    storage: Arc<S>,
    debounce: Duration,
    /// When the pending documents become due. `None` means nothing is scheduled.
    deadline: Option<Instant>,
    /// Documents with unsaved changes, in first-dirtied order.
    pending: Vec<String>,
    last_save: Option<Instant>,
}

impl<S: Storage> AutoSaveManager<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            storage,
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            deadline: None,
            pending: Vec::new(),
            last_save: None,
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Mark a document dirty and restart the quiet period from `now`.
    pub fn schedule_at(&mut self, document_id: &str, now: Instant) {
        if !self.pending.iter().any(|id| id == document_id) {
            self.pending.push(document_id.to_string());
        }
        self.deadline = Some(now + self.debounce);
    }

    pub fn schedule(&mut self, document_id: &str) {
        self.schedule_at(document_id, Instant::now());
    }

    /// Whether any document has unsaved changes.
    pub fn is_dirty(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn is_pending(&self, document_id: &str) -> bool {
        self.pending.iter().any(|id| id == document_id)
    }

    /// Whether a scheduled save has passed its quiet period.
    pub fn is_due_at(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }

    /// If due, take every pending id and clear the schedule.
    pub fn take_due_at(&mut self, now: Instant) -> Vec<String> {
        if !self.is_due_at(now) {
            return Vec::new();
        }
        self.take_pending()
    }

    /// Take every pending id regardless of the deadline.
    pub fn take_pending(&mut self) -> Vec<String> {
        self.deadline = None;
        std::mem::take(&mut self.pending)
    }

    /// Put a document whose save failed back on the dirty list.
    ///
    /// No deadline is set: the write is retried only once a later mutation
    /// reschedules it.
    pub fn requeue_failed(&mut self, document_id: &str) {
        if !self.is_pending(document_id) {
            self.pending.push(document_id.to_string());
        }
    }

    /// Drop a document from the dirty list (e.g. it was deleted).
    pub fn cancel(&mut self, document_id: &str) {
        self.pending.retain(|id| id != document_id);
        if self.pending.is_empty() {
            self.deadline = None;
        }
    }

    /// Write a document now.
    pub async fn save(&mut self, document: &CanvasDocument) -> StorageResult<()> {
        self.storage.save(&document.id, document).await?;
        self.last_save = Some(Instant::now());
        log::info!("Saved document {} ({} nodes)", document.id, document.nodes.len());
        Ok(())
    }

    pub fn last_save(&self) -> Option<Instant> {
        self.last_save
    }

    pub async fn load(&self, id: &str) -> StorageResult<CanvasDocument> {
        self.storage.load(id).await
    }

    pub async fn delete(&self, id: &str) -> StorageResult<()> {
        self.storage.delete(id).await
    }

    pub async fn list_documents(&self) -> StorageResult<Vec<String>> {
        self.storage.list().await
    }

    pub async fn exists(&self, id: &str) -> StorageResult<bool> {
        self.storage.exists(id).await
    }

    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use crate::ids::FixedClock;
    use crate::storage::{MemoryStorage, block_on};

    fn manager() -> AutoSaveManager<MemoryStorage> {
        AutoSaveManager::new(Arc::new(MemoryStorage::new()))
    }

    #[test]
    fn test_nothing_scheduled() {
        let manager = manager();
        assert!(!manager.is_dirty());
        assert!(!manager.is_due_at(Instant::now()));
    }

    #[test]
    fn test_debounce_resets_on_each_schedule() {
        let mut manager = manager();
        let t0 = Instant::now();
        manager.schedule_at("a", t0);
        manager.schedule_at("a", t0 + Duration::from_millis(400));

        assert!(!manager.is_due_at(t0 + Duration::from_millis(600)));
        assert!(manager.is_due_at(t0 + Duration::from_millis(900)));
    }

    #[test]
    fn test_burst_collapses_to_one_entry() {
        let mut manager = manager();
        let t0 = Instant::now();
        for i in 0..10 {
            manager.schedule_at("a", t0 + Duration::from_millis(i * 10));
        }
        manager.schedule_at("b", t0 + Duration::from_millis(100));

        let due = manager.take_due_at(t0 + Duration::from_secs(1));
        assert_eq!(due, vec!["a".to_string(), "b".to_string()]);
        assert!(!manager.is_dirty());
        assert!(manager.take_due_at(t0 + Duration::from_secs(2)).is_empty());
    }

    #[test]
    fn test_requeue_waits_for_next_schedule() {
        let mut manager = manager();
        let t0 = Instant::now();
        manager.requeue_failed("a");
        assert!(manager.is_dirty());
        assert!(!manager.is_due_at(t0 + Duration::from_secs(60)));

        manager.schedule_at("b", t0);
        let due = manager.take_due_at(t0 + Duration::from_secs(1));
        assert_eq!(due, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_cancel() {
        let mut manager = manager();
        let t0 = Instant::now();
        manager.schedule_at("a", t0);
        manager.cancel("a");
        assert!(!manager.is_dirty());
        assert!(!manager.is_due_at(t0 + Duration::from_secs(1)));
    }

    #[test]
    fn test_save_writes_to_storage() {
        let mut manager = manager();
        let doc = CanvasDocument::new("doc", "Doc", &FixedClock("2024-01-01T00:00:00Z".to_string()));

        block_on(manager.save(&doc)).unwrap();
        assert!(manager.last_save().is_some());
        assert!(block_on(manager.exists("doc")).unwrap());
        assert_eq!(block_on(manager.load("doc")).unwrap(), doc);
        assert_eq!(block_on(manager.list_documents()).unwrap(), vec!["doc".to_string()]);
    }
}
