//! The document collection: every open canvas, the active one, and autosave.

use crate::canvas::{Canvas, CanvasDocument};
use crate::config::CanvasConfig;
use crate::events::{CanvasEvent, Listener, StoreEvent};
use crate::ids::{Clock, IdGenerator, SystemClock, UuidGenerator};
use crate::storage::{AutoSaveManager, Storage, StorageError};
use std::rc::Rc;
use std::sync::Arc;
use thiserror::Error;

#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

#[cfg(target_arch = "wasm32")]
use web_time::Instant;

/// Name given to documents created without one.
pub const UNTITLED: &str = "Untitled";

/// Document management errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Cannot delete the last remaining document")]
    LastDocument,
    #[error("Document not found: {0}")]
    DocumentNotFound(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Owns every open canvas. There is always at least one, and exactly one is active.
///
/// Commands on the active canvas go through [`edit`](Self::edit), which
/// schedules a debounced save when persisted content changed and forwards the
/// canvas's change events to subscribers.
pub struct CanvasStore<S: Storage> {
    canvases: Vec<Canvas>,
    active: usize,
    config: CanvasConfig,
    ids: Rc<dyn IdGenerator>,
    clock: Rc<dyn Clock>,
    autosave: AutoSaveManager<S>,
    listeners: Vec<Listener>,
}

impl<S: Storage> CanvasStore<S> {
    /// A store holding one fresh untitled document.
    pub fn new(storage: Arc<S>, config: CanvasConfig) -> Self {
        Self::with_collaborators(storage, config, Rc::new(UuidGenerator), Rc::new(SystemClock))
    }

    pub fn with_collaborators(
        storage: Arc<S>,
        config: CanvasConfig,
        ids: Rc<dyn IdGenerator>,
        clock: Rc<dyn Clock>,
    ) -> Self {
        let autosave = AutoSaveManager::new(storage).with_debounce(config.autosave_debounce());
        let mut store = Self {
            canvases: Vec::new(),
            active: 0,
            config,
            ids,
            clock,
            autosave,
            listeners: Vec::new(),
        };
        let first = store.new_canvas(UNTITLED);
        store.canvases.push(first);
        store
    }

    fn new_canvas(&self, name: &str) -> Canvas {
        let document = CanvasDocument::new(self.ids.next_id(), name, &*self.clock);
        self.wrap(document)
    }

    fn wrap(&self, document: CanvasDocument) -> Canvas {
        Canvas::with_collaborators(document, self.config.clone(), self.ids.clone(), self.clock.clone())
    }

    /// Replace the session with every document in storage.
    ///
    /// Documents that fail to load are skipped with a warning. When storage
    /// holds nothing loadable the current documents are kept. Returns how
    /// many documents were loaded.
    pub async fn load_from_storage(&mut self) -> StoreResult<usize> {
        let ids = self.autosave.list_documents().await?;
        let mut documents = Vec::new();
        for id in ids {
            match self.autosave.load(&id).await {
                Ok(document) => documents.push(document),
                Err(e) => log::warn!("Skipping document {}: {}", id, e),
            }
        }
        if documents.is_empty() {
            log::info!("No stored documents, keeping current session");
            return Ok(0);
        }

        documents.sort_by(|a, b| {
            a.metadata
                .created
                .cmp(&b.metadata.created)
                .then_with(|| a.id.cmp(&b.id))
        });
        let count = documents.len();
        self.canvases = documents.into_iter().map(|doc| self.wrap(doc)).collect();
        self.active = 0;
        log::info!("Loaded {} documents", count);

        let active_id = self.active_id().to_string();
        self.dispatch(&active_id, &[CanvasEvent::DocumentsChanged, CanvasEvent::ActiveDocumentChanged]);
        Ok(count)
    }

    // --- Queries ---

    pub fn active(&self) -> &Canvas {
        &self.canvases[self.active]
    }

    pub fn active_id(&self) -> &str {
        self.active().id()
    }

    pub fn canvas(&self, id: &str) -> Option<&Canvas> {
        self.canvases.iter().find(|c| c.id() == id)
    }

    /// Every document, in display order.
    pub fn documents(&self) -> impl Iterator<Item = &CanvasDocument> {
        self.canvases.iter().map(Canvas::document)
    }

    pub fn len(&self) -> usize {
        self.canvases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.canvases.is_empty()
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn autosave(&self) -> &AutoSaveManager<S> {
        &self.autosave
    }

    // --- Observers ---

    pub fn subscribe(&mut self, listener: impl FnMut(&StoreEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn dispatch(&mut self, document_id: &str, events: &[CanvasEvent]) {
        for &event in events {
            let store_event = StoreEvent {
                document_id: document_id.to_string(),
                event,
            };
            for listener in &mut self.listeners {
                listener(&store_event);
            }
        }
    }

    /// Drain a canvas's events, schedule its save if needed, and notify.
    fn settle(&mut self, index: usize, now: Instant) {
        let canvas = &mut self.canvases[index];
        let events = canvas.take_events();
        if events.is_empty() {
            return;
        }
        let id = canvas.id().to_string();
        if events.iter().any(|e| e.is_persistent()) {
            self.autosave.schedule_at(&id, now);
        }
        self.dispatch(&id, &events);
    }

    // --- Commands ---

    /// Run a command against the active canvas.
    pub fn edit<R>(&mut self, command: impl FnOnce(&mut Canvas) -> R) -> R {
        self.edit_at(Instant::now(), command)
    }

    /// [`edit`](Self::edit) with an explicit time for the autosave debounce.
    pub fn edit_at<R>(&mut self, now: Instant, command: impl FnOnce(&mut Canvas) -> R) -> R {
        let index = self.active;
        let result = command(&mut self.canvases[index]);
        self.settle(index, now);
        result
    }

    /// Create a document, make it active and return its id.
    pub fn create_document(&mut self, name: &str) -> String {
        let name = if name.trim().is_empty() { UNTITLED } else { name };
        let canvas = self.new_canvas(name);
        let id = canvas.id().to_string();
        self.canvases.push(canvas);
        self.active = self.canvases.len() - 1;
        self.autosave.schedule(&id);
        self.dispatch(&id, &[CanvasEvent::DocumentsChanged, CanvasEvent::ActiveDocumentChanged]);
        id
    }

    pub fn rename_document(&mut self, id: &str, name: &str) -> StoreResult<bool> {
        let index = self.index_of(id)?;
        let renamed = self.canvases[index].rename(name);
        self.settle(index, Instant::now());
        Ok(renamed)
    }

    /// Switch the active document. Returns false for an unknown id.
    pub fn set_active(&mut self, id: &str) -> bool {
        let Some(index) = self.canvases.iter().position(|c| c.id() == id) else {
            return false;
        };
        if index != self.active {
            self.active = index;
            self.dispatch(id, &[CanvasEvent::ActiveDocumentChanged]);
        }
        true
    }

    /// Delete a document from the session and from storage.
    ///
    /// The last remaining document cannot be deleted. If the active document
    /// goes, its neighbour becomes active.
    pub async fn delete_document(&mut self, id: &str) -> StoreResult<()> {
        let index = self.index_of(id)?;
        if self.canvases.len() == 1 {
            log::warn!("Refusing to delete the last document {}", id);
            return Err(StoreError::LastDocument);
        }

        self.canvases.remove(index);
        let active_changed = index <= self.active;
        if index < self.active || self.active >= self.canvases.len() {
            self.active -= 1;
        }
        self.autosave.cancel(id);

        self.dispatch(id, &[CanvasEvent::DocumentsChanged]);
        if active_changed {
            let active_id = self.active_id().to_string();
            self.dispatch(&active_id, &[CanvasEvent::ActiveDocumentChanged]);
        }

        self.autosave.delete(id).await?;
        Ok(())
    }

    fn index_of(&self, id: &str) -> StoreResult<usize> {
        self.canvases
            .iter()
            .position(|c| c.id() == id)
            .ok_or_else(|| StoreError::DocumentNotFound(id.to_string()))
    }

    // --- Persistence ---

    /// Save every pending document if the debounce period has elapsed.
    /// Returns how many documents were written.
    pub async fn poll_autosave_at(&mut self, now: Instant) -> StoreResult<usize> {
        let due = self.autosave.take_due_at(now);
        self.save_documents(due).await
    }

    pub async fn poll_autosave(&mut self) -> StoreResult<usize> {
        self.poll_autosave_at(Instant::now()).await
    }

    /// Save every pending document now.
    pub async fn flush(&mut self) -> StoreResult<usize> {
        let pending = self.autosave.take_pending();
        self.save_documents(pending).await
    }

    /// Failed saves go back on the dirty list without a deadline and the
    /// first error is returned; in-memory state is untouched either way.
    async fn save_documents(&mut self, ids: Vec<String>) -> StoreResult<usize> {
        let mut saved = 0;
        let mut first_error: Option<StorageError> = None;

        for id in ids {
            let Some(document) = self.canvas(&id).map(Canvas::snapshot_document) else {
                continue;
            };
            match self.autosave.save(&document).await {
                Ok(()) => saved += 1,
                Err(e) => {
                    log::warn!("Autosave of {} failed: {}", id, e);
                    self.autosave.requeue_failed(&id);
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(saved),
        }
    }
}
