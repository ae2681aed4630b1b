//! Change notifications for the presentation layer.

/// What part of a canvas (or the document set) changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanvasEvent {
    NodesChanged,
    EdgesChanged,
    LocksChanged,
    SelectionChanged,
    ViewportChanged,
    FilterChanged,
    HistoryChanged,
    /// A document was created, renamed or deleted.
    DocumentsChanged,
    ActiveDocumentChanged,
}

impl CanvasEvent {
    /// Whether the change touches persisted document content.
    ///
    /// Selection, filter and history state are session-only.
    pub fn is_persistent(self) -> bool {
        matches!(
            self,
            CanvasEvent::NodesChanged
                | CanvasEvent::EdgesChanged
                | CanvasEvent::LocksChanged
                | CanvasEvent::ViewportChanged
                | CanvasEvent::DocumentsChanged
        )
    }
}

/// An event tagged with the document it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreEvent {
    pub document_id: String,
    pub event: CanvasEvent,
}

/// Observer callback registered on a store.
pub type Listener = Box<dyn FnMut(&StoreEvent)>;

/// Events queued during a command, deduplicated, in first-seen order.
#[derive(Debug, Clone, Default)]
pub(crate) struct EventQueue {
    pending: Vec<CanvasEvent>,
}

impl EventQueue {
    pub(crate) fn push(&mut self, event: CanvasEvent) {
        if !self.pending.contains(&event) {
            self.pending.push(event);
        }
    }

    pub(crate) fn drain(&mut self) -> Vec<CanvasEvent> {
        std::mem::take(&mut self.pending)
    }
}
