//! Driftboard Core Library
//!
//! Platform-agnostic canvas state and spatial interaction engine for the
//! Driftboard whiteboard: the document model, undo/redo history, node locking,
//! snapping and alignment, filtering, and the persistence bridge.

pub mod canvas;
pub mod color;
pub mod config;
pub mod edge;
pub mod events;
pub mod filter;
pub mod geometry;
pub mod history;
pub mod ids;
pub mod lock;
pub mod nodes;
pub mod selection;
pub mod snap;
pub mod storage;
pub mod store;
pub mod viewport;

pub use canvas::{Canvas, CanvasDocument, CanvasMetadata, DragFeedback};
pub use color::CanvasColor;
pub use config::CanvasConfig;
pub use edge::{Edge, EdgeEnd, EdgeId};
pub use events::{CanvasEvent, StoreEvent};
pub use filter::{NodeFilter, RenderNode};
pub use history::{History, Snapshot};
pub use ids::{Clock, FixedClock, IdGenerator, SequentialIds, SystemClock, UuidGenerator};
pub use lock::{Lock, LockId};
pub use nodes::{FileNode, GroupNode, LinkNode, Node, NodeId, NodeKind, Side, TextNode};
pub use selection::Selection;
pub use snap::{Alignment, EdgeSnap, Guide, GuideAxis, SNAP_THRESHOLD};
pub use store::{CanvasStore, StoreError, StoreResult};
pub use viewport::{MAX_ZOOM, MIN_ZOOM, Viewport};
