//! Canvas document and state management.

use crate::color::CanvasColor;
use crate::config::CanvasConfig;
use crate::edge::{Edge, EdgeId};
use crate::events::{CanvasEvent, EventQueue};
use crate::filter::{NodeFilter, RenderNode, hashtag_vocabulary, renderable_nodes, visible_nodes};
use crate::geometry::{bounding_box, intersects};
use crate::history::{History, Snapshot};
use crate::ids::{Clock, IdGenerator, SystemClock, UuidGenerator};
use crate::lock::{Lock, LockId, has_equivalent, locked_cluster};
use crate::nodes::{Node, NodeId, NodeKind, Side, TextNode};
use crate::selection::Selection;
use crate::snap::{EdgeSnap, Guide, calculate_alignments, detect_edge_snap};
use crate::viewport::Viewport;
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::rc::Rc;

/// Name, creation and last-modified timestamps (ISO-8601).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasMetadata {
    pub name: String,
    pub created: String,
    pub modified: String,
}

/// The persisted part of a canvas.
///
/// Node order is z-order, back to front. Group nodes are inserted ahead of
/// the nodes they frame so they render behind them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasDocument {
    pub id: String,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locks: Vec<Lock>,
    #[serde(default)]
    pub viewport: Viewport,
    pub metadata: CanvasMetadata,
}

impl CanvasDocument {
    /// Create an empty document stamped with the clock's current time.
    pub fn new(id: impl Into<String>, name: impl Into<String>, clock: &dyn Clock) -> Self {
        let now = clock.now_iso8601();
        Self {
            id: id.into(),
            nodes: Vec::new(),
            edges: Vec::new(),
            locks: Vec::new(),
            viewport: Viewport::default(),
            metadata: CanvasMetadata {
                name: name.into(),
                created: now.clone(),
                modified: now,
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Serialize the document to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    /// Bounding box of all nodes.
    pub fn bounds(&self) -> Option<Rect> {
        bounding_box(&self.nodes)
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
            locks: self.locks.clone(),
        }
    }
}

/// Position of a node when the drag started.
#[derive(Debug, Clone)]
struct DragOrigin {
    id: NodeId,
    origin: Point,
}

#[derive(Debug, Clone)]
struct DragState {
    anchor: NodeId,
    origins: Vec<DragOrigin>,
    /// Edge snap found by the latest `drag_to`.
    snap: Option<EdgeSnap>,
}

/// Visual feedback for one drag step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DragFeedback {
    pub guides: Vec<Guide>,
    /// Lock candidate; becomes a lock when the drag ends here.
    pub snap: Option<EdgeSnap>,
}

/// A document being edited: the document plus selection, filters and history.
///
/// Every command returns whether (or how much) it changed. Commands that
/// target a missing node or edge are no-ops, and out-of-range sizes and zoom
/// levels are clamped, so callers never need to handle errors here.
#[derive(Debug)]
pub struct Canvas {
    document: CanvasDocument,
    history: History,
    selection: Selection,
    filter: NodeFilter,
    config: CanvasConfig,
    ids: Rc<dyn IdGenerator>,
    clock: Rc<dyn Clock>,
    drag: Option<DragState>,
    events: EventQueue,
}

impl Canvas {
    /// Wrap a document using random ids and the system clock.
    pub fn new(document: CanvasDocument, config: CanvasConfig) -> Self {
        Self::with_collaborators(document, config, Rc::new(UuidGenerator), Rc::new(SystemClock))
    }

    pub fn with_collaborators(
        document: CanvasDocument,
        config: CanvasConfig,
        ids: Rc<dyn IdGenerator>,
        clock: Rc<dyn Clock>,
    ) -> Self {
        Self {
            document,
            history: History::new(config.history_limit),
            selection: Selection::new(),
            filter: NodeFilter::new(),
            config,
            ids,
            clock,
            drag: None,
            events: EventQueue::default(),
        }
    }

    // --- Queries ---

    pub fn id(&self) -> &str {
        &self.document.id
    }

    pub fn document(&self) -> &CanvasDocument {
        &self.document
    }

    /// A detached copy for persistence.
    pub fn snapshot_document(&self) -> CanvasDocument {
        self.document.clone()
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn nodes(&self) -> &[Node] {
        &self.document.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.document.edges
    }

    pub fn locks(&self) -> &[Lock] {
        &self.document.locks
    }

    pub fn viewport(&self) -> &Viewport {
        &self.document.viewport
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn filter(&self) -> &NodeFilter {
        &self.filter
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.document.node(id)
    }

    pub fn visible_nodes(&self) -> Vec<&Node> {
        visible_nodes(&self.document.nodes, &self.filter)
    }

    pub fn renderable_nodes(&self) -> Vec<RenderNode<'_>> {
        renderable_nodes(&self.document.nodes, &self.document.locks, &self.filter)
    }

    /// Edges whose endpoints both exist.
    pub fn renderable_edges(&self) -> Vec<&Edge> {
        self.document
            .edges
            .iter()
            .filter(|e| self.document.node(&e.from_node).is_some() && self.document.node(&e.to_node).is_some())
            .collect()
    }

    pub fn hashtags(&self) -> Vec<String> {
        hashtag_vocabulary(&self.document.nodes)
    }

    pub fn locked_cluster(&self, id: &str) -> Vec<NodeId> {
        locked_cluster(&self.document.locks, id)
    }

    /// Topmost renderable node under a plane-space point.
    pub fn node_at_point(&self, point: Point) -> Option<&Node> {
        self.renderable_nodes()
            .into_iter()
            .rev()
            .map(|r| r.node)
            .find(|node| node.hit_test(point))
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_len(&self) -> usize {
        self.history.undo_len()
    }

    pub fn redo_len(&self) -> usize {
        self.history.redo_len()
    }

    pub fn in_transaction(&self) -> bool {
        self.history.in_transaction()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Take the change notifications queued since the last call.
    pub fn take_events(&mut self) -> Vec<CanvasEvent> {
        self.events.drain()
    }

    // --- Internal helpers ---

    /// Push the pre-mutation state onto the undo stack.
    fn record(&mut self) {
        let document = &self.document;
        self.history.record_with(|| document.snapshot());
        self.events.push(CanvasEvent::HistoryChanged);
    }

    fn touch(&mut self) {
        self.document.metadata.modified = self.clock.now_iso8601();
    }

    /// Drop selected ids that are no longer renderable.
    fn prune_selection(&mut self) {
        let keep: HashSet<&str> = renderable_nodes(&self.document.nodes, &self.document.locks, &self.filter)
            .into_iter()
            .map(|r| r.node.id.as_str())
            .collect();
        if self.selection.retain(|id| keep.contains(id)) {
            self.events.push(CanvasEvent::SelectionChanged);
        }
    }

    /// Existing seed nodes plus everything locked to them, each once.
    fn expand_clusters<I, S>(&self, seeds: I) -> Vec<NodeId>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen: HashSet<NodeId> = HashSet::new();
        let mut members = Vec::new();
        for seed in seeds {
            let seed = seed.as_ref();
            if seen.contains(seed) || self.document.node(seed).is_none() {
                continue;
            }
            for member in locked_cluster(&self.document.locks, seed) {
                if self.document.node(&member).is_some() && seen.insert(member.clone()) {
                    members.push(member);
                }
            }
        }
        members
    }

    fn set_positions(&mut self, targets: &[(NodeId, Point)]) -> bool {
        let changed = targets
            .iter()
            .any(|(id, p)| self.document.node(id).is_some_and(|n| n.position() != *p));
        if !changed {
            return false;
        }

        self.record();
        for (id, p) in targets {
            if let Some(index) = self.document.node_index(id) {
                let node = &mut self.document.nodes[index];
                node.x = p.x;
                node.y = p.y;
            }
        }
        self.touch();
        self.events.push(CanvasEvent::NodesChanged);
        true
    }

    // --- Transactions ---

    /// Open a transaction: the mutations until the matching
    /// [`end_transaction`](Self::end_transaction) form one undo step.
    pub fn begin_transaction(&mut self) {
        self.history.begin_transaction();
    }

    pub fn end_transaction(&mut self) {
        if !self.history.in_transaction() {
            return;
        }
        let current = self.document.snapshot();
        if self.history.end_transaction(&current) {
            self.events.push(CanvasEvent::HistoryChanged);
        }
    }

    // --- History ---

    pub fn undo(&mut self) -> bool {
        self.drag = None;
        let current = self.document.snapshot();
        let Some(snapshot) = self.history.undo(current) else {
            return false;
        };
        self.restore(snapshot);
        true
    }

    pub fn redo(&mut self) -> bool {
        self.drag = None;
        let current = self.document.snapshot();
        let Some(snapshot) = self.history.redo(current) else {
            return false;
        };
        self.restore(snapshot);
        true
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.document.nodes = snapshot.nodes;
        self.document.edges = snapshot.edges;
        self.document.locks = snapshot.locks;
        self.touch();
        self.events.push(CanvasEvent::NodesChanged);
        self.events.push(CanvasEvent::EdgesChanged);
        self.events.push(CanvasEvent::LocksChanged);
        self.events.push(CanvasEvent::HistoryChanged);
        self.prune_selection();
    }

    // --- Nodes ---

    /// Add a node. Groups go to the back; other nodes go on top.
    /// A node whose id is already taken is ignored.
    pub fn add_node(&mut self, node: Node) -> bool {
        if self.document.node(&node.id).is_some() {
            log::debug!("Ignoring node with duplicate id {}", node.id);
            return false;
        }

        self.record();
        if node.is_group() {
            self.document.nodes.insert(0, node);
        } else {
            self.document.nodes.push(node);
        }
        self.touch();
        self.events.push(CanvasEvent::NodesChanged);
        true
    }

    /// Add several nodes as one undo step. Returns how many were added.
    pub fn add_nodes(&mut self, nodes: impl IntoIterator<Item = Node>) -> usize {
        self.begin_transaction();
        let mut added = 0;
        for node in nodes {
            if self.add_node(node) {
                added += 1;
            }
        }
        self.end_transaction();
        added
    }

    /// Create a node with a generated id and the configured default size.
    pub fn create_node(&mut self, x: f64, y: f64, kind: NodeKind) -> NodeId {
        let id = self.ids.next_id();
        let node = Node::new(x, y, kind)
            .with_id(id.clone())
            .with_size(self.config.default_node_width, self.config.default_node_height);
        self.add_node(node);
        id
    }

    pub fn create_text_node(&mut self, x: f64, y: f64, text: impl Into<String>) -> NodeId {
        self.create_node(x, y, NodeKind::Text(TextNode::new(text)))
    }

    /// Edit a node in place. The id cannot be changed.
    ///
    /// A position change is applied to the node's whole lock cluster in the
    /// same undo step.
    pub fn update_node(&mut self, id: &str, update: impl FnOnce(&mut Node)) -> bool {
        let Some(index) = self.document.node_index(id) else {
            log::debug!("update_node: no node {}", id);
            return false;
        };

        let original = &self.document.nodes[index];
        let mut updated = original.clone();
        update(&mut updated);
        updated.id = original.id.clone();
        if updated == *original {
            return false;
        }
        let (dx, dy) = (updated.x - original.x, updated.y - original.y);

        self.record();
        self.document.nodes[index] = updated;
        if dx != 0.0 || dy != 0.0 {
            let followers: HashSet<NodeId> = locked_cluster(&self.document.locks, id)
                .into_iter()
                .filter(|member| member != id)
                .collect();
            for node in self.document.nodes.iter_mut().filter(|n| followers.contains(&n.id)) {
                node.translate(dx, dy);
            }
        }
        self.touch();
        self.events.push(CanvasEvent::NodesChanged);
        true
    }

    /// Translate a node together with its whole lock cluster.
    pub fn move_node(&mut self, id: &str, dx: f64, dy: f64) -> bool {
        self.move_nodes([id], dx, dy)
    }

    /// Translate several nodes and their clusters by the same delta.
    /// Each node moves once even if reachable from several seeds.
    pub fn move_nodes<I, S>(&mut self, ids: I, dx: f64, dy: f64) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if dx == 0.0 && dy == 0.0 {
            return false;
        }
        let moving: HashSet<NodeId> = self.expand_clusters(ids).into_iter().collect();
        if moving.is_empty() {
            return false;
        }

        self.record();
        for node in self.document.nodes.iter_mut().filter(|n| moving.contains(&n.id)) {
            node.translate(dx, dy);
        }
        self.touch();
        self.events.push(CanvasEvent::NodesChanged);
        true
    }

    /// Move a node to an absolute position; its cluster follows by the same delta.
    pub fn set_node_position(&mut self, id: &str, x: f64, y: f64) -> bool {
        let Some(node) = self.document.node(id) else {
            return false;
        };
        let (dx, dy) = (x - node.x, y - node.y);
        self.move_node(id, dx, dy)
    }

    /// Resize a node, clamping to the configured minimum size.
    pub fn resize_node(&mut self, id: &str, width: f64, height: f64) -> bool {
        let (min_w, min_h) = (self.config.min_node_width, self.config.min_node_height);
        self.update_node(id, |node| node.resize_clamped(width, height, min_w, min_h))
    }

    pub fn delete_node(&mut self, id: &str) -> bool {
        self.delete_nodes([id]) > 0
    }

    /// Delete nodes along with every edge and lock touching them.
    /// Returns how many nodes were removed.
    pub fn delete_nodes<I, S>(&mut self, ids: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let doomed: HashSet<NodeId> = ids
            .into_iter()
            .map(|id| id.as_ref().to_string())
            .filter(|id| self.document.node(id).is_some())
            .collect();
        if doomed.is_empty() {
            return 0;
        }

        self.record();
        self.document.nodes.retain(|n| !doomed.contains(&n.id));

        let edges_before = self.document.edges.len();
        self.document
            .edges
            .retain(|e| !doomed.contains(&e.from_node) && !doomed.contains(&e.to_node));
        if self.document.edges.len() != edges_before {
            self.events.push(CanvasEvent::EdgesChanged);
        }

        let locks_before = self.document.locks.len();
        self.document
            .locks
            .retain(|l| !doomed.contains(&l.node_a) && !doomed.contains(&l.node_b));
        if self.document.locks.len() != locks_before {
            self.events.push(CanvasEvent::LocksChanged);
        }

        self.touch();
        self.events.push(CanvasEvent::NodesChanged);
        self.prune_selection();
        doomed.len()
    }

    pub fn delete_selected(&mut self) -> usize {
        let ids = self.selection.ids().to_vec();
        self.delete_nodes(&ids)
    }

    // --- Edges ---

    /// Add an edge. Rejected when an endpoint is missing, it loops back to
    /// its source, its id is taken, or the same connection already exists.
    pub fn add_edge(&mut self, edge: Edge) -> bool {
        let endpoints_exist =
            self.document.node(&edge.from_node).is_some() && self.document.node(&edge.to_node).is_some();
        if !endpoints_exist || edge.from_node == edge.to_node {
            log::debug!("Ignoring edge {} -> {}", edge.from_node, edge.to_node);
            return false;
        }
        if self
            .document
            .edges
            .iter()
            .any(|e| e.id == edge.id || e.same_connection(&edge))
        {
            return false;
        }

        self.record();
        self.document.edges.push(edge);
        self.touch();
        self.events.push(CanvasEvent::EdgesChanged);
        true
    }

    /// Connect two nodes with a new edge, returning its id.
    pub fn connect(
        &mut self,
        from: &str,
        to: &str,
        from_side: Option<Side>,
        to_side: Option<Side>,
    ) -> Option<EdgeId> {
        let edge = Edge::new(from, to)
            .with_id(self.ids.next_id())
            .with_sides(from_side, to_side);
        let id = edge.id.clone();
        self.add_edge(edge).then_some(id)
    }

    /// Edit an edge in place. The id cannot be changed.
    pub fn update_edge(&mut self, id: &str, update: impl FnOnce(&mut Edge)) -> bool {
        let Some(index) = self.document.edges.iter().position(|e| e.id == id) else {
            return false;
        };

        let mut updated = self.document.edges[index].clone();
        update(&mut updated);
        updated.id = self.document.edges[index].id.clone();
        if updated == self.document.edges[index] {
            return false;
        }

        self.record();
        self.document.edges[index] = updated;
        self.touch();
        self.events.push(CanvasEvent::EdgesChanged);
        true
    }

    pub fn delete_edge(&mut self, id: &str) -> bool {
        let Some(index) = self.document.edges.iter().position(|e| e.id == id) else {
            return false;
        };

        self.record();
        self.document.edges.remove(index);
        self.touch();
        self.events.push(CanvasEvent::EdgesChanged);
        true
    }

    // --- Locks ---

    /// Lock two node sides together. Returns `None` for a missing node, a
    /// self-lock, or an equivalent lock in either direction.
    pub fn add_lock(&mut self, node_a: &str, side_a: Side, node_b: &str, side_b: Side) -> Option<LockId> {
        if node_a == node_b || self.document.node(node_a).is_none() || self.document.node(node_b).is_none() {
            return None;
        }
        if has_equivalent(&self.document.locks, node_a, side_a, node_b, side_b) {
            return None;
        }

        let id = self.ids.next_id();
        self.record();
        self.document.locks.push(Lock {
            id: id.clone(),
            node_a: node_a.to_string(),
            side_a,
            node_b: node_b.to_string(),
            side_b,
        });
        self.touch();
        self.events.push(CanvasEvent::LocksChanged);
        log::debug!("Locked {}:{:?} to {}:{:?}", node_a, side_a, node_b, side_b);
        Some(id)
    }

    /// Remove every lock touching the node. Returns how many were removed.
    pub fn remove_locks_for_node(&mut self, id: &str) -> usize {
        let count = self.document.locks.iter().filter(|l| l.touches(id)).count();
        if count == 0 {
            return 0;
        }

        self.record();
        self.document.locks.retain(|l| !l.touches(id));
        self.touch();
        self.events.push(CanvasEvent::LocksChanged);
        count
    }

    pub fn remove_lock(&mut self, id: &str) -> bool {
        let Some(index) = self.document.locks.iter().position(|l| l.id == id) else {
            return false;
        };

        self.record();
        self.document.locks.remove(index);
        self.touch();
        self.events.push(CanvasEvent::LocksChanged);
        true
    }

    // --- Selection ---

    /// Replace the selection. Unknown ids are skipped.
    pub fn select_only<I, S>(&mut self, ids: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let existing: Vec<String> = ids
            .into_iter()
            .map(|id| id.as_ref().to_string())
            .filter(|id| self.document.node(id).is_some())
            .collect();
        let changed = self.selection.select_only(&existing);
        if changed {
            self.events.push(CanvasEvent::SelectionChanged);
        }
        changed
    }

    /// Add a node to the selection.
    pub fn select(&mut self, id: &str) -> bool {
        if self.document.node(id).is_none() {
            return false;
        }
        let changed = self.selection.add(id);
        if changed {
            self.events.push(CanvasEvent::SelectionChanged);
        }
        changed
    }

    pub fn deselect(&mut self, id: &str) -> bool {
        let changed = self.selection.remove(id);
        if changed {
            self.events.push(CanvasEvent::SelectionChanged);
        }
        changed
    }

    pub fn toggle_selection(&mut self, id: &str) {
        if self.selection.contains(id) {
            self.deselect(id);
        } else {
            self.select(id);
        }
    }

    pub fn clear_selection(&mut self) -> bool {
        let changed = self.selection.clear();
        if changed {
            self.events.push(CanvasEvent::SelectionChanged);
        }
        changed
    }

    /// Select every renderable node.
    pub fn select_all(&mut self) -> bool {
        let ids: Vec<NodeId> = self.renderable_nodes().iter().map(|r| r.node.id.clone()).collect();
        self.select_only(&ids)
    }

    /// Box select: every renderable node overlapping `rect`, even partially.
    /// With `additive` the hits are appended to the current selection.
    pub fn select_in_rect(&mut self, rect: Rect, additive: bool) -> usize {
        let rect = rect.abs();
        let hits: Vec<NodeId> = self
            .renderable_nodes()
            .iter()
            .filter(|r| intersects(r.node.bounds(), rect))
            .map(|r| r.node.id.clone())
            .collect();

        let changed = if additive {
            hits.iter().fold(false, |changed, id| self.selection.add(id) || changed)
        } else {
            self.selection.select_only(&hits)
        };
        if changed {
            self.events.push(CanvasEvent::SelectionChanged);
        }
        hits.len()
    }

    // --- Filters ---

    fn filter_changed(&mut self) {
        self.events.push(CanvasEvent::FilterChanged);
        self.prune_selection();
    }

    pub fn set_tag_filter<I, S>(&mut self, tags: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let changed = self.filter.set_tags(tags);
        if changed {
            self.filter_changed();
        }
        changed
    }

    pub fn add_tag_filter(&mut self, tag: &str) -> bool {
        let changed = self.filter.add_tag(tag);
        if changed {
            self.filter_changed();
        }
        changed
    }

    pub fn remove_tag_filter(&mut self, tag: &str) -> bool {
        let changed = self.filter.remove_tag(tag);
        if changed {
            self.filter_changed();
        }
        changed
    }

    pub fn set_search(&mut self, term: &str) -> bool {
        let changed = self.filter.set_search(term);
        if changed {
            self.filter_changed();
        }
        changed
    }

    pub fn clear_filters(&mut self) -> bool {
        let changed = self.filter.clear();
        if changed {
            self.filter_changed();
        }
        changed
    }

    // --- Viewport ---

    pub fn pan(&mut self, dx: f64, dy: f64) {
        if dx == 0.0 && dy == 0.0 {
            return;
        }
        self.document.viewport.pan(dx, dy);
        self.events.push(CanvasEvent::ViewportChanged);
    }

    pub fn zoom_at(&mut self, screen_point: Point, factor: f64) -> bool {
        let changed = self.document.viewport.zoom_at(screen_point, factor);
        if changed {
            self.events.push(CanvasEvent::ViewportChanged);
        }
        changed
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.document.viewport.set_zoom(zoom);
        self.events.push(CanvasEvent::ViewportChanged);
    }

    pub fn reset_viewport(&mut self) {
        self.document.viewport.reset();
        self.events.push(CanvasEvent::ViewportChanged);
    }

    /// Fit all nodes into a screen of the given size.
    pub fn fit_to_content(&mut self, screen: Size, padding: f64) -> bool {
        let Some(bounds) = self.document.bounds() else {
            return false;
        };
        self.document.viewport.fit_to_bounds(bounds, screen, padding);
        self.events.push(CanvasEvent::ViewportChanged);
        true
    }

    // --- Selection-wide commands ---

    /// Frame the selection with a new group node and select it.
    ///
    /// The group is padded on every side and inserted just before the
    /// earliest selected node, so it renders behind all of them.
    pub fn create_group_from_selection(&mut self, label: Option<String>) -> Option<NodeId> {
        let selected: Vec<(usize, &Node)> = self
            .selection
            .ids()
            .iter()
            .filter_map(|id| {
                let index = self.document.node_index(id)?;
                Some((index, &self.document.nodes[index]))
            })
            .collect();
        let insert_at = selected.iter().map(|(index, _)| *index).min()?;
        let bounds = bounding_box(selected.iter().map(|(_, node)| *node))?;

        let padding = self.config.group_padding;
        let frame = bounds.inflate(padding, padding);
        let id = self.ids.next_id();
        let group = Node::group(frame.x0, frame.y0, label)
            .with_id(id.clone())
            .with_size(frame.width(), frame.height());

        self.record();
        self.document.nodes.insert(insert_at, group);
        self.touch();
        self.events.push(CanvasEvent::NodesChanged);
        if self.selection.select_only([id.as_str()]) {
            self.events.push(CanvasEvent::SelectionChanged);
        }
        Some(id)
    }

    /// Set (or with `None`, clear) the color of every selected node as one undo step.
    pub fn set_selection_color(&mut self, color: Option<CanvasColor>) -> usize {
        let ids = self.selection.ids().to_vec();
        self.begin_transaction();
        let mut changed = 0;
        for id in &ids {
            let color = color.clone();
            if self.update_node(id, |node| node.color = color) {
                changed += 1;
            }
        }
        self.end_transaction();
        changed
    }

    /// Connect the first selected node to every other selected node.
    pub fn link_selected(&mut self) -> usize {
        let ids = self.selection.ids().to_vec();
        let Some((source, targets)) = ids.split_first() else {
            return 0;
        };

        self.begin_transaction();
        let mut created = 0;
        for target in targets {
            if self.connect(source, target, None, None).is_some() {
                created += 1;
            }
        }
        self.end_transaction();
        created
    }

    // --- Z-order ---

    /// Raise a node to the top. Groups only rise above other groups.
    pub fn bring_to_front(&mut self, id: &str) -> bool {
        self.reorder(id, true)
    }

    /// Lower a node to the bottom. Non-group nodes stay above all groups.
    pub fn send_to_back(&mut self, id: &str) -> bool {
        self.reorder(id, false)
    }

    fn reorder(&mut self, id: &str, to_front: bool) -> bool {
        let Some(index) = self.document.node_index(id) else {
            return false;
        };
        let len_without = self.document.nodes.len() - 1;
        // Insertion point just past the last other group, in the list without this node.
        let after_groups = self
            .document
            .nodes
            .iter()
            .enumerate()
            .rev()
            .find(|(i, n)| *i != index && n.is_group())
            .map_or(0, |(i, _)| if i > index { i } else { i + 1 });

        let target = match (self.document.nodes[index].is_group(), to_front) {
            (true, true) => after_groups,
            (true, false) => 0,
            (false, true) => len_without,
            (false, false) => after_groups,
        };
        if target == index {
            return false;
        }

        self.record();
        let node = self.document.nodes.remove(index);
        self.document.nodes.insert(target, node);
        self.touch();
        self.events.push(CanvasEvent::NodesChanged);
        true
    }

    // --- Drag session ---

    /// Start dragging `node_id`.
    ///
    /// The moving set is the selection when the node is selected (otherwise
    /// the node alone), expanded to whole lock clusters. With `detach` the
    /// node's own locks are removed first, so it leaves its cluster. The
    /// whole drag is one undo step.
    pub fn begin_drag(&mut self, node_id: &str, detach: bool) -> bool {
        if self.document.node(node_id).is_none() {
            return false;
        }
        if self.drag.is_some() {
            self.end_drag();
        }

        self.begin_transaction();
        if detach {
            self.remove_locks_for_node(node_id);
        }

        let seeds: Vec<NodeId> = if self.selection.contains(node_id) {
            self.selection.ids().to_vec()
        } else {
            vec![node_id.to_string()]
        };
        let origins = self
            .expand_clusters(&seeds)
            .into_iter()
            .filter_map(|id| {
                let origin = self.document.node(&id)?.position();
                Some(DragOrigin { id, origin })
            })
            .collect();

        self.drag = Some(DragState {
            anchor: node_id.to_string(),
            origins,
            snap: None,
        });
        true
    }

    /// Move the dragged nodes to their start positions plus `(dx, dy)`.
    ///
    /// A single free node is nudged by alignment guides and checked for an
    /// edge snap against the other renderable nodes. Clusters and multi-node
    /// drags translate rigidly with no snapping.
    pub fn drag_to(&mut self, dx: f64, dy: f64) -> DragFeedback {
        let Some(state) = self.drag.as_ref() else {
            return DragFeedback::default();
        };
        let delta = Vec2::new(dx, dy);
        let mut feedback = DragFeedback::default();

        let targets: Vec<(NodeId, Point)> = match state.origins.as_slice() {
            [single] => {
                let Some(node) = self.document.node(&single.id) else {
                    return feedback;
                };
                let threshold = self.config.snap_threshold;
                let candidates: Vec<&Node> = self
                    .renderable_nodes()
                    .into_iter()
                    .map(|r| r.node)
                    .filter(|n| n.id != single.id)
                    .collect();

                let mut proposed = node.clone();
                let start = single.origin + delta;
                proposed.x = start.x;
                proposed.y = start.y;

                let alignment = calculate_alignments(proposed.bounds(), candidates.iter().copied(), threshold);
                (proposed.x, proposed.y) = alignment.apply(proposed.x, proposed.y);

                let snap = detect_edge_snap(&proposed, candidates.iter().copied(), threshold);
                if let Some(snap) = &snap {
                    proposed.x = snap.x;
                    proposed.y = snap.y;
                }

                feedback.guides = alignment.guides;
                feedback.snap = snap;
                vec![(single.id.clone(), proposed.position())]
            }
            origins => origins.iter().map(|o| (o.id.clone(), o.origin + delta)).collect(),
        };

        if let Some(state) = self.drag.as_mut() {
            state.snap = feedback.snap.clone();
        }
        self.set_positions(&targets);
        feedback
    }

    /// Finish the drag. A pending edge snap becomes a lock, whose id is returned.
    pub fn end_drag(&mut self) -> Option<LockId> {
        let state = self.drag.take()?;
        let lock = match state.snap {
            Some(snap) => self.add_lock(&state.anchor, snap.side, &snap.target, snap.target_side),
            None => None,
        };
        self.end_transaction();
        lock
    }

    /// Abandon the drag, putting the nodes back where they started.
    pub fn cancel_drag(&mut self) {
        let Some(state) = self.drag.take() else {
            return;
        };
        let targets: Vec<(NodeId, Point)> = state.origins.into_iter().map(|o| (o.id, o.origin)).collect();
        self.set_positions(&targets);
        self.end_transaction();
    }

    // --- Metadata ---

    pub fn rename(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if name == self.document.metadata.name {
            return false;
        }
        self.document.metadata.name = name;
        self.touch();
        self.events.push(CanvasEvent::DocumentsChanged);
        true
    }
}
