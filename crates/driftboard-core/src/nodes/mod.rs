//! Node definitions for the canvas.

mod file;
mod group;
mod link;
mod text;

pub use file::FileNode;
pub use group::GroupNode;
pub use link::LinkNode;
pub use text::{TextNode, extract_hashtags};
pub(crate) use text::normalize_tag;

use crate::color::CanvasColor;
use crate::ids::fresh_id;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Width given to nodes created without explicit geometry.
pub const DEFAULT_WIDTH: f64 = 200.0;
/// Height given to nodes created without explicit geometry.
pub const DEFAULT_HEIGHT: f64 = 100.0;
/// Smallest width a resize can produce.
pub const MIN_WIDTH: f64 = 120.0;
/// Smallest height a resize can produce.
pub const MIN_HEIGHT: f64 = 80.0;

/// Unique identifier for nodes.
pub type NodeId = String;

/// One side of a node's bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Top, Side::Right, Side::Bottom, Side::Left];

    /// The facing side (top <-> bottom, left <-> right).
    pub fn opposite(self) -> Self {
        match self {
            Side::Top => Side::Bottom,
            Side::Right => Side::Left,
            Side::Bottom => Side::Top,
            Side::Left => Side::Right,
        }
    }
}

/// Variant-specific node payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeKind {
    Text(TextNode),
    Link(LinkNode),
    Group(GroupNode),
    File(FileNode),
}

/// A node placed on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    /// Top-left corner, plane units.
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<CanvasColor>,
    #[serde(flatten)]
    pub kind: NodeKind,
}

impl Node {
    /// Create a node of the given kind at a position with the default size.
    pub fn new(x: f64, y: f64, kind: NodeKind) -> Self {
        Self {
            id: fresh_id(),
            x,
            y,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            color: None,
            kind,
        }
    }

    pub fn text(x: f64, y: f64, text: impl Into<String>) -> Self {
        Self::new(x, y, NodeKind::Text(TextNode::new(text)))
    }

    pub fn link(x: f64, y: f64, url: impl Into<String>) -> Self {
        Self::new(x, y, NodeKind::Link(LinkNode::new(url)))
    }

    pub fn group(x: f64, y: f64, label: Option<String>) -> Self {
        Self::new(x, y, NodeKind::Group(GroupNode::new(label)))
    }

    pub fn file(x: f64, y: f64, file: FileNode) -> Self {
        Self::new(x, y, NodeKind::File(file))
    }

    /// Replace the generated id (for storage and deterministic fixtures).
    pub fn with_id(mut self, id: impl Into<NodeId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_color(mut self, color: impl Into<CanvasColor>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Bounding box in plane coordinates.
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }

    /// Resize, clamping to the given minimums.
    pub fn resize_clamped(&mut self, width: f64, height: f64, min_width: f64, min_height: f64) {
        self.width = width.max(min_width);
        self.height = height.max(min_height);
    }

    /// Coordinate of one side: x for left/right, y for top/bottom.
    pub fn side_coordinate(&self, side: Side) -> f64 {
        match side {
            Side::Top => self.y,
            Side::Right => self.x + self.width,
            Side::Bottom => self.y + self.height,
            Side::Left => self.x,
        }
    }

    /// Midpoint of a side, where edges attach.
    pub fn side_midpoint(&self, side: Side) -> Point {
        let center = self.bounds().center();
        match side {
            Side::Top => Point::new(center.x, self.y),
            Side::Right => Point::new(self.x + self.width, center.y),
            Side::Bottom => Point::new(center.x, self.y + self.height),
            Side::Left => Point::new(self.x, center.y),
        }
    }

    pub fn hit_test(&self, point: Point) -> bool {
        self.bounds().contains(point)
    }

    /// The field searched by free-text search: body, URL, filename or label.
    pub fn primary_text(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text(t) => Some(&t.text),
            NodeKind::Link(l) => Some(&l.url),
            NodeKind::File(f) => Some(&f.filename),
            NodeKind::Group(g) => g.label.as_deref(),
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, NodeKind::Group(_))
    }

    pub fn as_text(&self) -> Option<&TextNode> {
        match &self.kind {
            NodeKind::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&GroupNode> {
        match &self.kind {
            NodeKind::Group(g) => Some(g),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_defaults() {
        let node = Node::text(10.0, 20.0, "hello");
        assert!((node.width - DEFAULT_WIDTH).abs() < f64::EPSILON);
        assert!((node.height - DEFAULT_HEIGHT).abs() < f64::EPSILON);
        assert!(node.color.is_none());
        assert!(!node.id.is_empty());
        assert_ne!(node.id, Node::text(0.0, 0.0, "").id);
    }

    #[test]
    fn test_resize_clamps_to_minimum() {
        let mut node = Node::text(0.0, 0.0, "");
        node.resize_clamped(10.0, 500.0, MIN_WIDTH, MIN_HEIGHT);
        assert!((node.width - MIN_WIDTH).abs() < f64::EPSILON);
        assert!((node.height - 500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_sides() {
        let node = Node::text(10.0, 20.0, "").with_size(100.0, 50.0);
        assert!((node.side_coordinate(Side::Left) - 10.0).abs() < f64::EPSILON);
        assert!((node.side_coordinate(Side::Right) - 110.0).abs() < f64::EPSILON);
        assert!((node.side_coordinate(Side::Top) - 20.0).abs() < f64::EPSILON);
        assert!((node.side_coordinate(Side::Bottom) - 70.0).abs() < f64::EPSILON);
        assert_eq!(node.side_midpoint(Side::Right), Point::new(110.0, 45.0));
        assert_eq!(Side::Left.opposite(), Side::Right);
    }

    #[test]
    fn test_primary_text() {
        assert_eq!(Node::text(0.0, 0.0, "body").primary_text(), Some("body"));
        assert_eq!(Node::link(0.0, 0.0, "https://a.b").primary_text(), Some("https://a.b"));
        assert_eq!(Node::group(0.0, 0.0, None).primary_text(), None);
        let file = Node::file(0.0, 0.0, FileNode::new("notes.md"));
        assert_eq!(file.primary_text(), Some("notes.md"));
    }

    #[test]
    fn test_serde_shape() {
        let node = Node::text(1.0, 2.0, "hi").with_id("a").with_color("3");
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["type"], "text");
        assert_eq!(json["text"], "hi");
        assert_eq!(json["color"], "3");

        let back: Node = serde_json::from_value(json).unwrap();
        assert_eq!(back, node);
    }
}
