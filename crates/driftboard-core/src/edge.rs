//! Directed connectors between nodes.

use crate::color::CanvasColor;
use crate::ids::fresh_id;
use crate::nodes::{NodeId, Side};
use serde::{Deserialize, Serialize};

/// Unique identifier for edges.
pub type EdgeId = String;

/// Marker drawn at an edge end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeEnd {
    #[default]
    None,
    Arrow,
}

/// A directed, optionally labelled connector.
///
/// `from_node`/`to_node` are expected to reference existing nodes. A dangling
/// reference is tolerated: renderers skip it rather than the model deleting it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: EdgeId,
    pub from_node: NodeId,
    pub to_node: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_side: Option<Side>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_side: Option<Side>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_end: Option<EdgeEnd>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_end: Option<EdgeEnd>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<CanvasColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Edge {
    /// Create an edge with a fresh id and no sides, markers or label.
    pub fn new(from_node: impl Into<NodeId>, to_node: impl Into<NodeId>) -> Self {
        Self {
            id: fresh_id(),
            from_node: from_node.into(),
            to_node: to_node.into(),
            from_side: None,
            to_side: None,
            from_end: None,
            to_end: None,
            color: None,
            label: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<EdgeId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_sides(mut self, from_side: Option<Side>, to_side: Option<Side>) -> Self {
        self.from_side = from_side;
        self.to_side = to_side;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Whether either end references the node.
    pub fn touches(&self, node: &str) -> bool {
        self.from_node == node || self.to_node == node
    }

    /// Same endpoints and sides, in the same direction.
    pub fn same_connection(&self, other: &Edge) -> bool {
        self.from_node == other.from_node
            && self.to_node == other.to_node
            && self.from_side == other.from_side
            && self.to_side == other.to_side
    }
}
