//! Tag and search filtering, and the ghost partition for locked clusters.

use crate::lock::{Lock, locked_cluster};
use crate::nodes::{Node, normalize_tag};
use std::collections::{BTreeSet, HashSet};

/// Active tag filters and search term.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeFilter {
    /// Normalized tags (lowercase, no `#`). A node must carry all of them.
    tags: Vec<String>,
    /// Lowercased search term, never empty.
    search: Option<String>,
}

impl NodeFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn is_active(&self) -> bool {
        !self.tags.is_empty() || self.search.is_some()
    }

    /// Replace the tag set. Returns true if it changed.
    pub fn set_tags<I, S>(&mut self, tags: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut next: Vec<String> = Vec::new();
        for tag in tags {
            let tag = normalize_tag(tag.as_ref());
            if !tag.is_empty() && !next.contains(&tag) {
                next.push(tag);
            }
        }
        if next == self.tags {
            return false;
        }
        self.tags = next;
        true
    }

    pub fn add_tag(&mut self, tag: &str) -> bool {
        let tag = normalize_tag(tag);
        if tag.is_empty() || self.tags.contains(&tag) {
            return false;
        }
        self.tags.push(tag);
        true
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let tag = normalize_tag(tag);
        let before = self.tags.len();
        self.tags.retain(|t| *t != tag);
        self.tags.len() != before
    }

    /// Set the search term; an empty or all-whitespace term clears it.
    /// The term is matched as given, surrounding spaces included.
    /// Returns true if it changed.
    pub fn set_search(&mut self, term: &str) -> bool {
        let next = (!term.trim().is_empty()).then(|| term.to_lowercase());
        if next == self.search {
            return false;
        }
        self.search = next;
        true
    }

    pub fn clear(&mut self) -> bool {
        let changed = self.is_active();
        self.tags.clear();
        self.search = None;
        changed
    }

    /// Whether a node passes the filter.
    pub fn matches(&self, node: &Node) -> bool {
        if !self.tags.is_empty() {
            let Some(text) = node.as_text() else {
                return false;
            };
            let present = text.hashtags();
            if !self.tags.iter().all(|tag| present.contains(tag)) {
                return false;
            }
        }

        if let Some(term) = &self.search {
            let hit = node
                .primary_text()
                .is_some_and(|text| text.to_lowercase().contains(term.as_str()));
            if !hit {
                return false;
            }
        }

        true
    }
}

/// Nodes that pass the filter, in document order.
pub fn visible_nodes<'a>(nodes: &'a [Node], filter: &NodeFilter) -> Vec<&'a Node> {
    if !filter.is_active() {
        return nodes.iter().collect();
    }
    nodes.iter().filter(|node| filter.matches(node)).collect()
}

/// A node to draw, and whether it is only drawn because its cluster is visible.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderNode<'a> {
    pub node: &'a Node,
    pub ghost: bool,
}

/// Visible nodes plus ghosts, in document order, each exactly once.
///
/// A hidden node becomes a ghost when any member of its lock cluster is
/// visible, so dragging the visible part never leaves it behind.
pub fn renderable_nodes<'a>(nodes: &'a [Node], locks: &[Lock], filter: &NodeFilter) -> Vec<RenderNode<'a>> {
    if !filter.is_active() {
        return nodes.iter().map(|node| RenderNode { node, ghost: false }).collect();
    }

    let visible: HashSet<&str> = nodes
        .iter()
        .filter(|node| filter.matches(node))
        .map(|node| node.id.as_str())
        .collect();

    nodes
        .iter()
        .filter_map(|node| {
            if visible.contains(node.id.as_str()) {
                return Some(RenderNode { node, ghost: false });
            }
            let anchored = locked_cluster(locks, &node.id)
                .iter()
                .any(|member| visible.contains(member.as_str()));
            anchored.then_some(RenderNode { node, ghost: true })
        })
        .collect()
}

/// Every hashtag used by text nodes, sorted and deduplicated.
pub fn hashtag_vocabulary(nodes: &[Node]) -> Vec<String> {
    nodes
        .iter()
        .filter_map(Node::as_text)
        .flat_map(|text| text.hashtags())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::Side;

    fn fixture() -> Vec<Node> {
        vec![
            Node::group(0.0, 0.0, Some("Work".to_string())).with_id("g"),
            Node::text(0.0, 0.0, "plan #work #urgent").with_id("a"),
            Node::text(0.0, 0.0, "relax #home").with_id("b"),
            Node::link(0.0, 0.0, "https://example.com/Work").with_id("c"),
            Node::text(0.0, 0.0, "#work later").with_id("d"),
        ]
    }

    fn ids(nodes: &[&Node]) -> Vec<String> {
        nodes.iter().map(|n| n.id.clone()).collect()
    }

    #[test]
    fn test_no_filter_is_identity() {
        let nodes = fixture();
        let visible = visible_nodes(&nodes, &NodeFilter::new());
        assert_eq!(visible.len(), nodes.len());
        for (v, n) in visible.iter().zip(nodes.iter()) {
            assert!(std::ptr::eq(*v, n));
        }
    }

    #[test]
    fn test_tags_use_and_semantics() {
        let nodes = fixture();
        let mut filter = NodeFilter::new();
        filter.set_tags(["#work"]);
        assert_eq!(ids(&visible_nodes(&nodes, &filter)), vec!["a", "d"]);

        filter.add_tag("URGENT");
        assert_eq!(ids(&visible_nodes(&nodes, &filter)), vec!["a"]);
    }

    #[test]
    fn test_groups_hidden_under_tag_filter() {
        let nodes = fixture();
        let mut filter = NodeFilter::new();
        filter.set_tags(["work"]);
        assert!(!ids(&visible_nodes(&nodes, &filter)).contains(&"g".to_string()));
    }

    #[test]
    fn test_search_matches_primary_text() {
        let nodes = fixture();
        let mut filter = NodeFilter::new();
        filter.set_search("WORK");
        // Group label, link URL, and both text bodies mention "work".
        assert_eq!(ids(&visible_nodes(&nodes, &filter)), vec!["g", "a", "c", "d"]);

        assert!(filter.set_search(""));
        assert!(!filter.is_active());
        assert!(!filter.set_search("   "));
        assert!(!filter.is_active());
    }

    #[test]
    fn test_search_keeps_surrounding_spaces() {
        let nodes = vec![
            Node::text(0.0, 0.0, "foobar").with_id("joined"),
            Node::text(0.0, 0.0, "Foo bar").with_id("spaced"),
        ];
        let mut filter = NodeFilter::new();
        filter.set_search("foo ");
        assert_eq!(filter.search(), Some("foo "));
        assert_eq!(ids(&visible_nodes(&nodes, &filter)), vec!["spaced"]);
    }

    #[test]
    fn test_ghost_for_locked_hidden_node() {
        let nodes = fixture();
        let locks = vec![Lock {
            id: "l".to_string(),
            node_a: "a".to_string(),
            side_a: Side::Right,
            node_b: "b".to_string(),
            side_b: Side::Left,
        }];
        let mut filter = NodeFilter::new();
        filter.set_tags(["urgent"]);

        let render = renderable_nodes(&nodes, &locks, &filter);
        let summary: Vec<(&str, bool)> = render.iter().map(|r| (r.node.id.as_str(), r.ghost)).collect();
        assert_eq!(summary, vec![("a", false), ("b", true)]);
    }

    #[test]
    fn test_vocabulary_sorted_unique() {
        let nodes = fixture();
        assert_eq!(hashtag_vocabulary(&nodes), vec!["home", "urgent", "work"]);
    }

    #[test]
    fn test_set_tags_reports_change() {
        let mut filter = NodeFilter::new();
        assert!(filter.set_tags(["a", "#A", "b"]));
        assert_eq!(filter.tags(), ["a".to_string(), "b".to_string()]);
        assert!(!filter.set_tags(["a", "b"]));
        assert!(filter.remove_tag("#b"));
        assert!(filter.clear());
        assert!(!filter.clear());
    }
}
