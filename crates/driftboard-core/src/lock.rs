//! Rigid attachments between node sides.
//!
//! Each lock is an undirected edge between two nodes. The transitive closure
//! of locks is a cluster, and a cluster moves as one body: every member gets
//! the same translation in the same mutation step.

use crate::nodes::{NodeId, Side};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

/// Unique identifier for locks.
pub type LockId = String;

/// An undirected attachment of `node_a`'s `side_a` to `node_b`'s `side_b`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lock {
    pub id: LockId,
    pub node_a: NodeId,
    pub side_a: Side,
    pub node_b: NodeId,
    pub side_b: Side,
}

impl Lock {
    /// Whether this lock joins the same two (node, side) pairs, in either direction.
    pub fn is_equivalent(&self, node_a: &str, side_a: Side, node_b: &str, side_b: Side) -> bool {
        (self.node_a == node_a && self.side_a == side_a && self.node_b == node_b && self.side_b == side_b)
            || (self.node_a == node_b
                && self.side_a == side_b
                && self.node_b == node_a
                && self.side_b == side_a)
    }

    /// Whether either end is the node.
    pub fn touches(&self, node: &str) -> bool {
        self.node_a == node || self.node_b == node
    }

    /// The node on the other end, if `node` is one of the ends.
    pub fn other_end(&self, node: &str) -> Option<&str> {
        if self.node_a == node {
            Some(&self.node_b)
        } else if self.node_b == node {
            Some(&self.node_a)
        } else {
            None
        }
    }
}

/// Whether an equivalent lock already exists.
pub fn has_equivalent(locks: &[Lock], node_a: &str, side_a: Side, node_b: &str, side_b: Side) -> bool {
    locks
        .iter()
        .any(|lock| lock.is_equivalent(node_a, side_a, node_b, side_b))
}

/// All nodes transitively locked to `start`, including `start` itself.
///
/// Breadth-first over the lock list, in discovery order. Nothing is cached:
/// the lock list may change between calls.
pub fn locked_cluster(locks: &[Lock], start: &str) -> Vec<NodeId> {
    let mut visited: HashSet<&str> = HashSet::new();
    let mut order: Vec<NodeId> = Vec::new();
    let mut queue: VecDeque<&str> = VecDeque::new();

    visited.insert(start);
    order.push(start.to_string());
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        for next in locks.iter().filter_map(|lock| lock.other_end(current)) {
            if visited.insert(next) {
                order.push(next.to_string());
                queue.push_back(next);
            }
        }
    }

    order
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lock(id: &str, a: &str, sa: Side, b: &str, sb: Side) -> Lock {
        Lock {
            id: id.to_string(),
            node_a: a.to_string(),
            side_a: sa,
            node_b: b.to_string(),
            side_b: sb,
        }
    }

    fn sorted(mut ids: Vec<NodeId>) -> Vec<NodeId> {
        ids.sort();
        ids
    }

    #[test]
    fn test_unlocked_node_is_singleton() {
        assert_eq!(locked_cluster(&[], "a"), vec!["a".to_string()]);
    }

    #[test]
    fn test_cluster_is_transitive_and_symmetric() {
        let locks = vec![
            lock("1", "a", Side::Right, "b", Side::Left),
            lock("2", "c", Side::Top, "b", Side::Bottom),
            lock("3", "x", Side::Right, "y", Side::Left),
        ];

        let from_a = sorted(locked_cluster(&locks, "a"));
        assert_eq!(from_a, vec!["a", "b", "c"]);
        assert_eq!(sorted(locked_cluster(&locks, "c")), from_a);
        assert_eq!(sorted(locked_cluster(&locks, "b")), from_a);
        assert_eq!(sorted(locked_cluster(&locks, "y")), vec!["x", "y"]);
    }

    #[test]
    fn test_cluster_starts_with_start_node() {
        let locks = vec![lock("1", "a", Side::Right, "b", Side::Left)];
        assert_eq!(locked_cluster(&locks, "b")[0], "b");
    }

    #[test]
    fn test_cycles_terminate() {
        let locks = vec![
            lock("1", "a", Side::Right, "b", Side::Left),
            lock("2", "b", Side::Bottom, "c", Side::Top),
            lock("3", "c", Side::Left, "a", Side::Right),
        ];
        assert_eq!(locked_cluster(&locks, "a").len(), 3);
    }

    #[test]
    fn test_equivalence_either_direction() {
        let l = lock("1", "a", Side::Right, "b", Side::Left);
        assert!(l.is_equivalent("a", Side::Right, "b", Side::Left));
        assert!(l.is_equivalent("b", Side::Left, "a", Side::Right));
        assert!(!l.is_equivalent("a", Side::Bottom, "b", Side::Top));
        assert!(has_equivalent(&[l], "b", Side::Left, "a", Side::Right));
    }
}
