//! Snap detection for dragged nodes.
//!
//! Two separate passes run while a node is dragged. Alignment recomputes every
//! frame, producing guides for visual feedback and a per-axis nudge. Edge snap
//! looks for a flush side-to-side contact, which becomes a persistent lock
//! candidate once the drag ends.
//!
//! Ties are resolved first-found-wins: a later candidate replaces the current
//! best only when it is strictly closer.

use crate::geometry::ranges_overlap;
use crate::nodes::{Node, NodeId, Side};
use kurbo::Rect;

/// Default distance threshold for snapping (in plane units).
pub const SNAP_THRESHOLD: f64 = 8.0;

/// Side pairings tested by edge snap, in tie-break order.
const EDGE_PAIRINGS: [(Side, Side); 4] = [
    (Side::Right, Side::Left),
    (Side::Left, Side::Right),
    (Side::Bottom, Side::Top),
    (Side::Top, Side::Bottom),
];

/// A flush contact between the dragged node and another node.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeSnap {
    /// The node snapped against.
    pub target: NodeId,
    /// Side of the dragged node that touches.
    pub side: Side,
    /// Side of the target that is touched.
    pub target_side: Side,
    /// Dragged node position that makes the two sides flush.
    pub x: f64,
    pub y: f64,
    /// Gap that was closed.
    pub distance: f64,
}

/// Find the closest side-to-side snap for `dragged` against `others`.
///
/// Left/right pairings only apply when the nodes overlap vertically, and
/// top/bottom pairings only when they overlap horizontally, so nodes that
/// merely share a coordinate far apart never snap.
pub fn detect_edge_snap<'a>(
    dragged: &Node,
    others: impl IntoIterator<Item = &'a Node>,
    threshold: f64,
) -> Option<EdgeSnap> {
    let mut best: Option<EdgeSnap> = None;

    for other in others {
        if other.id == dragged.id {
            continue;
        }
        for (side, target_side) in EDGE_PAIRINGS {
            let overlaps = match side {
                Side::Left | Side::Right => ranges_overlap(
                    dragged.y,
                    dragged.y + dragged.height,
                    other.y,
                    other.y + other.height,
                ),
                Side::Top | Side::Bottom => ranges_overlap(
                    dragged.x,
                    dragged.x + dragged.width,
                    other.x,
                    other.x + other.width,
                ),
            };
            if !overlaps {
                continue;
            }

            let target_edge = other.side_coordinate(target_side);
            let distance = (dragged.side_coordinate(side) - target_edge).abs();
            if distance >= threshold {
                continue;
            }
            if best.as_ref().is_some_and(|b| distance >= b.distance) {
                continue;
            }

            let (x, y) = match side {
                Side::Right => (target_edge - dragged.width, dragged.y),
                Side::Left => (target_edge, dragged.y),
                Side::Bottom => (dragged.x, target_edge - dragged.height),
                Side::Top => (dragged.x, target_edge),
            };
            best = Some(EdgeSnap {
                target: other.id.clone(),
                side,
                target_side,
                x,
                y,
                distance,
            });
        }
    }

    best
}

/// Orientation of an alignment guide line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuideAxis {
    /// A vertical line at some x.
    Vertical,
    /// A horizontal line at some y.
    Horizontal,
}

/// A guide line to draw while dragging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Guide {
    pub axis: GuideAxis,
    pub position: f64,
}

/// Result of the alignment pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Alignment {
    /// Every in-threshold line, deduplicated.
    pub guides: Vec<Guide>,
    /// New left edge for the dragged box, if an x alignment engaged.
    pub snap_x: Option<f64>,
    /// New top edge for the dragged box, if a y alignment engaged.
    pub snap_y: Option<f64>,
}

impl Alignment {
    /// Apply the snap to a proposed top-left position.
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (self.snap_x.unwrap_or(x), self.snap_y.unwrap_or(y))
    }

    fn push_guide(&mut self, guide: Guide) {
        if !self.guides.contains(&guide) {
            self.guides.push(guide);
        }
    }
}

/// Closest candidate seen so far on one axis.
#[derive(Debug, Clone, Copy)]
struct AxisBest {
    distance: f64,
    origin: f64,
}

impl AxisBest {
    fn offer(best: &mut Option<AxisBest>, distance: f64, origin: f64) {
        if best.is_none_or(|b| distance < b.distance) {
            *best = Some(AxisBest { distance, origin });
        }
    }
}

/// The five relationships tested per axis: four edge pairings and center to center.
/// Each entry is (dragged coordinate, target coordinate).
fn axis_pairs(d0: f64, d1: f64, t0: f64, t1: f64) -> [(f64, f64); 5] {
    [
        (d0, t0),
        (d0, t1),
        (d1, t0),
        (d1, t1),
        ((d0 + d1) / 2.0, (t0 + t1) / 2.0),
    ]
}

/// Compute alignment guides and per-axis snap for a dragged box.
///
/// X and Y are independent: each axis snaps to its single closest match.
pub fn calculate_alignments<'a>(
    dragging: Rect,
    others: impl IntoIterator<Item = &'a Node>,
    threshold: f64,
) -> Alignment {
    let mut result = Alignment::default();
    let mut best_x: Option<AxisBest> = None;
    let mut best_y: Option<AxisBest> = None;

    for other in others {
        let target = other.bounds();

        for (dragged, line) in axis_pairs(dragging.x0, dragging.x1, target.x0, target.x1) {
            let distance = (dragged - line).abs();
            if distance < threshold {
                result.push_guide(Guide {
                    axis: GuideAxis::Vertical,
                    position: line,
                });
                AxisBest::offer(&mut best_x, distance, dragging.x0 + (line - dragged));
            }
        }

        for (dragged, line) in axis_pairs(dragging.y0, dragging.y1, target.y0, target.y1) {
            let distance = (dragged - line).abs();
            if distance < threshold {
                result.push_guide(Guide {
                    axis: GuideAxis::Horizontal,
                    position: line,
                });
                AxisBest::offer(&mut best_y, distance, dragging.y0 + (line - dragged));
            }
        }
    }

    result.snap_x = best_x.map(|b| b.origin);
    result.snap_y = best_y.map(|b| b.origin);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, x: f64, y: f64, w: f64, h: f64) -> Node {
        Node::text(x, y, "").with_id(id).with_size(w, h)
    }

    #[test]
    fn test_edge_snap_none_outside_threshold() {
        let dragged = node("d", 0.0, 0.0, 100.0, 100.0);
        let far = node("f", 120.0, 0.0, 100.0, 100.0);
        assert!(detect_edge_snap(&dragged, [&far], SNAP_THRESHOLD).is_none());
    }

    #[test]
    fn test_edge_snap_picks_closest() {
        // Right edge at x=100; targets' left edges at 105 and 103.
        let dragged = node("d", 0.0, 0.0, 100.0, 100.0);
        let a = node("a", 105.0, 0.0, 100.0, 100.0);
        let b = node("b", 103.0, 0.0, 100.0, 100.0);

        let snap = detect_edge_snap(&dragged, [&a, &b], 8.0).unwrap();
        assert_eq!(snap.target, "b");
        assert_eq!(snap.side, Side::Right);
        assert_eq!(snap.target_side, Side::Left);
        assert!((snap.x - 3.0).abs() < f64::EPSILON);
        assert!((snap.y - 0.0).abs() < f64::EPSILON);
        assert!((snap.distance - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_edge_snap_requires_perpendicular_overlap() {
        // Same x alignment but far below: no vertical overlap, no snap.
        let dragged = node("d", 0.0, 0.0, 100.0, 100.0);
        let below = node("b", 104.0, 500.0, 100.0, 100.0);
        assert!(detect_edge_snap(&dragged, [&below], 8.0).is_none());
    }

    #[test]
    fn test_edge_snap_vertical_pairing() {
        let dragged = node("d", 10.0, 0.0, 100.0, 100.0);
        let under = node("u", 0.0, 105.0, 100.0, 100.0);
        let snap = detect_edge_snap(&dragged, [&under], 8.0).unwrap();
        assert_eq!(snap.side, Side::Bottom);
        assert_eq!(snap.target_side, Side::Top);
        assert!((snap.x - 10.0).abs() < f64::EPSILON);
        assert!((snap.y - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_edge_snap_tie_goes_to_first_pairing() {
        // Right->left and left->right both at distance 4.
        let dragged = node("d", 104.0, 0.0, 92.0, 100.0);
        let left = node("l", 0.0, 0.0, 100.0, 100.0);
        let right = node("r", 200.0, 0.0, 100.0, 100.0);
        let snap = detect_edge_snap(&dragged, [&left, &right], 8.0).unwrap();
        assert_eq!(snap.target, "l");
        assert_eq!(snap.side, Side::Left);

        let snap = detect_edge_snap(&dragged, [&right, &left], 8.0).unwrap();
        assert_eq!(snap.target, "r");
        assert_eq!(snap.side, Side::Right);
    }

    #[test]
    fn test_edge_snap_ignores_self() {
        let dragged = node("d", 0.0, 0.0, 100.0, 100.0);
        assert!(detect_edge_snap(&dragged, [&dragged], 8.0).is_none());
    }

    #[test]
    fn test_alignment_left_edges() {
        let other = node("o", 100.0, 300.0, 100.0, 100.0);
        let dragging = Rect::new(104.0, 0.0, 154.0, 50.0);
        let result = calculate_alignments(dragging, [&other], 8.0);

        assert_eq!(result.snap_x, Some(100.0));
        assert_eq!(result.snap_y, None);
        assert!(result.guides.contains(&Guide {
            axis: GuideAxis::Vertical,
            position: 100.0
        }));
    }

    #[test]
    fn test_alignment_closest_wins_per_axis() {
        let a = node("a", 95.0, 0.0, 10.0, 10.0);
        let b = node("b", 98.0, 0.0, 10.0, 10.0);
        let dragging = Rect::new(100.0, 500.0, 150.0, 550.0);

        let result = calculate_alignments(dragging, [&a, &b], 8.0);
        // b's left edge (98) is closer than a's left edge (95).
        assert_eq!(result.snap_x, Some(98.0));
    }

    #[test]
    fn test_alignment_guides_dedup() {
        let a = node("a", 100.0, 0.0, 10.0, 10.0);
        let b = node("b", 100.0, 400.0, 10.0, 10.0);
        let dragging = Rect::new(102.0, 200.0, 152.0, 250.0);
        let result = calculate_alignments(dragging, [&a, &b], 8.0);
        let at_100 = result
            .guides
            .iter()
            .filter(|g| g.axis == GuideAxis::Vertical && g.position == 100.0)
            .count();
        assert_eq!(at_100, 1);
    }

    #[test]
    fn test_alignment_center_to_center() {
        let other = node("o", 0.0, 0.0, 100.0, 100.0);
        // Center y 53 vs 50: within threshold, edges far apart.
        let dragging = Rect::new(300.0, 33.0, 340.0, 73.0);
        let result = calculate_alignments(dragging, [&other], 8.0);
        assert_eq!(result.snap_y, Some(30.0));
        let (x, y) = result.apply(300.0, 33.0);
        assert!((x - 300.0).abs() < f64::EPSILON);
        assert!((y - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_alignment_nothing_in_range() {
        let other = node("o", 0.0, 0.0, 10.0, 10.0);
        let result = calculate_alignments(Rect::new(500.0, 500.0, 600.0, 600.0), [&other], 8.0);
        assert_eq!(result, Alignment::default());
    }
}
