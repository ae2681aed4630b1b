//! Pure bounding-box helpers over nodes.

use crate::nodes::Node;
use kurbo::Rect;

/// Axis-aligned box covering every node, or `None` for no nodes.
pub fn bounding_box<'a>(nodes: impl IntoIterator<Item = &'a Node>) -> Option<Rect> {
    nodes
        .into_iter()
        .map(Node::bounds)
        .reduce(|acc, bounds| acc.union(bounds))
}

/// Whether `inner` lies within `outer` on all four edges (shared edges count).
pub fn is_contained_within(inner: Rect, outer: Rect) -> bool {
    inner.x0 >= outer.x0 && inner.y0 >= outer.y0 && inner.x1 <= outer.x1 && inner.y1 <= outer.y1
}

/// Whether two boxes overlap with positive area. Touching edges do not count.
pub fn intersects(a: Rect, b: Rect) -> bool {
    a.x0 < b.x1 && a.x1 > b.x0 && a.y0 < b.y1 && a.y1 > b.y0
}

/// Whether `a0..a1` and `b0..b1` overlap by more than a single point.
pub(crate) fn ranges_overlap(a0: f64, a1: f64, b0: f64, b1: f64) -> bool {
    a0 < b1 && a1 > b0
}
