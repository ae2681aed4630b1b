//! Viewport pan/zoom state.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Smallest allowed zoom level.
pub const MIN_ZOOM: f64 = 0.1;
/// Largest allowed zoom level.
pub const MAX_ZOOM: f64 = 5.0;

/// The document's view transform.
///
/// `x`/`y` is the pan offset in screen units; `zoom` scales plane units to
/// screen units and is always kept within [`MIN_ZOOM`, `MAX_ZOOM`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

impl Viewport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plane to screen.
    pub fn transform(&self) -> Affine {
        Affine::translate(Vec2::new(self.x, self.y)) * Affine::scale(self.zoom)
    }

    /// Screen to plane.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(Vec2::new(-self.x, -self.y))
    }

    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    pub fn world_to_screen(&self, world_point: Point) -> Point {
        self.transform() * world_point
    }

    /// Pan by a delta in screen units.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }

    /// Set the zoom level, clamped to the allowed range.
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = clamp_zoom(zoom);
    }

    /// Zoom by `factor`, keeping the given screen point fixed.
    /// Returns false when the clamped zoom did not change.
    pub fn zoom_at(&mut self, screen_point: Point, factor: f64) -> bool {
        let new_zoom = clamp_zoom(self.zoom * factor);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return false;
        }

        let world_point = self.screen_to_world(screen_point);
        self.zoom = new_zoom;

        let new_screen = self.world_to_screen(world_point);
        self.x += screen_point.x - new_screen.x;
        self.y += screen_point.y - new_screen.y;
        true
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Fit the viewport so `bounds` is centred in a screen of `screen` size.
    pub fn fit_to_bounds(&mut self, bounds: Rect, screen: Size, padding: f64) {
        if bounds.is_zero_area() {
            self.reset();
            return;
        }

        let available = Size::new(
            (screen.width - padding * 2.0).max(1.0),
            (screen.height - padding * 2.0).max(1.0),
        );
        let scale_x = available.width / bounds.width();
        let scale_y = available.height / bounds.height();
        self.zoom = clamp_zoom(scale_x.min(scale_y));

        let center = bounds.center();
        self.x = screen.width / 2.0 - center.x * self.zoom;
        self.y = screen.height / 2.0 - center.y * self.zoom;
    }
}

fn clamp_zoom(zoom: f64) -> f64 {
    if zoom.is_nan() {
        return 1.0;
    }
    zoom.clamp(MIN_ZOOM, MAX_ZOOM)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_viewport() {
        let viewport = Viewport::new();
        assert!((viewport.zoom - 1.0).abs() < f64::EPSILON);
        let p = Point::new(100.0, 200.0);
        assert_eq!(viewport.screen_to_world(p), p);
    }

    #[test]
    fn test_screen_to_world_with_pan_and_zoom() {
        let viewport = Viewport {
            x: 50.0,
            y: 100.0,
            zoom: 2.0,
        };
        let world = viewport.screen_to_world(Point::new(150.0, 300.0));
        assert!((world.x - 50.0).abs() < 1e-10);
        assert!((world.y - 100.0).abs() < 1e-10);
    }

    #[test]
    fn test_roundtrip_conversion() {
        let viewport = Viewport {
            x: 30.0,
            y: -20.0,
            zoom: 1.5,
        };
        let original = Point::new(123.0, 456.0);
        let back = viewport.world_to_screen(viewport.screen_to_world(original));
        assert!((back.x - original.x).abs() < 1e-10);
        assert!((back.y - original.y).abs() < 1e-10);
    }

    #[test]
    fn test_zoom_clamp() {
        let mut viewport = Viewport::new();
        viewport.zoom_at(Point::ZERO, 0.001);
        assert!((viewport.zoom - MIN_ZOOM).abs() < f64::EPSILON);

        viewport.zoom_at(Point::ZERO, 1000.0);
        assert!((viewport.zoom - MAX_ZOOM).abs() < f64::EPSILON);
        assert!(!viewport.zoom_at(Point::ZERO, 2.0));

        viewport.set_zoom(-3.0);
        assert!((viewport.zoom - MIN_ZOOM).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zoom_at_keeps_point_fixed() {
        let mut viewport = Viewport::new();
        let anchor = Point::new(400.0, 300.0);
        let before = viewport.screen_to_world(anchor);
        viewport.zoom_at(anchor, 2.0);
        let after = viewport.screen_to_world(anchor);
        assert!((before.x - after.x).abs() < 1e-10);
        assert!((before.y - after.y).abs() < 1e-10);
    }

    #[test]
    fn test_fit_to_bounds() {
        let mut viewport = Viewport::new();
        viewport.fit_to_bounds(
            Rect::new(0.0, 0.0, 200.0, 100.0),
            Size::new(400.0, 400.0),
            0.0,
        );
        assert!((viewport.zoom - 2.0).abs() < f64::EPSILON);
        let center = viewport.world_to_screen(Point::new(100.0, 50.0));
        assert!((center.x - 200.0).abs() < 1e-10);
        assert!((center.y - 200.0).abs() < 1e-10);
    }

    #[test]
    fn test_reset() {
        let mut viewport = Viewport {
            x: 5.0,
            y: 6.0,
            zoom: 3.0,
        };
        viewport.reset();
        assert_eq!(viewport, Viewport::default());
    }
}
