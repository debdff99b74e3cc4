//! Circle shape.

use super::{MIN_RESIZED_SIZE, ShapeGeometry};
use kurbo::{BezPath, Circle as KurboCircle, Point, Rect, Shape as KurboShape, Vec2};

/// A circle given by its center and radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    /// Center point.
    pub center: Point,
    /// Radius (never negative).
    pub radius: f64,
}

impl Circle {
    /// Create a new circle. Negative radii are clamped to zero.
    pub fn new(center: Point, radius: f64) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
        }
    }

    /// Circle centered on the drag start whose edge passes through the drag end.
    pub fn from_drag(start: Point, end: Point) -> Self {
        Self::new(start, start.distance(end))
    }
}

impl ShapeGeometry for Circle {
    fn bounds(&self) -> Rect {
        Rect::new(
            self.center.x - self.radius,
            self.center.y - self.radius,
            self.center.x + self.radius,
            self.center.y + self.radius,
        )
    }

    fn contains(&self, point: Point, tolerance: f64) -> bool {
        self.center.distance(point) <= self.radius + tolerance
    }

    fn to_path(&self) -> BezPath {
        KurboCircle::new(self.center, self.radius).to_path(0.1)
    }

    fn translate(&mut self, delta: Vec2) {
        self.center += delta;
    }

    fn anchor(&self) -> Point {
        self.center
    }

    fn resize_by(&mut self, delta: Vec2) {
        // Horizontal drag drives the radius.
        self.radius = (self.radius + delta.x).max(MIN_RESIZED_SIZE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_from_drag() {
        let circle = Circle::from_drag(Point::new(10.0, 10.0), Point::new(13.0, 14.0));
        assert_eq!(circle.center, Point::new(10.0, 10.0));
        assert!((circle.radius - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_bounds() {
        let bounds = Circle::new(Point::new(50.0, 50.0), 10.0).bounds();
        assert_eq!(bounds, Rect::new(40.0, 40.0, 60.0, 60.0));
    }

    #[test]
    fn test_contains() {
        let circle = Circle::new(Point::new(0.0, 0.0), 10.0);
        assert!(circle.contains(Point::new(6.0, 6.0), 0.0));
        // The bounding-box corner is outside the circle itself.
        assert!(!circle.contains(Point::new(9.5, 9.5), 0.0));
        assert!(circle.contains(Point::new(12.0, 0.0), 5.0));
    }

    #[test]
    fn test_resize_clamps() {
        let mut circle = Circle::new(Point::ZERO, 5.0);
        circle.resize_by(Vec2::new(-20.0, 0.0));
        assert!((circle.radius - MIN_RESIZED_SIZE).abs() < f64::EPSILON);
    }
}
