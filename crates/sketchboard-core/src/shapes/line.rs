//! Line segment shape.

use super::{ShapeGeometry, point_to_segment_dist};
use kurbo::{BezPath, Point, Rect, Vec2};

/// A straight line between two endpoints. Lines have no interior.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    /// First endpoint.
    pub start: Point,
    /// Second endpoint.
    pub end: Point,
}

impl Line {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }
}

impl ShapeGeometry for Line {
    fn bounds(&self) -> Rect {
        Rect::from_points(self.start, self.end)
    }

    fn contains(&self, point: Point, tolerance: f64) -> bool {
        if self.length() < f64::EPSILON {
            return false;
        }
        point_to_segment_dist(point, self.start, self.end) <= tolerance
    }

    fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        path.move_to(self.start);
        path.line_to(self.end);
        path
    }

    fn translate(&mut self, delta: Vec2) {
        self.start += delta;
        self.end += delta;
    }

    fn anchor(&self) -> Point {
        self.start
    }

    fn resize_by(&mut self, delta: Vec2) {
        self.end += delta;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_any_direction() {
        let line = Line::new(Point::new(30.0, 5.0), Point::new(10.0, 25.0));
        assert_eq!(line.bounds(), Rect::new(10.0, 5.0, 30.0, 25.0));
    }

    #[test]
    fn test_contains() {
        let line = Line::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        assert!(line.contains(Point::new(50.0, 4.0), 5.0));
        assert!(!line.contains(Point::new(50.0, 20.0), 5.0));
    }

    #[test]
    fn test_zero_length_never_hit() {
        let line = Line::new(Point::new(5.0, 5.0), Point::new(5.0, 5.0));
        assert!(!line.contains(Point::new(5.0, 5.0), 5.0));
    }

    #[test]
    fn test_path_is_open() {
        let path = Line::new(Point::ZERO, Point::new(1.0, 1.0)).to_path();
        assert_eq!(path.elements().len(), 2);
    }
}
