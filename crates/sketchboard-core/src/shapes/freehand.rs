//! Freehand drawing shape.

use super::{ShapeGeometry, point_to_polyline_dist, points_bounds, scale_from_corner};
use kurbo::{BezPath, Point, Rect, Vec2};

/// A freehand stroke: an open polyline through the recorded points.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Freehand {
    /// Points in drawing order.
    pub points: Vec<Point>,
}

impl Freehand {
    /// Create from existing points.
    pub fn from_points(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Add a point to the path.
    pub fn add_point(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Get the number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the path is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl ShapeGeometry for Freehand {
    fn bounds(&self) -> Rect {
        points_bounds(&self.points)
    }

    fn contains(&self, point: Point, tolerance: f64) -> bool {
        match self.points.as_slice() {
            [] => false,
            [only] => only.distance(point) <= tolerance,
            points => point_to_polyline_dist(point, points) <= tolerance,
        }
    }

    fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        let Some((first, rest)) = self.points.split_first() else {
            return path;
        };

        path.move_to(*first);
        for point in rest {
            path.line_to(*point);
        }

        path
    }

    fn translate(&mut self, delta: Vec2) {
        for point in &mut self.points {
            *point += delta;
        }
    }

    fn anchor(&self) -> Point {
        self.points.first().copied().unwrap_or(Point::ZERO)
    }

    fn resize_by(&mut self, delta: Vec2) {
        let bounds = self.bounds();
        scale_from_corner(&mut self.points, bounds, delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_points() {
        let mut freehand = Freehand::default();
        assert!(freehand.is_empty());
        freehand.add_point(Point::new(0.0, 0.0));
        freehand.add_point(Point::new(10.0, 10.0));
        assert_eq!(freehand.len(), 2);
    }

    #[test]
    fn test_bounds() {
        let freehand = Freehand::from_points(vec![
            Point::new(0.0, 0.0),
            Point::new(100.0, 50.0),
            Point::new(50.0, 100.0),
        ]);

        let bounds = freehand.bounds();
        assert!((bounds.x0).abs() < f64::EPSILON);
        assert!((bounds.y0).abs() < f64::EPSILON);
        assert!((bounds.x1 - 100.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_bounds_are_zero() {
        assert_eq!(Freehand::default().bounds(), Rect::ZERO);
    }

    #[test]
    fn test_contains() {
        let freehand = Freehand::from_points(vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)]);

        assert!(freehand.contains(Point::new(50.0, 0.0), 5.0));
        assert!(!freehand.contains(Point::new(50.0, 20.0), 5.0));
    }

    #[test]
    fn test_single_point_contains() {
        let freehand = Freehand::from_points(vec![Point::new(10.0, 10.0)]);
        assert!(freehand.contains(Point::new(12.0, 10.0), 5.0));
        assert!(!freehand.contains(Point::new(30.0, 10.0), 5.0));
    }

    #[test]
    fn test_path_keeps_point_order() {
        let freehand = Freehand::from_points(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(2.0, 0.0),
        ]);
        assert_eq!(freehand.to_path().elements().len(), 3);
    }
}
