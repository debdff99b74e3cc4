//! Triangle shape.

use super::{ShapeGeometry, point_to_segment_dist, points_bounds, scale_from_corner};
use kurbo::{BezPath, Point, Rect, Vec2};

/// An arbitrary triangle given by its three vertices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub vertices: [Point; 3],
}

impl Triangle {
    pub fn new(a: Point, b: Point, c: Point) -> Self {
        Self { vertices: [a, b, c] }
    }

    /// Isosceles triangle filling the box spanned by a drag: apex at the
    /// middle of the top edge, base along the bottom edge.
    pub fn from_drag(start: Point, end: Point) -> Self {
        let rect = Rect::from_points(start, end);
        Self::new(
            Point::new(rect.x0 + rect.width() / 2.0, rect.y0),
            Point::new(rect.x0, rect.y1),
            Point::new(rect.x1, rect.y1),
        )
    }

    /// Twice the signed area; zero for degenerate triangles.
    fn doubled_area(&self) -> f64 {
        let [a, b, c] = self.vertices;
        (b - a).cross(c - a)
    }
}

impl ShapeGeometry for Triangle {
    fn bounds(&self) -> Rect {
        points_bounds(&self.vertices)
    }

    fn contains(&self, point: Point, tolerance: f64) -> bool {
        let [a, b, c] = self.vertices;
        let denom = (b.y - c.y) * (a.x - c.x) + (c.x - b.x) * (a.y - c.y);
        if self.doubled_area().abs() < f64::EPSILON || denom.abs() < f64::EPSILON {
            return false;
        }
        let u = ((b.y - c.y) * (point.x - c.x) + (c.x - b.x) * (point.y - c.y)) / denom;
        let v = ((c.y - a.y) * (point.x - c.x) + (a.x - c.x) * (point.y - c.y)) / denom;
        let w = 1.0 - u - v;
        if u >= 0.0 && v >= 0.0 && w >= 0.0 {
            return true;
        }
        [(a, b), (b, c), (c, a)]
            .into_iter()
            .any(|(p, q)| point_to_segment_dist(point, p, q) <= tolerance)
    }

    fn to_path(&self) -> BezPath {
        let [a, b, c] = self.vertices;
        let mut path = BezPath::new();
        path.move_to(a);
        path.line_to(b);
        path.line_to(c);
        path.close_path();
        path
    }

    fn translate(&mut self, delta: Vec2) {
        for vertex in &mut self.vertices {
            *vertex += delta;
        }
    }

    fn anchor(&self) -> Point {
        self.vertices[0]
    }

    fn resize_by(&mut self, delta: Vec2) {
        let bounds = self.bounds();
        scale_from_corner(&mut self.vertices, bounds, delta);
    }
}
