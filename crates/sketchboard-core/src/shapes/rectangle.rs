//! Rectangle shape.

use super::{MIN_RESIZED_SIZE, ShapeGeometry, rect_contains};
use kurbo::{BezPath, Point, Rect, Shape as KurboShape, Vec2};

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectangle {
    /// Top-left corner position.
    pub origin: Point,
    /// Width of the rectangle.
    pub width: f64,
    /// Height of the rectangle.
    pub height: f64,
}

impl Rectangle {
    /// Create a new rectangle. Negative sizes are clamped to zero.
    pub fn new(origin: Point, width: f64, height: f64) -> Self {
        Self {
            origin,
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    /// Create a rectangle from two corner points, in either order.
    pub fn from_corners(p1: Point, p2: Point) -> Self {
        let min_x = p1.x.min(p2.x);
        let min_y = p1.y.min(p2.y);
        let width = (p2.x - p1.x).abs();
        let height = (p2.y - p1.y).abs();

        Self::new(Point::new(min_x, min_y), width, height)
    }

    /// Get the rectangle as a kurbo Rect.
    pub fn as_rect(&self) -> Rect {
        Rect::new(
            self.origin.x,
            self.origin.y,
            self.origin.x + self.width,
            self.origin.y + self.height,
        )
    }
}

impl ShapeGeometry for Rectangle {
    fn bounds(&self) -> Rect {
        self.as_rect()
    }

    fn contains(&self, point: Point, tolerance: f64) -> bool {
        rect_contains(self.as_rect().inflate(tolerance, tolerance), point)
    }

    fn to_path(&self) -> BezPath {
        self.as_rect().to_path(0.1)
    }

    fn translate(&mut self, delta: Vec2) {
        self.origin += delta;
    }

    fn anchor(&self) -> Point {
        self.origin
    }

    fn resize_by(&mut self, delta: Vec2) {
        self.width = (self.width + delta.x).max(MIN_RESIZED_SIZE);
        self.height = (self.height + delta.y).max(MIN_RESIZED_SIZE);
    }
}
