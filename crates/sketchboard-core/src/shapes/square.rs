//! Square shape.

use super::{MIN_RESIZED_SIZE, ShapeGeometry, rect_contains};
use kurbo::{BezPath, Point, Rect, Shape as KurboShape, Vec2};

/// An axis-aligned square.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Square {
    /// Top-left corner position.
    pub origin: Point,
    /// Side length, used for both width and height.
    pub side: f64,
}

impl Square {
    /// Create a new square. Negative sides are clamped to zero.
    pub fn new(origin: Point, side: f64) -> Self {
        Self {
            origin,
            side: side.max(0.0),
        }
    }

    /// Square for a drag from `start` to `end`.
    ///
    /// The side is the larger of the two drag extents and the square grows
    /// away from the start corner in the direction of the drag, so it never
    /// flips across the point where the drag began.
    pub fn from_drag(start: Point, end: Point) -> Self {
        let side = (end.x - start.x).abs().max((end.y - start.y).abs());
        let x = if end.x < start.x { start.x - side } else { start.x };
        let y = if end.y < start.y { start.y - side } else { start.y };
        Self::new(Point::new(x, y), side)
    }

    pub fn as_rect(&self) -> Rect {
        Rect::new(
            self.origin.x,
            self.origin.y,
            self.origin.x + self.side,
            self.origin.y + self.side,
        )
    }
}

impl ShapeGeometry for Square {
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
        self.side = (self.side + delta.x.max(delta.y)).max(MIN_RESIZED_SIZE);
    }
}
