//! Ellipse shape.

use super::{MIN_RESIZED_SIZE, ShapeGeometry};
use kurbo::{BezPath, Ellipse as KurboEllipse, Point, Rect, Shape as KurboShape, Vec2};

/// An axis-aligned ellipse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipse {
    /// Center point.
    pub center: Point,
    /// Horizontal radius.
    pub radius_x: f64,
    /// Vertical radius.
    pub radius_y: f64,
}

impl Ellipse {
    /// Create a new ellipse. Negative radii are clamped to zero.
    pub fn new(center: Point, radius_x: f64, radius_y: f64) -> Self {
        Self {
            center,
            radius_x: radius_x.max(0.0),
            radius_y: radius_y.max(0.0),
        }
    }

    /// Create an ellipse inscribed in a bounding rectangle.
    pub fn from_rect(rect: Rect) -> Self {
        Self::new(rect.center(), rect.width() / 2.0, rect.height() / 2.0)
    }

    /// Ellipse inscribed in the box spanned by a drag, in either direction.
    pub fn from_drag(start: Point, end: Point) -> Self {
        Self::from_rect(Rect::from_points(start, end))
    }

    /// Get as a kurbo Ellipse.
    pub fn as_kurbo(&self) -> KurboEllipse {
        KurboEllipse::new(self.center, (self.radius_x, self.radius_y), 0.0)
    }
}

impl ShapeGeometry for Ellipse {
    fn bounds(&self) -> Rect {
        Rect::new(
            self.center.x - self.radius_x,
            self.center.y - self.radius_y,
            self.center.x + self.radius_x,
            self.center.y + self.radius_y,
        )
    }

    fn contains(&self, point: Point, tolerance: f64) -> bool {
        let rx = self.radius_x + tolerance;
        let ry = self.radius_y + tolerance;
        if rx <= 0.0 || ry <= 0.0 {
            return false;
        }
        let dx = (point.x - self.center.x) / rx;
        let dy = (point.y - self.center.y) / ry;
        dx * dx + dy * dy <= 1.0
    }

    fn to_path(&self) -> BezPath {
        self.as_kurbo().to_path(0.1)
    }

    fn translate(&mut self, delta: Vec2) {
        self.center += delta;
    }

    fn anchor(&self) -> Point {
        self.center
    }

    fn resize_by(&mut self, delta: Vec2) {
        self.radius_x = (self.radius_x + delta.x).max(MIN_RESIZED_SIZE);
        self.radius_y = (self.radius_y + delta.y).max(MIN_RESIZED_SIZE);
    }
}
