//! Geometry engine: bounding boxes, hit testing and the resize handle.
//!
//! Everything here is a pure function over shapes. The tool machine uses it
//! for hit testing and handle detection, the renderer for selection
//! decorations, and both share [`construct`] so a live preview always
//! matches the shape that gets committed.

use crate::shapes::{
    Circle, Ellipse, Freehand, Geometry, Line, Rectangle, Shape, ShapeKind, Square, Triangle,
    rect_contains,
};
use kurbo::{Point, Rect};

/// Axis-aligned bounding box of a committed shape.
pub fn bounding_box(shape: &Shape) -> Rect {
    shape.bounds()
}

/// Topmost shape whose bounding box, grown by `tolerance` on every side,
/// contains `point`. Shapes are scanned in reverse paint order.
pub fn hit_test(point: Point, shapes: &[Shape], tolerance: f64) -> Option<&Shape> {
    shapes
        .iter()
        .rev()
        .find(|shape| rect_contains(shape.bounds().inflate(tolerance, tolerance), point))
}

/// Bounding box grown by `margin`; the dashed selection outline.
pub fn selection_outline(shape: &Shape, margin: f64) -> Rect {
    shape.bounds().inflate(margin, margin)
}

/// The bottom-right resize handle, `margin` beyond the bounding box corner.
pub fn resize_handle_position(shape: &Shape, margin: f64) -> Point {
    let bounds = shape.bounds();
    Point::new(bounds.x1 + margin, bounds.y1 + margin)
}

/// Square of half-size `half_size` centered on the resize handle.
pub fn handle_rect(shape: &Shape, margin: f64, half_size: f64) -> Rect {
    Rect::from_center_size(
        resize_handle_position(shape, margin),
        (half_size * 2.0, half_size * 2.0),
    )
}

/// Check if a point falls on the resize handle of `shape`.
pub fn handle_hit(point: Point, shape: &Shape, margin: f64, half_size: f64) -> bool {
    rect_contains(handle_rect(shape, margin, half_size), point)
}

/// Build the geometry a drag from `start` to `end` produces for `kind`.
///
/// Freehand strokes take their points from `points`; an empty buffer falls
/// back to the single start point so a committed stroke is never empty.
pub fn construct(kind: ShapeKind, start: Point, end: Point, points: &[Point]) -> Geometry {
    match kind {
        ShapeKind::Circle => Geometry::Circle(Circle::from_drag(start, end)),
        ShapeKind::Rectangle => Geometry::Rectangle(Rectangle::from_corners(start, end)),
        ShapeKind::Square => Geometry::Square(Square::from_drag(start, end)),
        ShapeKind::Ellipse => Geometry::Ellipse(Ellipse::from_drag(start, end)),
        ShapeKind::Line => Geometry::Line(Line::new(start, end)),
        ShapeKind::Triangle => Geometry::Triangle(Triangle::from_drag(start, end)),
        ShapeKind::Freehand => {
            let points = if points.is_empty() {
                vec![start]
            } else {
                points.to_vec()
            };
            Geometry::Freehand(Freehand::from_points(points))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{ShapeGeometry, ShapeStyle};
    use kurbo::Vec2;
    use uuid::Uuid;

    fn shape(geometry: Geometry) -> Shape {
        Shape::new(Uuid::new_v4(), geometry, ShapeStyle::default())
    }

    fn sample_geometries() -> Vec<Geometry> {
        let start = Point::new(10.0, 20.0);
        let end = Point::new(70.0, 50.0);
        let points = [start, Point::new(30.0, 60.0), end];
        ShapeKind::ALL
            .into_iter()
            .map(|kind| construct(kind, start, end, &points))
            .collect()
    }

    #[test]
    fn test_bounding_box_translation_consistent() {
        let delta = Vec2::new(13.0, -7.0);
        for geometry in sample_geometries() {
            let before = bounding_box(&shape(geometry.clone()));
            let mut moved = geometry.clone();
            moved.translate(delta);
            let after = bounding_box(&shape(moved));

            assert!((after.x0 - (before.x0 + delta.x)).abs() < 1e-9, "{:?}", geometry.kind());
            assert!((after.y0 - (before.y0 + delta.y)).abs() < 1e-9, "{:?}", geometry.kind());
            assert!((after.width() - before.width()).abs() < 1e-9);
            assert!((after.height() - before.height()).abs() < 1e-9);
        }
    }

    #[test]
    fn test_bounding_box_per_variant() {
        let circle = shape(Geometry::Circle(Circle::new(Point::new(50.0, 50.0), 10.0)));
        assert_eq!(bounding_box(&circle), Rect::new(40.0, 40.0, 60.0, 60.0));

        let ellipse = shape(Geometry::Ellipse(Ellipse::new(Point::new(0.0, 0.0), 20.0, 5.0)));
        assert_eq!(bounding_box(&ellipse), Rect::new(-20.0, -5.0, 20.0, 5.0));

        let square = shape(Geometry::Square(Square::new(Point::new(1.0, 2.0), 3.0)));
        assert_eq!(bounding_box(&square), Rect::new(1.0, 2.0, 4.0, 5.0));

        let empty = shape(Geometry::Freehand(Freehand::default()));
        assert_eq!(bounding_box(&empty), Rect::ZERO);
    }

    #[test]
    fn test_hit_test_returns_topmost() {
        let rect = Rectangle::new(Point::new(0.0, 0.0), 50.0, 50.0);
        let a = shape(Geometry::Rectangle(rect));
        let b = shape(Geometry::Rectangle(rect));
        let b_id = b.id();
        let shapes = vec![a, b];

        let hit = hit_test(Point::new(25.0, 25.0), &shapes, 5.0);
        assert_eq!(hit.map(Shape::id), Some(b_id));
    }

    #[test]
    fn test_hit_test_tolerance() {
        let shapes = vec![shape(Geometry::Rectangle(Rectangle::new(
            Point::new(0.0, 0.0),
            10.0,
            10.0,
        )))];

        assert!(hit_test(Point::new(14.0, 5.0), &shapes, 5.0).is_some());
        assert!(hit_test(Point::new(15.0, 15.0), &shapes, 5.0).is_some());
        assert!(hit_test(Point::new(16.0, 5.0), &shapes, 5.0).is_none());
        assert!(hit_test(Point::new(5.0, 5.0), &[], 5.0).is_none());
    }

    #[test]
    fn test_resize_handle() {
        let rect = shape(Geometry::Rectangle(Rectangle::new(
            Point::new(10.0, 10.0),
            20.0,
            30.0,
        )));

        assert_eq!(resize_handle_position(&rect, 5.0), Point::new(35.0, 45.0));
        assert!(handle_hit(Point::new(35.0, 45.0), &rect, 5.0, 5.0));
        assert!(handle_hit(Point::new(40.0, 40.0), &rect, 5.0, 5.0));
        assert!(!handle_hit(Point::new(41.0, 45.0), &rect, 5.0, 5.0));
        assert!(!handle_hit(Point::new(20.0, 20.0), &rect, 5.0, 5.0));
    }

    #[test]
    fn test_selection_outline() {
        let circle = shape(Geometry::Circle(Circle::new(Point::new(50.0, 50.0), 10.0)));
        assert_eq!(selection_outline(&circle, 5.0), Rect::new(35.0, 35.0, 65.0, 65.0));
    }

    #[test]
    fn test_construct_triangle_rule() {
        let geometry = construct(
            ShapeKind::Triangle,
            Point::new(0.0, 0.0),
            Point::new(40.0, 20.0),
            &[],
        );
        let Geometry::Triangle(triangle) = geometry else {
            panic!("expected triangle");
        };
        assert_eq!(
            triangle.vertices,
            [Point::new(20.0, 0.0), Point::new(0.0, 20.0), Point::new(40.0, 20.0)]
        );
    }

    #[test]
    fn test_construct_square_grows_away_from_start() {
        let geometry = construct(
            ShapeKind::Square,
            Point::new(100.0, 100.0),
            Point::new(80.0, 70.0),
            &[],
        );
        let Geometry::Square(square) = geometry else {
            panic!("expected square");
        };
        assert_eq!(square.origin, Point::new(70.0, 70.0));
        assert!((square.side - 30.0).abs() < f64::EPSILON);
        // The start corner stays a corner of the square.
        assert_eq!(square.bounds().x1, 100.0);
        assert_eq!(square.bounds().y1, 100.0);
    }

    #[test]
    fn test_construct_freehand_never_empty() {
        let start = Point::new(3.0, 4.0);
        let Geometry::Freehand(freehand) = construct(ShapeKind::Freehand, start, start, &[]) else {
            panic!("expected freehand");
        };
        assert_eq!(freehand.points, vec![start]);
    }

    #[test]
    fn test_construct_zero_area_is_valid() {
        let p = Point::new(5.0, 5.0);
        for kind in ShapeKind::ALL {
            let geometry = construct(kind, p, p, &[p]);
            assert_eq!(geometry.kind(), kind);
            assert_eq!(geometry.bounds().width(), 0.0);
        }
    }
}
