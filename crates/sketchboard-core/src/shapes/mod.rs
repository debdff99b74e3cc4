//! Shape definitions for the drawing surface.

mod circle;
mod ellipse;
mod freehand;
mod line;
mod rectangle;
mod square;
mod triangle;

pub use circle::Circle;
pub use ellipse::Ellipse;
pub use freehand::Freehand;
pub use line::Line;
pub use rectangle::Rectangle;
pub use square::Square;
pub use triangle::Triangle;

use kurbo::{BezPath, Point, Rect, Vec2};
use peniko::Color;
use peniko::color::{Srgb, parse_color};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for shapes, assigned by the persistence service.
pub type ShapeId = Uuid;

/// Smallest size a resize may shrink a dimension to.
pub(crate) const MIN_RESIZED_SIZE: f64 = 1.0;

/// Stroke and fill attributes shared by every shape.
///
/// Colors are kept as the CSS strings carried on the wire and are only
/// parsed when a renderer asks for them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeStyle {
    /// Stroke color.
    pub stroke_color: String,
    /// Fill color. `None`, `"none"` and `"transparent"` all mean not filled.
    pub fill_color: Option<String>,
    /// Stroke width.
    pub stroke_width: f64,
}

impl ShapeStyle {
    pub const DEFAULT_STROKE_COLOR: &'static str = "#000000";
    pub const DEFAULT_STROKE_WIDTH: f64 = 2.0;

    /// Create a style with the given stroke color, no fill and the default width.
    pub fn new(stroke_color: impl Into<String>) -> Self {
        Self {
            stroke_color: stroke_color.into(),
            fill_color: None,
            stroke_width: Self::DEFAULT_STROKE_WIDTH,
        }
    }

    /// Set the fill color.
    pub fn with_fill(mut self, fill_color: Option<String>) -> Self {
        self.fill_color = fill_color;
        self
    }

    /// Set the stroke width.
    pub fn with_stroke_width(mut self, stroke_width: f64) -> Self {
        self.stroke_width = stroke_width;
        self
    }

    /// Whether the fill color names an actual paint.
    pub fn is_filled(&self) -> bool {
        is_paint(self.fill_color.as_deref())
    }

    /// Get the stroke color as a peniko Color (black if unparsable).
    pub fn stroke(&self) -> Color {
        css_color(&self.stroke_color).unwrap_or_else(|| {
            log::warn!("Unparsable stroke color {:?}, using black", self.stroke_color);
            Color::from_rgba8(0, 0, 0, 255)
        })
    }

    /// Get the fill color as a peniko Color, if the shape is filled.
    pub fn fill(&self) -> Option<Color> {
        if !self.is_filled() {
            return None;
        }
        let fill = self.fill_color.as_deref()?;
        let color = css_color(fill);
        if color.is_none() {
            log::warn!("Unparsable fill color {:?}, leaving shape unfilled", fill);
        }
        color
    }
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self::new(Self::DEFAULT_STROKE_COLOR)
    }
}

/// True unless the color is absent, empty, `none` or `transparent`.
pub fn is_paint(color: Option<&str>) -> bool {
    match color.map(str::trim) {
        None | Some("") => false,
        Some(c) => !c.eq_ignore_ascii_case("none") && !c.eq_ignore_ascii_case("transparent"),
    }
}

/// Parse a CSS color string.
pub fn css_color(css: &str) -> Option<Color> {
    parse_color(css.trim())
        .ok()
        .map(|color| color.to_alpha_color::<Srgb>())
}

/// Shape variant tag, as carried in the `type` field of a shape record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Circle,
    Rectangle,
    Square,
    Ellipse,
    Line,
    Triangle,
    Freehand,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 7] = [
        ShapeKind::Circle,
        ShapeKind::Rectangle,
        ShapeKind::Square,
        ShapeKind::Ellipse,
        ShapeKind::Line,
        ShapeKind::Triangle,
        ShapeKind::Freehand,
    ];

    /// Wire tag for this variant.
    pub fn tag(self) -> &'static str {
        match self {
            ShapeKind::Circle => "circle",
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Square => "square",
            ShapeKind::Ellipse => "ellipse",
            ShapeKind::Line => "line",
            ShapeKind::Triangle => "triangle",
            ShapeKind::Freehand => "freehand",
        }
    }

    /// Look up a variant by its wire tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    /// Whether the variant encloses an area that can be filled.
    pub fn is_closed(self) -> bool {
        !matches!(self, ShapeKind::Line | ShapeKind::Freehand)
    }
}

/// Common geometry operations implemented by every variant.
pub trait ShapeGeometry {
    /// Axis-aligned bounding box.
    fn bounds(&self) -> Rect;

    /// Precise containment test, `tolerance` pixels of slack.
    fn contains(&self, point: Point, tolerance: f64) -> bool;

    /// Path representation for rendering.
    fn to_path(&self) -> BezPath;

    /// Translate every coordinate.
    fn translate(&mut self, delta: Vec2);

    /// The point a paste relocates onto the click position.
    fn anchor(&self) -> Point;

    /// Grow the shape by dragging its bottom-right corner.
    fn resize_by(&mut self, delta: Vec2);
}

/// Variant-specific geometry. Each variant carries exactly its own fields.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Circle(Circle),
    Rectangle(Rectangle),
    Square(Square),
    Ellipse(Ellipse),
    Line(Line),
    Triangle(Triangle),
    Freehand(Freehand),
}

impl Geometry {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Geometry::Circle(_) => ShapeKind::Circle,
            Geometry::Rectangle(_) => ShapeKind::Rectangle,
            Geometry::Square(_) => ShapeKind::Square,
            Geometry::Ellipse(_) => ShapeKind::Ellipse,
            Geometry::Line(_) => ShapeKind::Line,
            Geometry::Triangle(_) => ShapeKind::Triangle,
            Geometry::Freehand(_) => ShapeKind::Freehand,
        }
    }

    fn as_dyn(&self) -> &dyn ShapeGeometry {
        match self {
            Geometry::Circle(g) => g,
            Geometry::Rectangle(g) => g,
            Geometry::Square(g) => g,
            Geometry::Ellipse(g) => g,
            Geometry::Line(g) => g,
            Geometry::Triangle(g) => g,
            Geometry::Freehand(g) => g,
        }
    }

    fn as_dyn_mut(&mut self) -> &mut dyn ShapeGeometry {
        match self {
            Geometry::Circle(g) => g,
            Geometry::Rectangle(g) => g,
            Geometry::Square(g) => g,
            Geometry::Ellipse(g) => g,
            Geometry::Line(g) => g,
            Geometry::Triangle(g) => g,
            Geometry::Freehand(g) => g,
        }
    }

    pub fn bounds(&self) -> Rect {
        self.as_dyn().bounds()
    }

    pub fn contains(&self, point: Point, tolerance: f64) -> bool {
        self.as_dyn().contains(point, tolerance)
    }

    pub fn to_path(&self) -> BezPath {
        self.as_dyn().to_path()
    }

    pub fn anchor(&self) -> Point {
        self.as_dyn().anchor()
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.as_dyn_mut().translate(delta);
    }

    pub fn resize_by(&mut self, delta: Vec2) {
        self.as_dyn_mut().resize_by(delta);
    }
}

/// An uncommitted shape: geometry and style, no identity yet.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeDraft {
    pub geometry: Geometry,
    pub style: ShapeStyle,
}

impl ShapeDraft {
    pub fn new(geometry: Geometry, style: ShapeStyle) -> Self {
        Self { geometry, style }
    }

    pub fn kind(&self) -> ShapeKind {
        self.geometry.kind()
    }

    /// Give the draft its identity.
    pub fn into_shape(self, id: ShapeId) -> Shape {
        Shape::new(id, self.geometry, self.style)
    }
}

/// A committed shape as known to the persistence service.
///
/// The variant is fixed at construction; geometry can only be changed in
/// place by the crate's reference backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    id: ShapeId,
    geometry: Geometry,
    style: ShapeStyle,
    selected: bool,
}

impl Shape {
    pub fn new(id: ShapeId, geometry: Geometry, style: ShapeStyle) -> Self {
        Self {
            id,
            geometry,
            style,
            selected: false,
        }
    }

    /// Mark the shape as selected (as reported by the server).
    pub fn with_selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    pub fn id(&self) -> ShapeId {
        self.id
    }

    pub fn kind(&self) -> ShapeKind {
        self.geometry.kind()
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn style(&self) -> &ShapeStyle {
        &self.style
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn bounds(&self) -> Rect {
        self.geometry.bounds()
    }

    pub(crate) fn set_id(&mut self, id: ShapeId) {
        self.id = id;
    }

    pub(crate) fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    pub(crate) fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }

    pub(crate) fn translate(&mut self, delta: Vec2) {
        self.geometry.translate(delta);
    }

    pub(crate) fn resize_by(&mut self, delta: Vec2) {
        self.geometry.resize_by(delta);
    }
}

/// Inclusive containment; kurbo's `Rect::contains` excludes the far edges.
pub fn rect_contains(rect: Rect, point: Point) -> bool {
    point.x >= rect.x0 && point.x <= rect.x1 && point.y >= rect.y0 && point.y <= rect.y1
}

/// Bounding box of a point set, or `Rect::ZERO` when empty.
pub fn points_bounds(points: &[Point]) -> Rect {
    let Some(first) = points.first() else {
        return Rect::ZERO;
    };
    points
        .iter()
        .skip(1)
        .fold(Rect::from_points(*first, *first), |rect, p| rect.union_pt(*p))
}

/// Distance from a point to a line segment (a→b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    point.distance(a + seg * t)
}

/// Minimum distance from a point to a polyline (sequence of connected segments).
pub fn point_to_polyline_dist(point: Point, points: &[Point]) -> f64 {
    points
        .windows(2)
        .map(|w| point_to_segment_dist(point, w[0], w[1]))
        .fold(f64::INFINITY, f64::min)
}

/// Scale points about `origin` so the box `bounds` grows by `delta` at its
/// bottom-right corner. Degenerate axes are left unscaled.
pub(crate) fn scale_from_corner(points: &mut [Point], bounds: Rect, delta: Vec2) {
    let scale = |size: f64, grow: f64| {
        if size < f64::EPSILON {
            1.0
        } else {
            (size + grow).max(MIN_RESIZED_SIZE) / size
        }
    };
    let sx = scale(bounds.width(), delta.x);
    let sy = scale(bounds.height(), delta.y);
    for p in points.iter_mut() {
        p.x = bounds.x0 + (p.x - bounds.x0) * sx;
        p.y = bounds.y0 + (p.y - bounds.y0) * sy;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_paint() {
        assert!(!is_paint(None));
        assert!(!is_paint(Some("")));
        assert!(!is_paint(Some("none")));
        assert!(!is_paint(Some("Transparent")));
        assert!(is_paint(Some("#ff0000")));
    }

    #[test]
    fn test_style_fill() {
        let style = ShapeStyle::default().with_fill(Some("transparent".to_string()));
        assert!(!style.is_filled());
        assert!(style.fill().is_none());

        let style = ShapeStyle::default().with_fill(Some("#00ff00".to_string()));
        let fill = style.fill().unwrap().to_rgba8();
        assert_eq!((fill.r, fill.g, fill.b, fill.a), (0, 255, 0, 255));
    }

    #[test]
    fn test_unparsable_stroke_falls_back_to_black() {
        let style = ShapeStyle::new("not-a-color");
        let stroke = style.stroke().to_rgba8();
        assert_eq!((stroke.r, stroke.g, stroke.b, stroke.a), (0, 0, 0, 255));
    }

    #[test]
    fn test_kind_tags() {
        for kind in ShapeKind::ALL {
            assert_eq!(ShapeKind::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(ShapeKind::from_tag("hexagon"), None);
        assert!(!ShapeKind::Line.is_closed());
        assert!(ShapeKind::Triangle.is_closed());
    }

    #[test]
    fn test_points_bounds() {
        assert_eq!(points_bounds(&[]), Rect::ZERO);
        let bounds = points_bounds(&[Point::new(3.0, 4.0), Point::new(-1.0, 10.0)]);
        assert_eq!(bounds, Rect::new(-1.0, 4.0, 3.0, 10.0));
    }

    #[test]
    fn test_point_to_segment_dist() {
        let d = point_to_segment_dist(Point::new(5.0, 3.0), Point::ZERO, Point::new(10.0, 0.0));
        assert!((d - 3.0).abs() < f64::EPSILON);
        // Beyond the end the distance is to the endpoint.
        let d = point_to_segment_dist(Point::new(13.0, 4.0), Point::ZERO, Point::new(10.0, 0.0));
        assert!((d - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_shape_draft_into_shape() {
        let draft = ShapeDraft::new(
            Geometry::Circle(Circle::new(Point::new(1.0, 2.0), 3.0)),
            ShapeStyle::default(),
        );
        let id = Uuid::new_v4();
        let shape = draft.into_shape(id);
        assert_eq!(shape.id(), id);
        assert_eq!(shape.kind(), ShapeKind::Circle);
        assert!(!shape.is_selected());
    }
}
