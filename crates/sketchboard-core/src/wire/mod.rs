//! Shape record codec.
//!
//! The persistence service speaks in flat JSON records: a `type` tag, an
//! `id`, the common style fields and whichever geometry fields the variant
//! owns. This module maps those records onto [`Shape`] and back, and encodes
//! whole scenes for export.

mod xml;

use crate::shapes::{
    Circle, Ellipse, Freehand, Geometry, Line, Rectangle, Shape, ShapeId, ShapeKind, ShapeStyle, Square,
    Triangle,
};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

// Common keys
pub(crate) const KEY_TYPE: &str = "type";
pub(crate) const KEY_ID: &str = "id";
pub(crate) const KEY_X: &str = "x";
pub(crate) const KEY_Y: &str = "y";

// Style keys
pub(crate) const KEY_COLOR: &str = "color";
pub(crate) const KEY_FILL_COLOR: &str = "fillColor";
pub(crate) const KEY_STROKE_WIDTH: &str = "strokeWidth";
pub(crate) const KEY_SELECTED: &str = "selected";

// Circle keys
const KEY_RADIUS: &str = "radius";

// Rectangle keys
const KEY_WIDTH: &str = "width";
const KEY_HEIGHT: &str = "height";

// Square keys
const KEY_SIDE_LENGTH: &str = "sideLength";

// Ellipse keys
const KEY_RADIUS_X: &str = "radiusX";
const KEY_RADIUS_Y: &str = "radiusY";

// Line/Triangle keys
const KEY_X2: &str = "x2";
const KEY_Y2: &str = "y2";
const KEY_X3: &str = "x3";
const KEY_Y3: &str = "y3";

// Freehand keys
pub(crate) const KEY_POINTS: &str = "points";

/// Why a single shape record could not be decoded.
#[derive(Debug, Error, PartialEq)]
pub enum DecodeError {
    #[error("Shape record is not an object")]
    NotAnObject,
    #[error("Missing or non-numeric field `{0}`")]
    MissingField(&'static str),
    #[error("Unknown shape type `{0}`")]
    UnknownType(String),
    /// Ids must be UUID strings.
    #[error("Invalid shape id `{0}`, expected a UUID string")]
    InvalidId(String),
    #[error("Negative size in field `{0}`")]
    NegativeSize(&'static str),
    #[error("Freehand record has no points")]
    EmptyFreehand,
}

/// Errors encoding or decoding an export payload.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("XML error: {0}")]
    Xml(String),
    #[error("Payload is not a list of shape records")]
    NotAList,
    #[error("Unknown export format `{0}`")]
    UnknownFormat(String),
}

/// Encoding used by export and import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Pretty-printed JSON array of shape records.
    #[default]
    Json,
    /// `<drawing>` document of `<shape>` elements.
    Xml,
}

impl ExportFormat {
    /// Conventional file extension.
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Xml => "xml",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "xml" => Ok(ExportFormat::Xml),
            other => Err(CodecError::UnknownFormat(other.to_string())),
        }
    }
}

// Helper functions to extract values from a record
fn get_double(map: &Map<String, Value>, key: &'static str) -> Result<f64, DecodeError> {
    map.get(key)
        .and_then(Value::as_f64)
        .ok_or(DecodeError::MissingField(key))
}

fn get_size(map: &Map<String, Value>, key: &'static str) -> Result<f64, DecodeError> {
    let value = get_double(map, key)?;
    if value < 0.0 {
        return Err(DecodeError::NegativeSize(key));
    }
    Ok(value)
}

fn get_point(map: &Map<String, Value>, x: &'static str, y: &'static str) -> Result<Point, DecodeError> {
    Ok(Point::new(get_double(map, x)?, get_double(map, y)?))
}

fn get_string<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    map.get(key).and_then(Value::as_str)
}

fn get_bool(map: &Map<String, Value>, key: &str) -> Option<bool> {
    map.get(key).and_then(Value::as_bool)
}

fn decode_points(map: &Map<String, Value>) -> Result<Vec<Point>, DecodeError> {
    let Some(Value::Array(raw)) = map.get(KEY_POINTS) else {
        return Err(DecodeError::MissingField(KEY_POINTS));
    };
    raw.iter()
        .map(|point| match point {
            Value::Object(p) => get_point(p, KEY_X, KEY_Y),
            _ => Err(DecodeError::MissingField(KEY_POINTS)),
        })
        .collect()
}

fn decode_geometry(kind: ShapeKind, map: &Map<String, Value>) -> Result<Geometry, DecodeError> {
    let geometry = match kind {
        ShapeKind::Circle => Geometry::Circle(Circle::new(
            get_point(map, KEY_X, KEY_Y)?,
            get_size(map, KEY_RADIUS)?,
        )),
        ShapeKind::Rectangle => Geometry::Rectangle(Rectangle::new(
            get_point(map, KEY_X, KEY_Y)?,
            get_size(map, KEY_WIDTH)?,
            get_size(map, KEY_HEIGHT)?,
        )),
        ShapeKind::Square => Geometry::Square(Square::new(
            get_point(map, KEY_X, KEY_Y)?,
            get_size(map, KEY_SIDE_LENGTH)?,
        )),
        ShapeKind::Ellipse => Geometry::Ellipse(Ellipse::new(
            get_point(map, KEY_X, KEY_Y)?,
            get_size(map, KEY_RADIUS_X)?,
            get_size(map, KEY_RADIUS_Y)?,
        )),
        ShapeKind::Line => Geometry::Line(Line::new(
            get_point(map, KEY_X, KEY_Y)?,
            get_point(map, KEY_X2, KEY_Y2)?,
        )),
        ShapeKind::Triangle => Geometry::Triangle(Triangle::new(
            get_point(map, KEY_X, KEY_Y)?,
            get_point(map, KEY_X2, KEY_Y2)?,
            get_point(map, KEY_X3, KEY_Y3)?,
        )),
        ShapeKind::Freehand => {
            let points = decode_points(map)?;
            if points.is_empty() {
                return Err(DecodeError::EmptyFreehand);
            }
            Geometry::Freehand(Freehand::from_points(points))
        }
    };
    Ok(geometry)
}

fn decode_style(map: &Map<String, Value>) -> ShapeStyle {
    let stroke_color = get_string(map, KEY_COLOR).unwrap_or(ShapeStyle::DEFAULT_STROKE_COLOR);
    let fill_color = get_string(map, KEY_FILL_COLOR).map(str::to_string);
    let stroke_width = map
        .get(KEY_STROKE_WIDTH)
        .and_then(Value::as_f64)
        .filter(|w| *w >= 0.0)
        .unwrap_or(ShapeStyle::DEFAULT_STROKE_WIDTH);
    ShapeStyle::new(stroke_color)
        .with_fill(fill_color)
        .with_stroke_width(stroke_width)
}

fn decode_id(map: &Map<String, Value>) -> Result<ShapeId, DecodeError> {
    match map.get(KEY_ID) {
        None | Some(Value::Null) => Err(DecodeError::MissingField(KEY_ID)),
        Some(Value::String(raw)) => {
            Uuid::parse_str(raw).map_err(|_| DecodeError::InvalidId(raw.clone()))
        }
        Some(other) => Err(DecodeError::InvalidId(other.to_string())),
    }
}

/// Decode one shape record. Only the fields owned by the record's variant
/// are read; anything else on the record is ignored.
pub fn decode_record(record: &Value) -> Result<Shape, DecodeError> {
    let Value::Object(map) = record else {
        return Err(DecodeError::NotAnObject);
    };

    let tag = get_string(map, KEY_TYPE).ok_or(DecodeError::MissingField(KEY_TYPE))?;
    let kind = ShapeKind::from_tag(tag).ok_or_else(|| DecodeError::UnknownType(tag.to_string()))?;

    let id = decode_id(map)?;

    let geometry = decode_geometry(kind, map)?;
    let selected = get_bool(map, KEY_SELECTED).unwrap_or(false);

    Ok(Shape::new(id, geometry, decode_style(map)).with_selected(selected))
}

/// Decode a scene, dropping (and logging) records that fail to decode.
pub fn decode_scene(records: &[Value]) -> Vec<Shape> {
    records
        .iter()
        .enumerate()
        .filter_map(|(index, record)| match decode_record(record) {
            Ok(shape) => Some(shape),
            Err(e) => {
                log::warn!("Dropping shape record {}: {}", index, e);
                None
            }
        })
        .collect()
}

fn point_json(point: Point) -> Value {
    let mut map = Map::new();
    map.insert(KEY_X.into(), point.x.into());
    map.insert(KEY_Y.into(), point.y.into());
    Value::Object(map)
}

fn geometry_to_record(geometry: &Geometry, map: &mut Map<String, Value>) {
    map.insert(KEY_TYPE.into(), geometry.kind().tag().into());
    let anchor = geometry.anchor();
    map.insert(KEY_X.into(), anchor.x.into());
    map.insert(KEY_Y.into(), anchor.y.into());
    match geometry {
        Geometry::Circle(circle) => {
            map.insert(KEY_RADIUS.into(), circle.radius.into());
        }
        Geometry::Rectangle(rect) => {
            map.insert(KEY_WIDTH.into(), rect.width.into());
            map.insert(KEY_HEIGHT.into(), rect.height.into());
        }
        Geometry::Square(square) => {
            map.insert(KEY_SIDE_LENGTH.into(), square.side.into());
        }
        Geometry::Ellipse(ellipse) => {
            map.insert(KEY_RADIUS_X.into(), ellipse.radius_x.into());
            map.insert(KEY_RADIUS_Y.into(), ellipse.radius_y.into());
        }
        Geometry::Line(line) => {
            map.insert(KEY_X2.into(), line.end.x.into());
            map.insert(KEY_Y2.into(), line.end.y.into());
        }
        Geometry::Triangle(triangle) => {
            let [_, b, c] = triangle.vertices;
            map.insert(KEY_X2.into(), b.x.into());
            map.insert(KEY_Y2.into(), b.y.into());
            map.insert(KEY_X3.into(), c.x.into());
            map.insert(KEY_Y3.into(), c.y.into());
        }
        Geometry::Freehand(freehand) => {
            let points = freehand.points.iter().copied().map(point_json).collect();
            map.insert(KEY_POINTS.into(), Value::Array(points));
        }
    }
}

fn style_to_record(style: &ShapeStyle, map: &mut Map<String, Value>) {
    map.insert(KEY_COLOR.into(), style.stroke_color.clone().into());
    map.insert(
        KEY_FILL_COLOR.into(),
        style.fill_color.clone().map_or(Value::Null, Value::String),
    );
    map.insert(KEY_STROKE_WIDTH.into(), style.stroke_width.into());
}

/// Encode a shape as a record.
pub fn encode_shape(shape: &Shape) -> Value {
    let mut map = Map::new();
    map.insert(KEY_ID.into(), shape.id().to_string().into());
    geometry_to_record(shape.geometry(), &mut map);
    style_to_record(shape.style(), &mut map);
    map.insert(KEY_SELECTED.into(), shape.is_selected().into());
    Value::Object(map)
}

/// Encode a whole scene in paint order.
pub fn encode_scene(shapes: &[Shape]) -> Vec<Value> {
    shapes.iter().map(encode_shape).collect()
}

/// Serialize scene records in the given export format.
pub fn export(format: ExportFormat, records: &[Value]) -> Result<Vec<u8>, CodecError> {
    match format {
        ExportFormat::Json => Ok(serde_json::to_vec_pretty(records)?),
        ExportFormat::Xml => xml::write_drawing(records),
    }
}

/// Parse an export payload back into scene records.
pub fn import(format: ExportFormat, payload: &[u8]) -> Result<Vec<Value>, CodecError> {
    match format {
        ExportFormat::Json => match serde_json::from_slice(payload)? {
            Value::Array(records) => Ok(records),
            _ => Err(CodecError::NotAList),
        },
        ExportFormat::Xml => xml::read_drawing(payload),
    }
}
