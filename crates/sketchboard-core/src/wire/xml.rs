//! Markup encoding of a scene: a `<drawing>` element holding one `<shape>`
//! per record. Scalar record fields become attributes; freehand points
//! become `<point x=".." y=".."/>` children.

use super::{
    CodecError, KEY_COLOR, KEY_FILL_COLOR, KEY_ID, KEY_POINTS, KEY_SELECTED, KEY_TYPE, KEY_X, KEY_Y,
};
use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use serde_json::{Map, Number, Value};
use std::fmt::Display;

const DRAWING_TAG: &str = "drawing";
const SHAPE_TAG: &str = "shape";
const POINT_TAG: &str = "point";

/// Attributes that always stay strings, even when they look numeric.
const STRING_KEYS: [&str; 4] = [KEY_TYPE, KEY_ID, KEY_COLOR, KEY_FILL_COLOR];

fn xml_err(e: impl Display) -> CodecError {
    CodecError::Xml(e.to_string())
}

fn tag_name(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Write scene records as an XML document.
pub(super) fn write_drawing(records: &[Value]) -> Result<Vec<u8>, CodecError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml_err)?;
    writer
        .write_event(Event::Start(BytesStart::new(DRAWING_TAG)))
        .map_err(xml_err)?;

    for record in records {
        let Value::Object(map) = record else {
            return Err(CodecError::Xml("shape record is not an object".to_string()));
        };
        write_shape(&mut writer, map)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new(DRAWING_TAG)))
        .map_err(xml_err)?;
    Ok(writer.into_inner())
}

fn write_shape(writer: &mut Writer<Vec<u8>>, map: &Map<String, Value>) -> Result<(), CodecError> {
    let mut elem = BytesStart::new(SHAPE_TAG);
    for (key, value) in map {
        if let Some(text) = scalar_text(value) {
            elem.push_attribute((key.as_str(), text.as_str()));
        }
    }

    let points = match map.get(KEY_POINTS) {
        Some(Value::Array(points)) if !points.is_empty() => points,
        _ => {
            writer.write_event(Event::Empty(elem)).map_err(xml_err)?;
            return Ok(());
        }
    };

    writer.write_event(Event::Start(elem)).map_err(xml_err)?;
    for point in points {
        let mut point_elem = BytesStart::new(POINT_TAG);
        for key in [KEY_X, KEY_Y] {
            if let Some(text) = point.get(key).and_then(scalar_text) {
                point_elem.push_attribute((key, text.as_str()));
            }
        }
        writer.write_event(Event::Empty(point_elem)).map_err(xml_err)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(SHAPE_TAG)))
        .map_err(xml_err)?;
    Ok(())
}

fn attribute_value(key: &str, raw: &str) -> Value {
    if STRING_KEYS.contains(&key) {
        return Value::String(raw.to_string());
    }
    if key == KEY_SELECTED {
        if let Ok(flag) = raw.parse::<bool>() {
            return Value::Bool(flag);
        }
    }
    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map_or_else(|| Value::String(raw.to_string()), Value::Number)
}

fn read_attributes(e: &BytesStart) -> Result<Map<String, Value>, CodecError> {
    let mut map = Map::new();
    for attr in e.attributes() {
        let attr = attr.map_err(xml_err)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let raw = attr.unescape_value().map_err(xml_err)?;
        let value = attribute_value(&key, &raw);
        map.insert(key, value);
    }
    Ok(map)
}

fn push_point(shape: Option<&mut Map<String, Value>>, e: &BytesStart) -> Result<(), CodecError> {
    let Some(shape) = shape else {
        return Err(CodecError::Xml("<point> outside of <shape>".to_string()));
    };
    let point = read_attributes(e)?;
    if let Value::Array(points) = shape
        .entry(KEY_POINTS)
        .or_insert_with(|| Value::Array(Vec::new()))
    {
        points.push(Value::Object(point));
    }
    Ok(())
}

/// Parse an XML document back into scene records.
pub(super) fn read_drawing(payload: &[u8]) -> Result<Vec<Value>, CodecError> {
    let text = std::str::from_utf8(payload).map_err(xml_err)?;
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut records = Vec::new();
    let mut current: Option<Map<String, Value>> = None;
    let mut saw_root = false;

    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(e) => match tag_name(&e).as_str() {
                DRAWING_TAG => saw_root = true,
                SHAPE_TAG => current = Some(read_attributes(&e)?),
                POINT_TAG => push_point(current.as_mut(), &e)?,
                _ => {}
            },
            Event::Empty(e) => match tag_name(&e).as_str() {
                DRAWING_TAG => saw_root = true,
                SHAPE_TAG => records.push(Value::Object(read_attributes(&e)?)),
                POINT_TAG => push_point(current.as_mut(), &e)?,
                _ => {}
            },
            Event::End(e) => {
                if e.name().as_ref() == SHAPE_TAG.as_bytes() {
                    if let Some(shape) = current.take() {
                        records.push(Value::Object(shape));
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_root {
        return Err(CodecError::Xml(format!("missing <{}> root element", DRAWING_TAG)));
    }
    Ok(records)
}
