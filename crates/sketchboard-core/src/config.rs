//! Editor configuration.

use crate::shapes::ShapeStyle;
use crate::tools::ToolKind;
use serde::{Deserialize, Serialize};

/// Default pointer slack for hit testing, in pixels.
pub const DEFAULT_HIT_TOLERANCE: f64 = 5.0;
/// Default gap between a shape's bounding box and its selection outline.
pub const DEFAULT_SELECTION_MARGIN: f64 = 5.0;
/// Default half-size of the resize handle square.
pub const DEFAULT_HANDLE_HALF_SIZE: f64 = 5.0;

/// Tunables for an editing session. Every field has a default, so a partial
/// (or empty) JSON object is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Pointer slack for hit testing.
    pub hit_tolerance: f64,
    /// Gap between a bounding box and its selection outline.
    pub selection_margin: f64,
    /// Half-size of the resize handle square.
    pub handle_half_size: f64,
    /// Stroke color for new shapes.
    pub default_stroke_color: String,
    /// Fill color for new shapes.
    pub default_fill_color: Option<String>,
    /// Stroke width for new shapes.
    pub default_stroke_width: f64,
    /// Tool active when the session starts.
    pub default_tool: ToolKind,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            hit_tolerance: DEFAULT_HIT_TOLERANCE,
            selection_margin: DEFAULT_SELECTION_MARGIN,
            handle_half_size: DEFAULT_HANDLE_HALF_SIZE,
            default_stroke_color: ShapeStyle::DEFAULT_STROKE_COLOR.to_string(),
            default_fill_color: None,
            default_stroke_width: ShapeStyle::DEFAULT_STROKE_WIDTH,
            default_tool: ToolKind::Select,
        }
    }
}

impl EditorConfig {
    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Style applied to shapes created at the start of a session.
    pub fn default_style(&self) -> ShapeStyle {
        ShapeStyle::new(self.default_stroke_color.clone())
            .with_fill(self.default_fill_color.clone())
            .with_stroke_width(self.default_stroke_width)
    }
}
