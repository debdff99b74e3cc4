//! Edit intents: the requests the editor issues to the persistence service.

use crate::shapes::ShapeDraft;
use crate::wire::ExportFormat;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Corner a resize drags. Only the bottom-right corner is reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResizeAnchor {
    #[default]
    BottomRight,
}

/// A high-level edit operation. Every intent except export and import is
/// answered with the complete current scene.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// Fetch the scene.
    ListShapes,
    /// Commit a new shape.
    Create(ShapeDraft),
    /// Select the topmost shape under a point, or clear the selection.
    SelectAt(Point),
    /// Open a move/resize transaction (one undo step).
    BeginTransaction,
    /// Close the open transaction.
    EndTransaction,
    /// Close the open transaction and restore the scene it began with,
    /// leaving the undo history untouched.
    AbortTransaction,
    MoveBy(Vec2),
    ResizeBy { anchor: ResizeAnchor, delta: Vec2 },
    /// Duplicate the selected shape and select the duplicate.
    CopySelected,
    /// Move the selected shape's anchor onto a point.
    PasteAt(Point),
    DeleteSelected,
    ClearAll,
    SetStrokeColor(String),
    SetFillColor(Option<String>),
    SetStrokeWidth(f64),
    Undo,
    Redo,
    /// Encode the scene; answered with an opaque payload.
    Export(ExportFormat),
    /// Replace the scene from an encoded payload; answered with an ack.
    Import { format: ExportFormat, payload: Vec<u8> },
}

impl Intent {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Intent::ListShapes => "list",
            Intent::Create(_) => "create",
            Intent::SelectAt(_) => "select",
            Intent::BeginTransaction => "begin",
            Intent::EndTransaction => "end",
            Intent::AbortTransaction => "abort",
            Intent::MoveBy(_) => "move",
            Intent::ResizeBy { .. } => "resize",
            Intent::CopySelected => "copy",
            Intent::PasteAt(_) => "paste",
            Intent::DeleteSelected => "delete",
            Intent::ClearAll => "clear",
            Intent::SetStrokeColor(_) => "stroke-color",
            Intent::SetFillColor(_) => "fill-color",
            Intent::SetStrokeWidth(_) => "stroke-width",
            Intent::Undo => "undo",
            Intent::Redo => "redo",
            Intent::Export(_) => "export",
            Intent::Import { .. } => "import",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        assert_eq!(Intent::MoveBy(Vec2::ZERO).name(), "move");
        assert_eq!(Intent::AbortTransaction.name(), "abort");
        assert_eq!(Intent::SelectAt(Point::ZERO).name(), "select");
        assert_eq!(Intent::Export(ExportFormat::Json).name(), "export");
    }

    #[test]
    fn test_anchor_serde() {
        let json = serde_json::to_string(&ResizeAnchor::BottomRight).unwrap();
        assert_eq!(json, "\"bottom-right\"");
    }
}
