//! Scripted editor events.

use serde::Deserialize;
use sketchboard_core::{Backend, Editor, EditorError, ToolKind};
use kurbo::Point;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors loading or replaying a script.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid script: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Editor error: {0}")]
    Editor(#[from] EditorError),
}

/// Result type for script operations.
pub type ScriptResult<T> = Result<T, ScriptError>;

/// One recorded pointer or toolbar event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum ScriptEvent {
    Tool { tool: ToolKind },
    Down { x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Up { x: f64, y: f64 },
    Copy,
    Delete,
    Undo,
    Redo,
    Clear,
    Cancel,
    Refresh,
    Color { color: String },
    Fill {
        #[serde(default)]
        color: Option<String>,
    },
    Width { width: f64 },
}

impl ScriptEvent {
    /// Queue this event on the editor.
    pub fn apply<B: Backend>(&self, editor: &mut Editor<B>) {
        match self {
            ScriptEvent::Tool { tool } => editor.set_tool(*tool),
            ScriptEvent::Down { x, y } => editor.pointer_down(Point::new(*x, *y)),
            ScriptEvent::Move { x, y } => editor.pointer_move(Point::new(*x, *y)),
            ScriptEvent::Up { x, y } => editor.pointer_up(Point::new(*x, *y)),
            ScriptEvent::Copy => editor.copy(),
            ScriptEvent::Delete => editor.delete_selected(),
            ScriptEvent::Undo => editor.undo(),
            ScriptEvent::Redo => editor.redo(),
            ScriptEvent::Clear => editor.clear_all(),
            ScriptEvent::Cancel => editor.cancel(),
            ScriptEvent::Refresh => editor.refresh(),
            ScriptEvent::Color { color } => editor.set_stroke_color(color.clone()),
            ScriptEvent::Fill { color } => editor.set_fill_color(color.clone()),
            ScriptEvent::Width { width } => editor.set_stroke_width(*width),
        }
    }
}

/// An ordered list of events.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Script {
    pub events: Vec<ScriptEvent>,
}

impl Script {
    /// Parse a JSON array of events.
    pub fn from_json(json: &str) -> ScriptResult<Self> {
        let events = serde_json::from_str(json)?;
        Ok(Self { events })
    }

    /// Load a script file.
    pub fn load(path: &Path) -> ScriptResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
