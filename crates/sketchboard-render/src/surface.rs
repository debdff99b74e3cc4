//! Drawing surface abstraction.

use kurbo::{BezPath, Stroke};
use peniko::Color;

/// A 2-D target the renderer paints onto.
pub trait Surface {
    /// Fill the whole surface with `color`.
    fn clear(&mut self, color: Color);

    /// Fill a closed path.
    fn fill(&mut self, path: &BezPath, color: Color);

    /// Stroke a path with the given stroke style.
    fn stroke(&mut self, path: &BezPath, color: Color, stroke: &Stroke);
}

/// One recorded drawing operation. Colors are stored as RGBA8.
#[derive(Debug, Clone)]
pub enum DrawCommand {
    Clear {
        color: [u8; 4],
    },
    Fill {
        path: BezPath,
        color: [u8; 4],
    },
    Stroke {
        path: BezPath,
        color: [u8; 4],
        width: f64,
        /// Dash pattern; empty for a solid stroke.
        dashes: Vec<f64>,
    },
}

impl DrawCommand {
    pub fn color(&self) -> [u8; 4] {
        match self {
            DrawCommand::Clear { color }
            | DrawCommand::Fill { color, .. }
            | DrawCommand::Stroke { color, .. } => *color,
        }
    }

    pub fn is_dashed(&self) -> bool {
        matches!(self, DrawCommand::Stroke { dashes, .. } if !dashes.is_empty())
    }
}

fn rgba(color: Color) -> [u8; 4] {
    let c = color.to_rgba8();
    [c.r, c.g, c.b, c.a]
}

/// Surface that records a display list instead of drawing.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Take the recorded commands, leaving the surface empty.
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl Surface for RecordingSurface {
    fn clear(&mut self, color: Color) {
        // Clearing wipes everything drawn before.
        self.commands.clear();
        self.commands.push(DrawCommand::Clear { color: rgba(color) });
    }

    fn fill(&mut self, path: &BezPath, color: Color) {
        self.commands.push(DrawCommand::Fill {
            path: path.clone(),
            color: rgba(color),
        });
    }

    fn stroke(&mut self, path: &BezPath, color: Color, stroke: &Stroke) {
        self.commands.push(DrawCommand::Stroke {
            path: path.clone(),
            color: rgba(color),
            width: stroke.width,
            dashes: stroke.dash_pattern.to_vec(),
        });
    }
}
