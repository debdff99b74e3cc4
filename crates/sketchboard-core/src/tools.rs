//! Tool system: the interaction state machine.
//!
//! Turns pointer events into edit intents. The machine never edits the
//! scene itself; it reads the [`SceneCache`] for hit testing and hands the
//! intents it produces to the editor, which reports back whether each one
//! was accepted.

use crate::config::EditorConfig;
use crate::geometry::{construct, handle_hit};
use crate::intent::{Intent, ResizeAnchor};
use crate::scene::SceneCache;
use crate::shapes::{Geometry, ShapeDraft, ShapeKind, ShapeStyle};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Select,
    Freehand,
    Line,
    Circle,
    Rectangle,
    Square,
    Triangle,
    Ellipse,
    Resize,
}

impl ToolKind {
    pub const ALL: [ToolKind; 9] = [
        ToolKind::Select,
        ToolKind::Freehand,
        ToolKind::Line,
        ToolKind::Circle,
        ToolKind::Rectangle,
        ToolKind::Square,
        ToolKind::Triangle,
        ToolKind::Ellipse,
        ToolKind::Resize,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Select => "select",
            ToolKind::Freehand => "freehand",
            ToolKind::Line => "line",
            ToolKind::Circle => "circle",
            ToolKind::Rectangle => "rectangle",
            ToolKind::Square => "square",
            ToolKind::Triangle => "triangle",
            ToolKind::Ellipse => "ellipse",
            ToolKind::Resize => "resize",
        }
    }

    /// The shape a drawing tool produces; `None` for select and resize.
    pub fn shape_kind(self) -> Option<ShapeKind> {
        match self {
            ToolKind::Freehand => Some(ShapeKind::Freehand),
            ToolKind::Line => Some(ShapeKind::Line),
            ToolKind::Circle => Some(ShapeKind::Circle),
            ToolKind::Rectangle => Some(ShapeKind::Rectangle),
            ToolKind::Square => Some(ShapeKind::Square),
            ToolKind::Triangle => Some(ShapeKind::Triangle),
            ToolKind::Ellipse => Some(ShapeKind::Ellipse),
            ToolKind::Select | ToolKind::Resize => None,
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unknown tool name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown tool `{0}`")]
pub struct UnknownTool(pub String);

impl FromStr for ToolKind {
    type Err = UnknownTool;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolKind::ALL
            .into_iter()
            .find(|tool| tool.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownTool(s.to_string()))
    }
}

/// A shape under construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    pub kind: ShapeKind,
    /// Where the drag started.
    pub start: Point,
    /// Latest pointer position.
    pub current: Point,
    /// Buffered points (freehand only).
    pub points: Vec<Point>,
    /// Style captured when the drag started.
    pub style: ShapeStyle,
}

impl Draft {
    fn new(kind: ShapeKind, start: Point, style: ShapeStyle) -> Self {
        let points = if kind == ShapeKind::Freehand {
            vec![start]
        } else {
            Vec::new()
        };
        Self {
            kind,
            start,
            current: start,
            points,
            style,
        }
    }

    fn track(&mut self, point: Point) {
        self.current = point;
        if self.kind == ShapeKind::Freehand && self.points.last() != Some(&point) {
            self.points.push(point);
        }
    }

    /// Geometry that would be committed at the current pointer position.
    pub fn geometry(&self) -> Geometry {
        construct(self.kind, self.start, self.current, &self.points)
    }

    pub fn to_shape_draft(&self) -> ShapeDraft {
        ShapeDraft::new(self.geometry(), self.style.clone())
    }
}

/// State of a tool interaction.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ToolState {
    /// Waiting for a pointer-down.
    #[default]
    Idle,
    /// A select-at-point request is in flight; `last` is the pointer-down
    /// position a following move will be measured from.
    Selecting { last: Point },
    /// Dragging out a new shape.
    Drawing(Draft),
    /// Dragging the selected shape.
    Moving { last: Point },
    /// Dragging the resize handle of the selected shape.
    Resizing { last: Point },
}

/// What a pointer or toolbar event produced.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Reaction {
    /// Intents to send, in order.
    pub intents: Vec<Intent>,
    /// Whether the preview needs repainting.
    pub redraw: bool,
}

impl Reaction {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn redraw() -> Self {
        Self {
            intents: Vec::new(),
            redraw: true,
        }
    }

    pub fn send(intent: Intent) -> Self {
        Self {
            intents: vec![intent],
            redraw: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.intents.is_empty() && !self.redraw
    }
}

/// Manages the current tool and its state.
#[derive(Debug, Clone)]
pub struct ToolManager {
    /// Currently selected tool.
    pub current_tool: ToolKind,
    /// Current state of the tool.
    state: ToolState,
    /// Next pointer-down pastes instead of selecting or drawing.
    paste_armed: bool,
    /// Current style to apply to new shapes.
    pub current_style: ShapeStyle,
    selection_margin: f64,
    handle_half_size: f64,
}

impl Default for ToolManager {
    fn default() -> Self {
        Self::from_config(&EditorConfig::default())
    }
}

impl ToolManager {
    /// Create a new tool manager.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &EditorConfig) -> Self {
        Self {
            current_tool: config.default_tool,
            state: ToolState::Idle,
            paste_armed: false,
            current_style: config.default_style(),
            selection_margin: config.selection_margin,
            handle_half_size: config.handle_half_size,
        }
    }

    pub fn state(&self) -> &ToolState {
        &self.state
    }

    /// The shape under construction, if drawing.
    pub fn draft(&self) -> Option<&Draft> {
        match &self.state {
            ToolState::Drawing(draft) => Some(draft),
            _ => None,
        }
    }

    /// Check if a pointer interaction is in progress.
    pub fn is_active(&self) -> bool {
        !matches!(self.state, ToolState::Idle)
    }

    pub fn is_paste_armed(&self) -> bool {
        self.paste_armed
    }

    /// Switch tools. Any interaction in progress is cancelled first.
    pub fn set_tool(&mut self, tool: ToolKind) -> Reaction {
        let reaction = if self.is_active() {
            self.cancel()
        } else {
            Reaction::none()
        };
        log::debug!("Tool {} -> {}", self.current_tool, tool);
        self.current_tool = tool;
        reaction
    }

    /// Begin a pointer interaction.
    pub fn pointer_down(&mut self, point: Point, scene: &SceneCache) -> Reaction {
        if self.is_active() {
            log::debug!("Pointer down while {:?}, ignored", self.state);
            return Reaction::none();
        }

        if self.paste_armed {
            self.paste_armed = false;
            return Reaction::send(Intent::PasteAt(point));
        }

        match self.current_tool {
            ToolKind::Select => {
                let on_handle = scene.selected().is_some_and(|shape| {
                    handle_hit(point, shape, self.selection_margin, self.handle_half_size)
                });
                if on_handle {
                    self.state = ToolState::Resizing { last: point };
                    Reaction::send(Intent::BeginTransaction)
                } else {
                    self.state = ToolState::Selecting { last: point };
                    Reaction::send(Intent::SelectAt(point))
                }
            }
            ToolKind::Resize => {
                if scene.selected().is_none() {
                    log::debug!("Resize tool with nothing selected");
                    return Reaction::none();
                }
                self.state = ToolState::Resizing { last: point };
                Reaction::send(Intent::BeginTransaction)
            }
            tool => {
                let Some(kind) = tool.shape_kind() else {
                    return Reaction::none();
                };
                self.state = ToolState::Drawing(Draft::new(kind, point, self.current_style.clone()));
                Reaction::redraw()
            }
        }
    }

    /// Continue a pointer interaction.
    pub fn pointer_move(&mut self, point: Point) -> Reaction {
        match &mut self.state {
            ToolState::Idle | ToolState::Selecting { .. } => Reaction::none(),
            ToolState::Drawing(draft) => {
                draft.track(point);
                Reaction::redraw()
            }
            ToolState::Moving { last } => match take_delta(last, point) {
                Some(delta) => Reaction::send(Intent::MoveBy(delta)),
                None => Reaction::none(),
            },
            ToolState::Resizing { last } => match take_delta(last, point) {
                Some(delta) => Reaction::send(Intent::ResizeBy {
                    anchor: ResizeAnchor::BottomRight,
                    delta,
                }),
                None => Reaction::none(),
            },
        }
    }

    /// End a pointer interaction. Always returns to idle.
    pub fn pointer_up(&mut self, point: Point) -> Reaction {
        match std::mem::take(&mut self.state) {
            ToolState::Idle => Reaction::none(),
            ToolState::Selecting { .. } => Reaction::redraw(),
            ToolState::Drawing(mut draft) => {
                draft.track(point);
                Reaction::send(Intent::Create(draft.to_shape_draft()))
            }
            ToolState::Moving { .. } | ToolState::Resizing { .. } => {
                Reaction::send(Intent::EndTransaction)
            }
        }
    }

    /// Abort the interaction in progress without committing it.
    ///
    /// A drawing is discarded. A move or resize aborts its transaction: the
    /// service restores the scene the drag began with and records no undo
    /// step. An armed paste is disarmed.
    pub fn cancel(&mut self) -> Reaction {
        self.paste_armed = false;
        match std::mem::take(&mut self.state) {
            ToolState::Idle => Reaction::none(),
            ToolState::Selecting { .. } | ToolState::Drawing(_) => Reaction::redraw(),
            ToolState::Moving { .. } | ToolState::Resizing { .. } => {
                Reaction::send(Intent::AbortTransaction)
            }
        }
    }

    /// Feed back a successful reply. `scene` already holds the new snapshot.
    pub fn on_accepted(&mut self, intent: &Intent, scene: &SceneCache) -> Reaction {
        match intent {
            Intent::SelectAt(_) => {
                let ToolState::Selecting { last } = self.state else {
                    return Reaction::none();
                };
                if scene.selected().is_some() {
                    self.state = ToolState::Moving { last };
                    Reaction::send(Intent::BeginTransaction)
                } else {
                    self.state = ToolState::Idle;
                    Reaction::none()
                }
            }
            Intent::CopySelected => {
                self.paste_armed = scene.selected().is_some();
                Reaction::none()
            }
            Intent::DeleteSelected | Intent::ClearAll => {
                self.paste_armed = false;
                Reaction::none()
            }
            _ => Reaction::none(),
        }
    }

    /// Feed back a failed request. Pointer-up still ends any drag.
    pub fn on_rejected(&mut self, intent: &Intent) {
        if let Intent::SelectAt(_) = intent {
            if matches!(self.state, ToolState::Selecting { .. }) {
                self.state = ToolState::Idle;
            }
        }
    }
}

/// Delta from `last` to `point`, advancing `last`; `None` if unmoved.
fn take_delta(last: &mut Point, point: Point) -> Option<Vec2> {
    let delta = point - *last;
    if delta == Vec2::ZERO {
        return None;
    }
    *last = point;
    Some(delta)
}
