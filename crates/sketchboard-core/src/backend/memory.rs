//! In-memory persistence service.
//!
//! Keeps the scene, the selection and whole-scene undo/redo stacks behind a
//! lock, and answers requests the way the remote service does. Used by
//! tests and by the headless replay tool.

use super::{Backend, BackendError, BackendResult, BoxFuture, Reply, Request};
use crate::intent::{Intent, ResizeAnchor};
use crate::shapes::{Geometry, Shape, ShapeDraft, ShapeId};
use crate::wire::{self, ExportFormat};
use kurbo::{Point, Vec2};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

/// Pointer slack used by `select`, in pixels.
pub const SELECT_TOLERANCE: f64 = 5.0;
/// Offset applied to a duplicate so it does not hide its source.
pub const COPY_OFFSET: Vec2 = Vec2::new(10.0, 10.0);

#[derive(Debug, Default)]
struct BoardState {
    shapes: Vec<Shape>,
    selected: Option<ShapeId>,
    undo_stack: Vec<Vec<Shape>>,
    redo_stack: Vec<Vec<Shape>>,
    /// Scene as it was when the open transaction began.
    transaction: Option<Vec<Shape>>,
    last_seq: Option<u64>,
}

impl BoardState {
    /// Scene records, with the selection flag on the selected shape.
    fn scene(&self) -> Vec<Value> {
        self.shapes
            .iter()
            .map(|shape| {
                let selected = Some(shape.id()) == self.selected;
                wire::encode_shape(&shape.clone().with_selected(selected))
            })
            .collect()
    }

    fn selected_index(&self) -> Option<usize> {
        let id = self.selected?;
        self.shapes.iter().position(|shape| shape.id() == id)
    }

    /// Record an undo step before a mutation. Inside a transaction the
    /// begin snapshot already covers it.
    fn checkpoint(&mut self) {
        if self.transaction.is_none() {
            self.undo_stack.push(self.shapes.clone());
            self.redo_stack.clear();
        }
    }

    /// Mutate the selected shape as one undo step; no-op without a selection.
    fn edit_selected(&mut self, edit: impl FnOnce(&mut Shape)) {
        let Some(index) = self.selected_index() else {
            log::debug!("No shape selected, nothing to edit");
            return;
        };
        self.checkpoint();
        edit(&mut self.shapes[index]);
    }

    fn begin_transaction(&mut self) {
        if self.transaction.is_none() {
            self.transaction = Some(self.shapes.clone());
        }
    }

    fn end_transaction(&mut self) {
        if let Some(snapshot) = self.transaction.take() {
            if snapshot != self.shapes {
                self.undo_stack.push(snapshot);
                self.redo_stack.clear();
            }
        }
    }

    /// Drop the open transaction, putting back the scene it began with.
    fn abort_transaction(&mut self) {
        if let Some(snapshot) = self.transaction.take() {
            self.restore(snapshot);
        }
    }

    fn restore(&mut self, shapes: Vec<Shape>) -> Vec<Shape> {
        let previous = std::mem::replace(&mut self.shapes, shapes);
        if self.selected_index().is_none() {
            self.selected = None;
        }
        previous
    }

    fn undo(&mut self) {
        self.end_transaction();
        if let Some(shapes) = self.undo_stack.pop() {
            let current = self.restore(shapes);
            self.redo_stack.push(current);
        }
    }

    fn redo(&mut self) {
        self.end_transaction();
        if let Some(shapes) = self.redo_stack.pop() {
            let current = self.restore(shapes);
            self.undo_stack.push(current);
        }
    }

    fn create(&mut self, draft: ShapeDraft) -> BackendResult<()> {
        if !draft.geometry.bounds().is_finite() {
            return Err(BackendError::Rejected("non-finite geometry".to_string()));
        }
        if let Geometry::Freehand(freehand) = &draft.geometry {
            if freehand.is_empty() {
                return Err(BackendError::Rejected("freehand shape has no points".to_string()));
            }
        }
        self.checkpoint();
        self.shapes.push(draft.into_shape(Uuid::new_v4()));
        Ok(())
    }

    fn select_at(&mut self, point: Point, tolerance: f64) {
        self.selected = self
            .shapes
            .iter()
            .rev()
            .find(|shape| shape.geometry().contains(point, tolerance))
            .map(Shape::id);
    }

    fn copy_selected(&mut self) {
        let Some(index) = self.selected_index() else {
            return;
        };
        self.checkpoint();
        let mut copy = self.shapes[index].clone();
        copy.set_id(Uuid::new_v4());
        copy.translate(COPY_OFFSET);
        self.selected = Some(copy.id());
        self.shapes.push(copy);
    }

    fn delete_selected(&mut self) {
        let Some(index) = self.selected_index() else {
            return;
        };
        self.checkpoint();
        self.shapes.remove(index);
        self.selected = None;
    }

    fn clear(&mut self) {
        self.selected = None;
        if self.shapes.is_empty() {
            return;
        }
        self.checkpoint();
        self.shapes.clear();
    }

    fn import(&mut self, format: ExportFormat, payload: &[u8]) -> BackendResult<()> {
        let records = wire::import(format, payload)?;
        let mut seen = HashSet::new();
        let shapes: Vec<Shape> = wire::decode_scene(&records)
            .into_iter()
            .map(|mut shape| {
                shape.set_selected(false);
                if !seen.insert(shape.id()) {
                    let id = Uuid::new_v4();
                    log::warn!("Duplicate shape id {} on import, reassigned {}", shape.id(), id);
                    shape.set_id(id);
                    seen.insert(id);
                }
                shape
            })
            .collect();

        log::info!("Imported {} shapes from {}", shapes.len(), format);
        self.end_transaction();
        self.checkpoint();
        self.shapes = shapes;
        self.selected = None;
        Ok(())
    }

    fn apply(&mut self, intent: Intent, tolerance: f64) -> BackendResult<Reply> {
        match intent {
            Intent::ListShapes => {}
            Intent::Create(draft) => self.create(draft)?,
            Intent::SelectAt(point) => self.select_at(point, tolerance),
            Intent::BeginTransaction => {
                self.begin_transaction();
                return Ok(Reply::Ack);
            }
            Intent::EndTransaction => self.end_transaction(),
            Intent::AbortTransaction => self.abort_transaction(),
            Intent::MoveBy(delta) => {
                ensure_finite(delta)?;
                self.edit_selected(|shape| shape.translate(delta));
            }
            Intent::ResizeBy { anchor, delta } => {
                ensure_finite(delta)?;
                match anchor {
                    ResizeAnchor::BottomRight => {
                        self.edit_selected(|shape| shape.resize_by(delta));
                    }
                }
            }
            Intent::CopySelected => self.copy_selected(),
            Intent::PasteAt(point) => {
                ensure_finite(point.to_vec2())?;
                self.edit_selected(|shape| {
                    let delta = point - shape.geometry().anchor();
                    shape.translate(delta);
                });
            }
            Intent::DeleteSelected => self.delete_selected(),
            Intent::ClearAll => self.clear(),
            Intent::SetStrokeColor(color) => {
                self.edit_selected(|shape| shape.style_mut().stroke_color = color);
            }
            Intent::SetFillColor(color) => {
                self.edit_selected(|shape| shape.style_mut().fill_color = color);
            }
            Intent::SetStrokeWidth(width) => {
                if !width.is_finite() || width < 0.0 {
                    return Err(BackendError::Rejected(format!("invalid stroke width {}", width)));
                }
                self.edit_selected(|shape| shape.style_mut().stroke_width = width);
            }
            Intent::Undo => self.undo(),
            Intent::Redo => self.redo(),
            Intent::Export(format) => {
                let payload = wire::export(format, &self.scene())?;
                log::info!("Exported {} shapes as {}", self.shapes.len(), format);
                return Ok(Reply::Payload(payload));
            }
            Intent::Import { format, payload } => {
                self.import(format, &payload)?;
                return Ok(Reply::Ack);
            }
        }
        Ok(Reply::Scene(self.scene()))
    }
}

fn ensure_finite(delta: Vec2) -> BackendResult<()> {
    if delta.is_finite() {
        Ok(())
    } else {
        Err(BackendError::Rejected(format!("non-finite coordinates {:?}", delta)))
    }
}

/// In-memory persistence service for testing and headless use.
#[derive(Debug)]
pub struct MemoryBackend {
    state: RwLock<BoardState>,
    offline: AtomicBool,
    tolerance: f64,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self {
            state: RwLock::new(BoardState::default()),
            offline: AtomicBool::new(false),
            tolerance: SELECT_TOLERANCE,
        }
    }
}

impl MemoryBackend {
    /// Create a new empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pointer slack used by `select`.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Simulate the service going away (or coming back).
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn is_offline(&self) -> bool {
        self.offline.load(Ordering::SeqCst)
    }
}

impl Backend for MemoryBackend {
    fn send(&self, request: Request) -> BoxFuture<'_, BackendResult<Reply>> {
        Box::pin(async move {
            if self.is_offline() {
                return Err(BackendError::Unavailable("service offline".to_string()));
            }

            let mut state = self
                .state
                .write()
                .map_err(|e| BackendError::Other(format!("Lock error: {}", e)))?;

            if let Some(last) = state.last_seq {
                if request.seq <= last {
                    return Err(BackendError::OutOfOrder {
                        last,
                        got: request.seq,
                    });
                }
            }
            state.last_seq = Some(request.seq);

            log::debug!("Applying #{} {}", request.seq, request.intent.name());
            state.apply(request.intent, self.tolerance)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{
        Circle, Ellipse, Freehand, Line, Rectangle, ShapeKind, ShapeStyle, Square, Triangle,
    };

    struct Session {
        backend: MemoryBackend,
        seq: u64,
    }

    impl Session {
        fn new() -> Self {
            Self {
                backend: MemoryBackend::new(),
                seq: 0,
            }
        }

        fn send(&mut self, intent: Intent) -> BackendResult<Reply> {
            self.seq += 1;
            pollster::block_on(self.backend.send(Request::new(self.seq, intent)))
        }

        fn scene(&mut self) -> Vec<Shape> {
            match self.send(Intent::ListShapes).unwrap() {
                Reply::Scene(records) => wire::decode_scene(&records),
                other => panic!("expected scene, got {:?}", other),
            }
        }

        fn create(&mut self, geometry: Geometry) {
            self.send(Intent::Create(ShapeDraft::new(geometry, ShapeStyle::default())))
                .unwrap();
        }

        fn only(&mut self) -> Shape {
            let scene = self.scene();
            assert_eq!(scene.len(), 1);
            scene[0].clone()
        }
    }

    fn circle(x: f64, y: f64, r: f64) -> Geometry {
        Geometry::Circle(Circle::new(Point::new(x, y), r))
    }

    #[test]
    fn test_create_select_move_delete() {
        let mut session = Session::new();

        session.create(circle(50.0, 50.0, 10.0));
        let shape = session.only();
        assert_eq!(shape.kind(), ShapeKind::Circle);
        assert_eq!(shape.geometry(), &circle(50.0, 50.0, 10.0));
        assert!(!shape.is_selected());

        session.send(Intent::SelectAt(Point::new(50.0, 50.0))).unwrap();
        assert!(session.only().is_selected());

        session.send(Intent::MoveBy(Vec2::new(5.0, -5.0))).unwrap();
        assert_eq!(session.only().geometry(), &circle(55.0, 45.0, 10.0));

        session.send(Intent::DeleteSelected).unwrap();
        assert!(session.scene().is_empty());
    }

    #[test]
    fn test_clear_all_idempotent() {
        let mut session = Session::new();
        session.create(circle(0.0, 0.0, 1.0));

        for _ in 0..2 {
            match session.send(Intent::ClearAll).unwrap() {
                Reply::Scene(records) => assert!(records.is_empty()),
                other => panic!("expected scene, got {:?}", other),
            }
        }

        // One undo brings the circle back; the second clear was not a step.
        session.send(Intent::Undo).unwrap();
        assert_eq!(session.scene().len(), 1);
    }

    #[test]
    fn test_select_miss_clears_selection() {
        let mut session = Session::new();
        session.create(circle(50.0, 50.0, 10.0));
        session.send(Intent::SelectAt(Point::new(50.0, 50.0))).unwrap();
        session.send(Intent::SelectAt(Point::new(500.0, 500.0))).unwrap();
        assert!(!session.only().is_selected());
    }

    #[test]
    fn test_select_topmost_precise() {
        let mut session = Session::new();
        session.create(Geometry::Rectangle(Rectangle::new(Point::ZERO, 100.0, 100.0)));
        session.create(Geometry::Line(Line::new(Point::new(0.0, 50.0), Point::new(100.0, 50.0))));

        // On the line: the line is on top.
        session.send(Intent::SelectAt(Point::new(50.0, 53.0))).unwrap();
        let scene = session.scene();
        assert!(scene[1].is_selected());
        assert!(!scene[0].is_selected());

        // Off the line but inside the rectangle.
        session.send(Intent::SelectAt(Point::new(50.0, 80.0))).unwrap();
        let scene = session.scene();
        assert!(scene[0].is_selected());
        assert!(!scene[1].is_selected());
    }

    #[test]
    fn test_transaction_is_one_undo_step() {
        let mut session = Session::new();
        session.create(circle(50.0, 50.0, 10.0));
        session.send(Intent::SelectAt(Point::new(50.0, 50.0))).unwrap();

        assert_eq!(session.send(Intent::BeginTransaction).unwrap(), Reply::Ack);
        for _ in 0..3 {
            session.send(Intent::MoveBy(Vec2::new(10.0, 0.0))).unwrap();
        }
        session.send(Intent::EndTransaction).unwrap();
        assert_eq!(session.only().geometry(), &circle(80.0, 50.0, 10.0));

        session.send(Intent::Undo).unwrap();
        assert_eq!(session.only().geometry(), &circle(50.0, 50.0, 10.0));

        session.send(Intent::Redo).unwrap();
        assert_eq!(session.only().geometry(), &circle(80.0, 50.0, 10.0));
    }

    #[test]
    fn test_abort_transaction_restores_without_step() {
        let mut session = Session::new();
        session.create(circle(50.0, 50.0, 10.0));
        session.send(Intent::SelectAt(Point::new(50.0, 50.0))).unwrap();

        session.send(Intent::BeginTransaction).unwrap();
        session.send(Intent::MoveBy(Vec2::new(10.0, 0.0))).unwrap();
        session.send(Intent::MoveBy(Vec2::new(-10.0, 0.0))).unwrap();
        session.send(Intent::MoveBy(Vec2::new(0.0, 25.0))).unwrap();
        session.send(Intent::AbortTransaction).unwrap();

        let shape = session.only();
        assert_eq!(shape.geometry(), &circle(50.0, 50.0, 10.0));
        assert!(shape.is_selected());

        // Only the create is on the undo stack, and nothing to redo.
        session.send(Intent::Redo).unwrap();
        assert_eq!(session.only().geometry(), &circle(50.0, 50.0, 10.0));
        session.send(Intent::Undo).unwrap();
        assert!(session.scene().is_empty());
    }

    #[test]
    fn test_abort_without_transaction_is_noop() {
        let mut session = Session::new();
        session.create(circle(0.0, 0.0, 5.0));
        session.send(Intent::AbortTransaction).unwrap();
        assert_eq!(session.only().geometry(), &circle(0.0, 0.0, 5.0));
    }

    #[test]
    fn test_empty_transaction_adds_no_step() {
        let mut session = Session::new();
        session.create(circle(50.0, 50.0, 10.0));
        session.send(Intent::BeginTransaction).unwrap();
        session.send(Intent::EndTransaction).unwrap();

        // The only undo step is the create.
        session.send(Intent::Undo).unwrap();
        assert!(session.scene().is_empty());
    }

    #[test]
    fn test_move_outside_transaction_steps() {
        let mut session = Session::new();
        session.create(circle(0.0, 0.0, 5.0));
        session.send(Intent::SelectAt(Point::ZERO)).unwrap();
        session.send(Intent::MoveBy(Vec2::new(1.0, 0.0))).unwrap();
        session.send(Intent::MoveBy(Vec2::new(1.0, 0.0))).unwrap();

        session.send(Intent::Undo).unwrap();
        assert_eq!(session.only().geometry(), &circle(1.0, 0.0, 5.0));
    }

    #[test]
    fn test_undo_redo_empty_are_noops() {
        let mut session = Session::new();
        assert!(matches!(session.send(Intent::Undo).unwrap(), Reply::Scene(r) if r.is_empty()));
        assert!(matches!(session.send(Intent::Redo).unwrap(), Reply::Scene(r) if r.is_empty()));
    }

    #[test]
    fn test_new_edit_clears_redo() {
        let mut session = Session::new();
        session.create(circle(0.0, 0.0, 1.0));
        session.send(Intent::Undo).unwrap();
        session.create(circle(5.0, 5.0, 1.0));
        session.send(Intent::Redo).unwrap();
        assert_eq!(session.only().geometry(), &circle(5.0, 5.0, 1.0));
    }

    #[test]
    fn test_resize_rules() {
        let mut session = Session::new();
        session.create(Geometry::Rectangle(Rectangle::new(Point::ZERO, 10.0, 10.0)));
        session.send(Intent::SelectAt(Point::new(5.0, 5.0))).unwrap();
        session
            .send(Intent::ResizeBy {
                anchor: ResizeAnchor::BottomRight,
                delta: Vec2::new(5.0, -20.0),
            })
            .unwrap();
        assert_eq!(
            session.only().geometry(),
            &Geometry::Rectangle(Rectangle::new(Point::ZERO, 15.0, 1.0))
        );

        let mut session = Session::new();
        session.create(Geometry::Square(Square::new(Point::ZERO, 10.0)));
        session.send(Intent::SelectAt(Point::new(5.0, 5.0))).unwrap();
        session
            .send(Intent::ResizeBy {
                anchor: ResizeAnchor::BottomRight,
                delta: Vec2::new(2.0, 6.0),
            })
            .unwrap();
        assert_eq!(
            session.only().geometry(),
            &Geometry::Square(Square::new(Point::ZERO, 16.0))
        );

        let mut session = Session::new();
        session.create(circle(0.0, 0.0, 10.0));
        session.send(Intent::SelectAt(Point::ZERO)).unwrap();
        session
            .send(Intent::ResizeBy {
                anchor: ResizeAnchor::BottomRight,
                delta: Vec2::new(-50.0, 0.0),
            })
            .unwrap();
        assert_eq!(session.only().geometry(), &circle(0.0, 0.0, 1.0));

        let mut session = Session::new();
        session.create(Geometry::Ellipse(Ellipse::new(Point::ZERO, 10.0, 5.0)));
        session.send(Intent::SelectAt(Point::ZERO)).unwrap();
        session
            .send(Intent::ResizeBy {
                anchor: ResizeAnchor::BottomRight,
                delta: Vec2::new(3.0, 4.0),
            })
            .unwrap();
        assert_eq!(
            session.only().geometry(),
            &Geometry::Ellipse(Ellipse::new(Point::ZERO, 13.0, 9.0))
        );
    }

    #[test]
    fn test_copy_and_paste() {
        let mut session = Session::new();
        session.create(circle(50.0, 50.0, 10.0));
        session.send(Intent::SelectAt(Point::new(50.0, 50.0))).unwrap();
        session.send(Intent::CopySelected).unwrap();

        let scene = session.scene();
        assert_eq!(scene.len(), 2);
        assert_ne!(scene[0].id(), scene[1].id());
        assert!(!scene[0].is_selected());
        assert!(scene[1].is_selected());
        assert_eq!(scene[1].geometry(), &circle(60.0, 60.0, 10.0));

        session.send(Intent::PasteAt(Point::new(200.0, 100.0))).unwrap();
        let scene = session.scene();
        assert_eq!(scene[0].geometry(), &circle(50.0, 50.0, 10.0));
        assert_eq!(scene[1].geometry(), &circle(200.0, 100.0, 10.0));
    }

    #[test]
    fn test_paste_anchor_per_variant() {
        let mut session = Session::new();
        session.create(Geometry::Triangle(Triangle::from_drag(
            Point::new(0.0, 0.0),
            Point::new(40.0, 20.0),
        )));
        session.send(Intent::SelectAt(Point::new(20.0, 15.0))).unwrap();
        session.send(Intent::PasteAt(Point::new(120.0, 100.0))).unwrap();
        let Geometry::Triangle(triangle) = session.only().geometry().clone() else {
            panic!("expected triangle");
        };
        assert_eq!(triangle.vertices[0], Point::new(120.0, 100.0));
        assert_eq!(triangle.vertices[2], Point::new(140.0, 120.0));
    }

    #[test]
    fn test_restyle_selected() {
        let mut session = Session::new();
        session.create(circle(0.0, 0.0, 10.0));

        // Nothing selected: no change.
        session.send(Intent::SetStrokeColor("#ff0000".to_string())).unwrap();
        assert_eq!(session.only().style().stroke_color, "#000000");

        session.send(Intent::SelectAt(Point::ZERO)).unwrap();
        session.send(Intent::SetStrokeColor("#ff0000".to_string())).unwrap();
        session.send(Intent::SetFillColor(Some("#00ff00".to_string()))).unwrap();
        session.send(Intent::SetStrokeWidth(4.0)).unwrap();

        let style = session.only().style().clone();
        assert_eq!(style.stroke_color, "#ff0000");
        assert_eq!(style.fill_color.as_deref(), Some("#00ff00"));
        assert!((style.stroke_width - 4.0).abs() < f64::EPSILON);

        assert!(matches!(
            session.send(Intent::SetStrokeWidth(-1.0)),
            Err(BackendError::Rejected(_))
        ));
    }

    #[test]
    fn test_rejects_empty_freehand() {
        let mut session = Session::new();
        let result = session.send(Intent::Create(ShapeDraft::new(
            Geometry::Freehand(Freehand::default()),
            ShapeStyle::default(),
        )));
        assert!(matches!(result, Err(BackendError::Rejected(_))));
        assert!(session.scene().is_empty());
    }

    #[test]
    fn test_out_of_order_rejected() {
        let backend = MemoryBackend::new();
        pollster::block_on(backend.send(Request::new(5, Intent::ListShapes))).unwrap();

        let result = pollster::block_on(backend.send(Request::new(5, Intent::ListShapes)));
        assert!(matches!(result, Err(BackendError::OutOfOrder { last: 5, got: 5 })));

        let result = pollster::block_on(backend.send(Request::new(3, Intent::ClearAll)));
        assert!(matches!(result, Err(BackendError::OutOfOrder { last: 5, got: 3 })));

        assert!(pollster::block_on(backend.send(Request::new(6, Intent::ListShapes))).is_ok());
    }

    #[test]
    fn test_offline() {
        let mut session = Session::new();
        session.backend.set_offline(true);
        assert!(matches!(
            session.send(Intent::ListShapes),
            Err(BackendError::Unavailable(_))
        ));
        session.backend.set_offline(false);
        assert!(session.send(Intent::ListShapes).is_ok());
    }

    #[test]
    fn test_export_import_round_trip() {
        for format in [ExportFormat::Json, ExportFormat::Xml] {
            let mut session = Session::new();
            session.create(circle(50.0, 50.0, 10.0));
            session.create(Geometry::Freehand(Freehand::from_points(vec![
                Point::new(0.0, 0.0),
                Point::new(1.0, 1.0),
                Point::new(2.0, 0.0),
            ])));
            let before = session.scene();

            let Reply::Payload(payload) = session.send(Intent::Export(format)).unwrap() else {
                panic!("expected payload");
            };

            let mut other = Session::new();
            other.create(circle(1.0, 1.0, 1.0));
            let reply = other.send(Intent::Import { format, payload }).unwrap();
            assert_eq!(reply, Reply::Ack);
            assert_eq!(other.scene(), before);

            // Import is one undo step.
            other.send(Intent::Undo).unwrap();
            assert_eq!(other.scene().len(), 1);
        }
    }

    #[test]
    fn test_import_garbage_is_codec_error() {
        let mut session = Session::new();
        let result = session.send(Intent::Import {
            format: ExportFormat::Json,
            payload: b"not json".to_vec(),
        });
        assert!(matches!(result, Err(BackendError::Codec(_))));
    }
}
