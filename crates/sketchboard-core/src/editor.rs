//! Editing session.
//!
//! [`Editor`] ties the tool machine, the scene cache and a persistence
//! backend together. Pointer and toolbar methods are synchronous: they only
//! queue sequence-tagged requests. [`Editor::flush`] sends the queue in
//! issue order, applies every scene reply and feeds the outcome back to the
//! tool machine.

use crate::backend::{Backend, BackendError, Reply, Request};
use crate::config::EditorConfig;
use crate::intent::Intent;
use crate::scene::SceneCache;
use crate::tools::{Draft, Reaction, ToolKind, ToolManager};
use crate::wire::ExportFormat;
use kurbo::Point;
use std::collections::VecDeque;
use thiserror::Error;

/// Errors surfaced by the editor's direct operations.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
    #[error("Unexpected reply to {intent}: {reply}")]
    UnexpectedReply { intent: &'static str, reply: String },
}

/// Result type for editor operations.
pub type EditorResult<T> = Result<T, EditorError>;

/// Outcome of one [`Editor::flush`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlushSummary {
    /// Requests sent, including follow-ups queued during the flush.
    pub sent: usize,
    /// Requests that failed.
    pub failed: usize,
}

/// An editing session against one persistence backend.
pub struct Editor<B: Backend> {
    backend: B,
    tools: ToolManager,
    scene: SceneCache,
    config: EditorConfig,
    outbox: VecDeque<Request>,
    next_seq: u64,
    needs_redraw: bool,
}

impl<B: Backend> Editor<B> {
    /// Create an editor with the default configuration.
    pub fn new(backend: B) -> Self {
        Self::with_config(backend, EditorConfig::default())
    }

    pub fn with_config(backend: B, config: EditorConfig) -> Self {
        Self {
            backend,
            tools: ToolManager::from_config(&config),
            scene: SceneCache::new(),
            config,
            outbox: VecDeque::new(),
            next_seq: 1,
            needs_redraw: true,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn scene(&self) -> &SceneCache {
        &self.scene
    }

    pub fn tools(&self) -> &ToolManager {
        &self.tools
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// The shape under construction, for the preview.
    pub fn draft(&self) -> Option<&Draft> {
        self.tools.draft()
    }

    /// Requests queued but not yet sent.
    pub fn pending(&self) -> usize {
        self.outbox.len()
    }

    /// Whether the preview changed since the last call.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.needs_redraw)
    }

    fn next_request(&mut self, intent: Intent) -> Request {
        let request = Request::new(self.next_seq, intent);
        self.next_seq += 1;
        request
    }

    fn issue(&mut self, intent: Intent) {
        log::debug!("Queue #{} {}", self.next_seq, intent.name());
        let request = self.next_request(intent);
        self.outbox.push_back(request);
    }

    fn react(&mut self, reaction: Reaction) {
        self.needs_redraw |= reaction.redraw;
        for intent in reaction.intents {
            self.issue(intent);
        }
    }

    pub fn pointer_down(&mut self, point: Point) {
        let reaction = self.tools.pointer_down(point, &self.scene);
        self.react(reaction);
    }

    pub fn pointer_move(&mut self, point: Point) {
        let reaction = self.tools.pointer_move(point);
        self.react(reaction);
    }

    pub fn pointer_up(&mut self, point: Point) {
        let reaction = self.tools.pointer_up(point);
        self.react(reaction);
    }

    /// Abort the drag in progress (Escape).
    pub fn cancel(&mut self) {
        let reaction = self.tools.cancel();
        self.react(reaction);
    }

    pub fn set_tool(&mut self, tool: ToolKind) {
        let reaction = self.tools.set_tool(tool);
        self.react(reaction);
    }

    /// Set the stroke color for new shapes, and for the selected shape.
    pub fn set_stroke_color(&mut self, color: impl Into<String>) {
        let color = color.into();
        self.tools.current_style.stroke_color = color.clone();
        if self.scene.selected().is_some() {
            self.issue(Intent::SetStrokeColor(color));
        }
    }

    /// Set the fill color for new shapes, and for the selected shape.
    pub fn set_fill_color(&mut self, color: Option<String>) {
        self.tools.current_style.fill_color = color.clone();
        if self.scene.selected().is_some() {
            self.issue(Intent::SetFillColor(color));
        }
    }

    /// Set the stroke width for new shapes, and for the selected shape.
    pub fn set_stroke_width(&mut self, width: f64) {
        self.tools.current_style.stroke_width = width;
        if self.scene.selected().is_some() {
            self.issue(Intent::SetStrokeWidth(width));
        }
    }

    /// Duplicate the selected shape; the next pointer-down places it.
    pub fn copy(&mut self) {
        self.issue(Intent::CopySelected);
    }

    pub fn delete_selected(&mut self) {
        self.issue(Intent::DeleteSelected);
    }

    pub fn clear_all(&mut self) {
        self.issue(Intent::ClearAll);
    }

    pub fn undo(&mut self) {
        self.issue(Intent::Undo);
    }

    pub fn redo(&mut self) {
        self.issue(Intent::Redo);
    }

    /// Re-fetch the scene.
    pub fn refresh(&mut self) {
        self.issue(Intent::ListShapes);
    }

    /// Send every queued request in issue order.
    ///
    /// Scene replies replace the cache. Failures are logged and leave the
    /// cache untouched; nothing is retried.
    pub async fn flush(&mut self) -> FlushSummary {
        let mut summary = FlushSummary::default();

        while let Some(request) = self.outbox.pop_front() {
            let seq = request.seq;
            let intent = request.intent.clone();
            summary.sent += 1;

            match self.backend.send(request).await {
                Ok(reply) => {
                    if let Reply::Scene(records) = &reply {
                        self.scene.apply_server_snapshot(records);
                        self.needs_redraw = true;
                    } else if let Reply::Payload(_) = &reply {
                        log::warn!("Ignoring payload reply to queued {}", intent.name());
                    }
                    let reaction = self.tools.on_accepted(&intent, &self.scene);
                    self.react(reaction);
                }
                Err(e) => {
                    log::warn!("Request #{} {} failed: {}", seq, intent.name(), e);
                    summary.failed += 1;
                    self.tools.on_rejected(&intent);
                }
            }
        }

        summary
    }

    /// Export the scene. Queued edits are flushed first.
    pub async fn export(&mut self, format: ExportFormat) -> EditorResult<Vec<u8>> {
        self.flush().await;
        let request = self.next_request(Intent::Export(format));
        match self.backend.send(request).await? {
            Reply::Payload(payload) => Ok(payload),
            other => Err(EditorError::UnexpectedReply {
                intent: "export",
                reply: format!("{:?}", other),
            }),
        }
    }

    /// Replace the scene from an export payload, then re-fetch it.
    pub async fn import(&mut self, format: ExportFormat, payload: Vec<u8>) -> EditorResult<()> {
        self.flush().await;
        let request = self.next_request(Intent::Import { format, payload });
        match self.backend.send(request).await? {
            Reply::Ack => {}
            other => {
                return Err(EditorError::UnexpectedReply {
                    intent: "import",
                    reply: format!("{:?}", other),
                });
            }
        }
        self.refresh();
        self.flush().await;
        Ok(())
    }
}
