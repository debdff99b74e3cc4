//! Session replay.

use crate::cli::Args;
use crate::script::{Script, ScriptError, ScriptResult};
use sketchboard_core::{Backend, Editor, EditorConfig, MemoryBackend};
use sketchboard_render::{PreviewRenderer, RecordingSurface, RenderContext, Renderer};
use std::path::Path;

/// Totals gathered while replaying a script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReplayOutcome {
    /// Events applied.
    pub events: usize,
    /// Requests delivered to the backend.
    pub sent: usize,
    /// Requests the backend rejected or never received.
    pub failed: usize,
}

/// Apply every event in order, flushing after each one.
pub async fn replay<B: Backend>(editor: &mut Editor<B>, script: &Script) -> ReplayOutcome {
    let mut outcome = ReplayOutcome::default();

    for event in &script.events {
        event.apply(editor);
        let summary = editor.flush().await;
        outcome.events += 1;
        outcome.sent += summary.sent;
        outcome.failed += summary.failed;
        log::debug!("{:?}: {} sent, {} failed", event, summary.sent, summary.failed);
    }

    outcome
}

/// Render the editor's current frame.
pub fn render_frame<B: Backend>(editor: &Editor<B>) -> RecordingSurface {
    let ctx = RenderContext::from_scene(editor.scene())
        .with_config(editor.config())
        .with_draft(editor.draft());
    let mut surface = RecordingSurface::new();
    PreviewRenderer::new().build_scene(&ctx, &mut surface);
    surface
}

fn load_config(path: Option<&Path>) -> ScriptResult<EditorConfig> {
    let Some(path) = path else {
        return Ok(EditorConfig::default());
    };

    match std::fs::read_to_string(path) {
        Ok(json) => EditorConfig::from_json(&json).map_err(|source| ScriptError::Config {
            path: path.to_path_buf(),
            source,
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::warn!("Config {} not found, using defaults", path.display());
            Ok(EditorConfig::default())
        }
        Err(source) => Err(ScriptError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Replay the script named by `args` against a fresh in-memory backend and
/// return the exported drawing.
pub async fn run(args: &Args) -> ScriptResult<Vec<u8>> {
    let config = load_config(args.config.as_deref())?;
    let script = Script::load(&args.script)?;
    log::info!("Replaying {} events from {}", script.len(), args.script.display());

    let backend = MemoryBackend::new().with_tolerance(config.hit_tolerance);
    let mut editor = Editor::with_config(backend, config);
    editor.refresh();
    editor.flush().await;

    let outcome = replay(&mut editor, &script).await;
    if outcome.failed > 0 {
        log::warn!("{} of {} requests failed", outcome.failed, outcome.sent);
    }

    let frame = render_frame(&editor);
    log::info!(
        "Final frame: {} shapes, {} draw commands",
        editor.scene().len(),
        frame.len()
    );

    Ok(editor.export(args.export).await?)
}
