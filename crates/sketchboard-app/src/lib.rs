//! Sketchboard Application
//!
//! Headless shell around the editor: command-line parsing, scripted event
//! replay against the in-memory persistence service, frame rendering and
//! export.

mod cli;
mod replay;
mod script;

pub use cli::Args;
pub use replay::{ReplayOutcome, render_frame, replay, run};
pub use script::{Script, ScriptError, ScriptEvent, ScriptResult};
