//! Command-line arguments.

use clap::Parser;
use sketchboard_core::ExportFormat;
use std::path::PathBuf;

/// Replay a recorded editing session and print the resulting drawing.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "sketchboard", about = "Replay a Sketchboard editing session")]
pub struct Args {
    /// Editor configuration file (JSON).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Event script to replay (JSON array).
    pub script: PathBuf,

    /// Format of the drawing printed at the end.
    #[arg(long, default_value = "json")]
    pub export: ExportFormat,
}
