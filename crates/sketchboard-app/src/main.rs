//! Headless session replay entry point.

use clap::Parser;
use sketchboard_app::Args;
use std::io::Write;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    log::info!("Starting Sketchboard replay");
    let payload = match pollster::block_on(sketchboard_app::run(&args)) {
        Ok(payload) => payload,
        Err(e) => {
            log::error!("Replay failed: {}", e);
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut stdout = std::io::stdout().lock();
    if let Err(e) = stdout.write_all(&payload).and_then(|_| stdout.write_all(b"\n")) {
        log::error!("Failed to write export: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
