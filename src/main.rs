//! ckpt-average CLI
//!
//! Averages model checkpoints parameter-wise.
//!
//! # Usage
//!
//! ```bash
//! # Average three runs
//! ckpt-average -m seed1/model.npz seed2/model.npz seed3/model.npz -o model.avg.npz
//!
//! # Show skipped contributions and per-file details
//! RUST_LOG=debug ckpt-average -m a.npz -m b.npz -o avg.npz
//! ```

use ckpt_average::average::average_checkpoints;
use ckpt_average::config::Cli;
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // Diagnostics go to stderr; stdout carries only the progress lines.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match average_checkpoints(&cli.models, &cli.output) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
