//! Capture processor CLI application
//!
//! Command-line front end for encoding capture-stream fixtures and
//! decoding byte-encoded match buffers.

use clap::Parser;
use std::process;
use tracing::{error, Level};
use tracing_subscriber::{fmt, EnvFilter};

use rosie_captures::cli::Cli;

fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => Level::ERROR,
        1 => Level::WARN,
        2 => Level::INFO,
        3 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let env_filter = EnvFilter::from_default_env()
        .add_directive(format!("rosie_captures={}", log_level).parse().unwrap());

    fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .init();

    if let Err(e) = cli.run() {
        error!("Command failed: {}", e);

        for cause in e.chain().skip(1) {
            error!("  Caused by: {}", cause);
        }

        process::exit(1);
    }
}
