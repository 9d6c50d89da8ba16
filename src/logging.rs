//! Tracing setup for MODULIST.
//!
//! Log lines go to stdout and, when possible, to the file named in
//! `[logging]`. `RUST_LOG` directives are honored on top of the
//! configured level.

use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;

use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::Result;

/// Map a configured level name to a `Level`. Unknown names mean `INFO`.
fn level_from_name(name: &str) -> Level {
    match name.trim().to_ascii_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn filter_for(name: &str) -> EnvFilter {
    EnvFilter::from_default_env().add_directive(level_from_name(name).into())
}

/// Install the global subscriber writing to stdout and `config.file`.
///
/// Fails if the log file (or its directory) cannot be created; the
/// caller then falls back to [`init_console_only`].
pub fn init(config: &LoggingConfig) -> Result<()> {
    let log_path = Path::new(&config.file);
    match log_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir)?,
        _ => {}
    }
    let file = Arc::new(File::create(log_path)?);

    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout.and(file))
        .with_ansi(false)
        .with_file(false)
        .with_line_number(false);

    tracing_subscriber::registry()
        .with(layer)
        .with(filter_for(&config.level))
        .init();

    Ok(())
}

/// Install a stdout-only subscriber.
pub fn init_console_only(level: &str) {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(filter_for(level))
        .init();
}
