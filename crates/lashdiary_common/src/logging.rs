// --- File: crates/lashdiary_common/src/logging.rs ---
//! Logging utilities for the LashDiary backend.
//!
//! This module provides a standardized approach to logging across all
//! crates in the workspace, built on the tracing subscriber.

use tracing::{error, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber with the default log level (INFO).
///
/// This function should be called once at the start of the application.
/// Log messages carry timestamps, levels, targets and file/line info.
pub fn init() {
    init_with_level(Level::INFO);
}

/// Initialize the tracing subscriber with a specific log level.
///
/// `RUST_LOG` still takes precedence; the level argument only sets the
/// default directive for the workspace crates.
pub fn init_with_level(level: Level) {
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("lashdiary={}", level).parse().unwrap());

    // try_init so a second call (tests, embedded use) is harmless
    let result = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(filter)
        .try_init();

    if result.is_ok() {
        info!("Logging initialized at level: {}", level);
    }
}

/// Log an error with context at the ERROR level.
pub fn log_error<E: std::fmt::Display>(error: E, context: &str) {
    error!("{}: {}", context, error);
}
