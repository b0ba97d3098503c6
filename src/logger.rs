//! Tracing subscriber setup for the demonstration binary.
//!
//! The filter comes from [`LoggerConfig`] only; the environment is never
//! consulted.

use std::io::IsTerminal;

use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Error, Debug)]
pub enum LoggerError {
    #[error("invalid log level: {0}")]
    InvalidLogLevel(String),
    #[error("subscriber init failed: {0}")]
    Init(String),
}

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Filter directive, e.g. `info` or `asyncflow=debug`.
    pub level: String,
    pub with_targets: bool,
    /// ANSI colouring. Defaults to on only when stdout is a terminal.
    pub use_color: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            with_targets: false,
            use_color: std::io::stdout().is_terminal(),
        }
    }
}

/// Installs a global fmt subscriber writing to stdout.
pub fn init(cfg: &LoggerConfig) -> Result<(), LoggerError> {
    let filter = mk_filter(&cfg.level)?;
    let fmt_layer = fmt::layer()
        .with_ansi(cfg.use_color)
        .with_target(cfg.with_targets)
        .with_writer(std::io::stdout);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| LoggerError::Init(e.to_string()))
}

fn mk_filter(level: &str) -> Result<EnvFilter, LoggerError> {
    EnvFilter::try_new(level).map_err(|_| LoggerError::InvalidLogLevel(level.to_string()))
}
