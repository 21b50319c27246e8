//! Structured logging setup.
//!
//! Library code only emits `tracing` events; installing a subscriber is the
//! embedding program's choice. [`init`] is the default installation:
//! stderr, level derived from the configured verbosity unless `RUST_LOG`
//! is set.

use std::io::{self, IsTerminal};
use std::sync::OnceLock;

use tracing::subscriber::SetGlobalDefaultError;
use tracing::Subscriber;
use tracing_subscriber::{fmt, EnvFilter};

static INSTALLED: OnceLock<()> = OnceLock::new();

/// Output encoding for log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("invalid log filter: {0}")]
    Filter(String),
    #[error("failed to install log subscriber: {0}")]
    Subscriber(#[from] SetGlobalDefaultError),
}

/// Filter directive for a verbosity level.
///
/// `< 0` errors only, `0` warnings, `1` info, `2` debug, `3+` trace.
#[must_use]
pub fn level_for(verbosity: i32) -> &'static str {
    match verbosity {
        i32::MIN..=-1 => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Build the filter: `RUST_LOG` if set and valid, otherwise [`level_for`].
///
/// # Errors
///
/// Returns [`TelemetryError::Filter`] if the fallback directive is rejected.
pub fn filter_for(verbosity: i32) -> Result<EnvFilter, TelemetryError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(level_for(verbosity))
            .map_err(|e| TelemetryError::Filter(e.to_string())),
    }
}

/// Install the global subscriber once. Later calls are no-ops.
///
/// # Errors
///
/// Returns [`TelemetryError`] if the filter is invalid or another
/// subscriber is already installed.
pub fn init(verbosity: i32, format: LogFormat) -> Result<(), TelemetryError> {
    if INSTALLED.get().is_some() {
        return Ok(());
    }
    let filter = filter_for(verbosity)?;
    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal());
    let subscriber: Box<dyn Subscriber + Send + Sync> = match format {
        LogFormat::Json => Box::new(builder.json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(builder.compact().finish()),
    };
    tracing::subscriber::set_global_default(subscriber)?;
    let _ = INSTALLED.set(());
    Ok(())
}
