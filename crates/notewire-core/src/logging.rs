//! Tracing subscriber setup for shells embedding the controller.
//!
//! Library modules only emit `tracing` events; installing a subscriber is
//! the embedding shell's choice. These helpers cover the two usual setups.

use std::path::Path;

use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Env var controlling the log filter (standard `EnvFilter` syntax).
pub const LOG_FILTER_ENV: &str = "NOTEWIRE_LOG";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs a stderr fmt subscriber filtered by `NOTEWIRE_LOG`.
///
/// # Errors
/// Fails if a global subscriber is already installed.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}

/// Installs a subscriber writing daily-rolled files under `dir`.
///
/// The returned guard must be held for the process lifetime; dropping it
/// flushes and stops the background writer.
///
/// # Errors
/// Fails if a global subscriber is already installed.
pub fn init_with_file(dir: &Path) -> Result<WorkerGuard> {
    let appender = tracing_appender::rolling::daily(dir, "notewire.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))?;
    Ok(guard)
}
