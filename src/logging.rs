//! Structured logging via tracing.
//!
//! Logs go to `<state dir>/logs/pushit.{date}.log`, rotated daily with a week
//! of files kept, because the TUI owns stdout. Level comes from `PUSHIT_LOG`,
//! then `RUST_LOG`, then `pushit=info`. When the log directory cannot be used,
//! scriptable commands log to stderr and the TUI logs nothing.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const LOG_ENV: &str = "PUSHIT_LOG";
const DEFAULT_FILTER: &str = "pushit=info";

/// Where log lines go when the rolling file cannot be opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    Stderr,
    /// The terminal belongs to the TUI
    Off,
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

fn create_file_appender(dir: &Path) -> Result<RollingFileAppender, InitError> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("pushit")
        .filename_suffix("log")
        .max_log_files(7)
        .build(dir)
}

/// Install the global subscriber. Keep the returned guard alive until exit so
/// buffered lines are flushed.
pub fn init(log_dir: &Path, fallback: Fallback) -> Option<WorkerGuard> {
    let _ = std::fs::create_dir_all(log_dir);

    match create_file_appender(log_dir) {
        Ok(appender) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let _ = tracing_subscriber::registry()
                .with(env_filter())
                .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
                .try_init();
            Some(guard)
        }
        Err(_) if fallback == Fallback::Stderr => {
            let _ = tracing_subscriber::registry()
                .with(env_filter())
                .with(fmt::layer().with_writer(std::io::stderr))
                .try_init();
            None
        }
        Err(_) => None,
    }
}
