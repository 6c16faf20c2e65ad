use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

pub const LOG_FILE_NAME: &str = "quiz-forge.log";

/// `<cache dir>/quiz-forge`, falling back to the home directory.
pub fn default_log_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_default())
        .join("quiz-forge")
}

fn build_subscriber(
    log_dir: &Path,
    filter: EnvFilter,
) -> (impl tracing::Subscriber + Send + Sync + 'static, WorkerGuard) {
    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE_NAME);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(non_blocking)
        .with_ansi(false)
        .finish();
    (subscriber, guard)
}

/// Routes all tracing output to the log file; the terminal belongs to the
/// TUI. `RUST_LOG` overrides the default `info` level. Keep the guard alive
/// until exit or buffered lines are lost.
pub fn init(log_dir: &Path) -> Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (subscriber, guard) = build_subscriber(log_dir, filter);
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install the tracing subscriber")?;
    Ok(guard)
}
