use anyhow::{Context, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::LogSettings;

const LOG_FILE_PREFIX: &str = "voicebudget";
const LOG_FILE_SUFFIX: &str = "log";
const MAX_LOG_FILES: usize = 7;

/// Filter from `RUST_LOG`, or the configured level when it is unset.
pub(crate) fn build_env_filter(settings: &LogSettings) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&settings.level)
            .with_context(|| format!("Invalid log level: {}", settings.level)),
    }
}

/// Installs the global subscriber: a daily rolling file in `log_dir`, plus
/// warnings on stderr when `console` is set. The TUI must pass `console = false`.
///
/// The returned guard flushes the file writer on drop and must live until
/// the program exits.
pub(crate) fn init(settings: &LogSettings, log_dir: &Path, console: bool) -> Result<WorkerGuard> {
    let env_filter = build_env_filter(settings)?;

    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix(LOG_FILE_SUFFIX)
        .max_log_files(MAX_LOG_FILES)
        .build(log_dir)
        .context("Failed to create log file appender")?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let mut layers = Vec::new();
    layers.push(layer().with_writer(non_blocking).with_ansi(false).boxed());
    if console {
        layers.push(
            layer()
                .compact()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(LevelFilter::WARN)
                .boxed(),
        );
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .try_init()
        .context("Failed to install log subscriber")?;

    Ok(guard)
}
