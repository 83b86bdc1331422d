//! provides logging helpers

use std::path::Path;

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::filter::{self};
use tracing_subscriber::fmt::layer;
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry;

/// Number of rotated log files kept next to the active one
const MAX_LOG_FILES: usize = 3;

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Log file path `{0}` has no file name")]
    NoFileName(String),

    #[error("Failed to create rolling file appender: {0}")]
    Appender(#[from] tracing_appender::rolling::InitError),
}

/// Builds the level filter, `directive` takes precedence over `RUST_LOG`
pub fn env_filter(directive: Option<&str>) -> filter::EnvFilter {
    let builder =
        filter::EnvFilter::builder().with_default_directive(filter::LevelFilter::INFO.into());
    match directive {
        Some(directive) => builder.parse_lossy(directive),
        None => builder.from_env_lossy(),
    }
}

/// initiate the global tracing subscriber
///
/// Does nothing when the process already installed a subscriber.
pub fn init(directive: Option<&str>) {
    let fmt_layer = layer().with_writer(std::io::stderr).with_target(true);

    if registry()
        .with(env_filter(directive))
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        tracing::debug!("global subscriber already set, keeping it");
    }
}

/// initiate the global tracing subscriber and tee events into a daily rolling file
///
/// The returned guard flushes the file writer on drop and must be kept alive
/// for as long as logging is needed.
pub fn init_with_file<P: AsRef<Path>>(
    path: P,
    directive: Option<&str>,
) -> Result<WorkerGuard, LoggingError> {
    let path = path.as_ref();
    let file_name = path
        .file_name()
        .and_then(|f| f.to_str())
        .ok_or_else(|| LoggingError::NoFileName(path.display().to_string()))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(file_name)
        .max_log_files(MAX_LOG_FILES)
        .build(dir)?;
    let (file_writer, file_guard) = tracing_appender::non_blocking(appender);

    let fmt_layer = layer().with_writer(std::io::stderr).with_target(true);
    let file_layer = layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true);

    if registry()
        .with(env_filter(directive))
        .with(fmt_layer)
        .with(file_layer)
        .try_init()
        .is_err()
    {
        tracing::debug!("global subscriber already set, file logging disabled");
    }
    Ok(file_guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_directive_overrides_default_level() {
        let filter = env_filter(Some("scaler_plugin=debug"));
        assert!(filter.to_string().contains("scaler_plugin=debug"));
    }

    #[test]
    fn rejects_path_without_file_name() {
        let err = init_with_file("/", None).unwrap_err();
        assert!(matches!(err, LoggingError::NoFileName(_)));
    }

    #[test]
    fn creates_log_file_in_target_directory() {
        let dir = tempfile::tempdir().unwrap();
        let guard = init_with_file(dir.path().join("scaler.log"), Some("info")).unwrap();
        drop(guard);

        let created = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(Result::ok)
            .any(|e| e.file_name().to_string_lossy().starts_with("scaler.log"));
        assert!(created, "rolling appender should create its file eagerly");
    }
}
