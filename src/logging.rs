use crate::config::LoggingConfig;
use crate::constants::LOG_FILE_NAME;
use crate::error::Result;
use std::fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initializes the logging system with console output and, when a log
/// directory is configured, a daily-rotated JSON file.
///
/// The returned guard flushes the file writer on drop; hold it until exit.
/// Fails when the log directory cannot be created or opened.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    // Respect RUST_LOG if set; otherwise use the configured filter
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter));

    // Console output goes to stderr so stdout stays with the progress messages
    let console_layer = fmt::layer().with_target(true).with_writer(std::io::stderr);

    let (file_layer, guard) = match &config.directory {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            let file_appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix(LOG_FILE_NAME)
                .build(dir)?;
            let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);
            let layer = fmt::layer().json().with_writer(non_blocking_writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    // A second init (e.g. from tests) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init();

    Ok(guard)
}
