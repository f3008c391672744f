//! Tracing setup.
//!
//! Logs always go to an append-only file. The interactive dashboard owns the
//! terminal, so the stderr layer is only added for the batch commands.

use std::fs::OpenOptions;
use std::sync::Arc;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;
use crate::error::AppError;

/// Install the global subscriber. `RUST_LOG` takes precedence over the configured level.
pub fn init(config: &LoggingConfig, to_stderr: bool) -> Result<(), AppError> {
    if let Some(dir) = config.file.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .map_err(|e| AppError::new(4, format!("Failed to create log dir '{}': {e}", dir.display())))?;
    }

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.file)
        .map_err(|e| AppError::new(4, format!("Failed to open log file '{}': {e}", config.file.display())))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let stderr_layer = to_stderr.then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Arc::new(log_file))
                .with_ansi(false),
        )
        .try_init()
        .map_err(|e| AppError::new(4, format!("Failed to initialize logging: {e}")))
}
