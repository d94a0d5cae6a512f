//! File logging. stdout belongs to the command loop, so everything goes to
//! a daily rotated file under the configured log directory.

use anyhow::{Context, Result};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

const LOG_FILE_PREFIX: &str = "groov";

/// Install the global subscriber. `RUST_LOG` overrides the configured filter.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let log_dir = config.resolve_directory()?;
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    // Flushes on drop; must outlive every log call
    Box::leak(Box::new(guard));

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .context("Invalid log filter")?;

    let fmt_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .context("Logging already initialized")?;

    tracing::info!("Logging initialized, writing to {}", log_dir.display());
    Ok(())
}
