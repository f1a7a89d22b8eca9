//! Tracing subscriber setup.
//!
//! Events go to two places: a non-rotating `vswitch.log` under the data root
//! (level from `VSWITCH_LOG`, `info` by default) and stderr (warnings and
//! errors only). User-facing progress text is printed by the commands and
//! never goes through tracing.

use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use crate::toolchain::paths::LOG_FILE;

/// Environment variable holding the log file filter directives.
pub const LOG_ENV: &str = "VSWITCH_LOG";

const DEFAULT_FILE_LEVEL: &str = "info";
const STDERR_LEVEL: &str = "warn";

/// Installs the global subscriber.
///
/// The returned guard flushes the log file when dropped and must be held
/// until the process exits.
///
/// # Errors
///
/// Returns an error if the data root cannot be created, the log file
/// cannot be opened, or a global subscriber is already installed.
pub fn init(root: &Path) -> Result<WorkerGuard> {
    std::fs::create_dir_all(root)
        .with_context(|| format!("Failed to create data directory {}", root.display()))?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(LOG_FILE)
        .build(root)
        .with_context(|| format!("Failed to open log file in {}", root.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let file_filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILE_LEVEL));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(file_filter),
        )
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact()
                .with_filter(EnvFilter::new(STDERR_LEVEL)),
        )
        .try_init()
        .context("Failed to install the tracing subscriber")?;

    Ok(guard)
}
