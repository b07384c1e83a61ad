//! Tracing setup
//!
//! File output always goes through a non-blocking rolling appender. Text
//! mode also echoes to stdout; JSON mode writes the file only.

use crate::config::AppConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Map the `rotation` config value; anything unknown means one file forever.
fn rotation(name: &str) -> Rotation {
    match name {
        "minutely" => Rotation::MINUTELY,
        "hourly" => Rotation::HOURLY,
        "daily" => Rotation::DAILY,
        _ => Rotation::NEVER,
    }
}

/// `RUST_LOG` wins; otherwise the configured level with sqlx quieted, since
/// it logs every statement at info.
fn filter_directives(log_level: &str) -> String {
    format!("{},sqlx=warn", log_level)
}

/// Install the global subscriber. Keep the guard alive until shutdown or
/// buffered file output is lost.
pub fn init_logging(config: &AppConfig) -> WorkerGuard {
    let appender = RollingFileAppender::new(
        rotation(&config.rotation),
        &config.log_dir,
        &config.log_file,
    );
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(&config.log_level)));
    let registry = tracing_subscriber::registry().with(filter);

    if config.use_json {
        registry
            .with(fmt::layer().json().with_writer(writer).with_ansi(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(writer).with_ansi(false))
            .with(fmt::layer().with_target(false))
            .init();
    }

    tracing::debug!(
        dir = %config.log_dir,
        file = %config.log_file,
        rotation = %config.rotation,
        json = config.use_json,
        "Logging initialized"
    );
    guard
}
