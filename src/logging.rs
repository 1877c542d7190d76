//! Structured logging setup
//!
//! Provides JSON-formatted and human-readable logging on stderr with
//! optional file output. Stdout is left to the rendered blog view.

use crate::config::LoggingConfig;
use anyhow::Result;
use std::fs::OpenOptions;
use std::sync::Arc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Turn a configured level into an `EnvFilter` directive.
///
/// A bare level (`info`, `debug`, ...) applies to this crate only so that
/// dependency chatter stays out of the terminal; anything containing `=` or
/// `,` is used as a full directive.
///
/// # Examples
///
/// ```
/// use cryptoblog::logging::filter_directive;
///
/// assert_eq!(filter_directive("debug"), "cryptoblog=debug");
/// assert_eq!(filter_directive("warn,cryptoblog=trace"), "warn,cryptoblog=trace");
/// ```
pub fn filter_directive(level: &str) -> String {
    let level = level.trim();
    if level.contains('=') || level.contains(',') {
        level.to_string()
    } else {
        format!("cryptoblog={}", level)
    }
}

/// Initialize logging based on configuration.
///
/// `RUST_LOG` takes precedence over the configured level.
///
/// # Errors
///
/// Returns error if the filter is invalid or the log file cannot be opened
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter_directive(&config.level)))?;

    let registry = tracing_subscriber::registry().with(env_filter);

    if config.json_format {
        let stderr_layer = fmt::layer()
            .json()
            .with_current_span(true)
            .with_writer(std::io::stderr);

        if let Some(file_path) = &config.file_path {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(file_path)?;

            let file_layer = fmt::layer()
                .json()
                .with_current_span(true)
                .with_writer(Arc::new(file));

            registry.with(stderr_layer).with(file_layer).try_init()?;
        } else {
            registry.with(stderr_layer).try_init()?;
        }
    } else {
        let stderr_layer = fmt::layer()
            .with_target(false)
            .with_level(true)
            .with_writer(std::io::stderr);

        if let Some(file_path) = &config.file_path {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(file_path)?;

            let file_layer = fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_level(true)
                .with_writer(Arc::new(file));

            registry.with(stderr_layer).with(file_layer).try_init()?;
        } else {
            registry.with(stderr_layer).try_init()?;
        }
    }

    Ok(())
}
