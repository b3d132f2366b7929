//! Logging utilities for schema_migrate
//!
//! This module provides logging setup and configuration.

use std::fs::File;
use std::path::Path;
use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::{Error, Result};

/// Map a configured level name to a tracing level, defaulting to INFO
pub fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Initialize logging based on configuration.
///
/// Without a configuration, logs go to stderr at INFO. `RUST_LOG` directives
/// are honoured on top of the configured level.
pub fn init_logging(config: &Option<LoggingConfig>) -> Result<()> {
    let config = config.clone().unwrap_or_default();
    let level = parse_level(&config.level);

    let directive = format!("schema_migrate={}", level)
        .parse()
        .map_err(|e| Error::ConfigError(format!("Invalid log level {}: {}", config.level, e)))?;
    let env_filter = EnvFilter::from_default_env().add_directive(directive);
    let json = config.format.eq_ignore_ascii_case("json");

    let result = match (&config.file, json) {
        (Some(file_path), json) => {
            if let Some(parent) = Path::new(file_path).parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = File::create(file_path)?;
            let builder = fmt::Subscriber::builder()
                .with_env_filter(env_filter)
                .with_ansi(false)
                .with_writer(file);
            if json {
                tracing::subscriber::set_global_default(builder.json().finish())
            } else {
                tracing::subscriber::set_global_default(builder.finish())
            }
        }
        (None, true) if config.stdout => tracing::subscriber::set_global_default(
            fmt::Subscriber::builder()
                .json()
                .with_env_filter(env_filter)
                .finish(),
        ),
        (None, true) => tracing::subscriber::set_global_default(
            fmt::Subscriber::builder()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .finish(),
        ),
        (None, false) if config.stdout => tracing::subscriber::set_global_default(
            fmt::Subscriber::builder()
                .with_env_filter(env_filter)
                .finish(),
        ),
        (None, false) => tracing::subscriber::set_global_default(
            fmt::Subscriber::builder()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .finish(),
        ),
    };

    result.map_err(|e| Error::Unknown(e.to_string()))
}
