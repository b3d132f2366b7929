//! Configuration handling for schema_migrate

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::output::OutputFormat;

/// Load configuration from a TOML file
pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    let config_str = fs::read_to_string(path).map_err(|e| {
        Error::ConfigError(format!("Failed to read config file {}: {}", path.display(), e))
    })?;

    let config: Config = toml::from_str(&config_str)
        .map_err(|e| Error::ConfigError(format!("Failed to parse config file: {}", e)))?;

    Ok(config)
}

/// Represents the complete schema_migrate configuration.
///
/// Every section is optional in the file and falls back to its default.
#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub logging: Option<LoggingConfig>,
    pub dialects: DialectsConfig,
    pub output: OutputConfig,
    pub parser: ParserConfig,
}

/// Logging configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
    /// `text` or `json`
    pub format: String,
    /// Log to stdout instead of stderr when no file is set
    pub stdout: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            format: "text".to_string(),
            stdout: false,
        }
    }
}

/// Default dialects used when the command line does not name one
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct DialectsConfig {
    pub source: Dialect,
    pub target: Dialect,
}

impl Default for DialectsConfig {
    fn default() -> Self {
        Self {
            source: Dialect::Postgres,
            target: Dialect::Postgres,
        }
    }
}

/// Output rendering configuration
#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

/// Parser behavior configuration
#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ParserConfig {
    /// Print statements the parser skipped to stderr
    pub report_skipped: bool,
}
