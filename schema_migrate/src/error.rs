//! Error types for schema_migrate

use thiserror::Error;

/// Result type for schema_migrate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for schema_migrate
///
/// Parsing and diffing never fail on malformed SQL: unparseable statements are
/// skipped and structural mismatches become reported changes. The variants here
/// cover dialect-name validation and the file/serialization adapters.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Unsupported dialect: {0} (expected one of: postgres, mysql, sqlserver)")]
    UnsupportedDialect(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Convert Serde JSON errors to schema_migrate errors
impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::SerializationError(error.to_string())
    }
}

/// Convert Serde YAML errors to schema_migrate errors
impl From<serde_yaml::Error> for Error {
    fn from(error: serde_yaml::Error) -> Self {
        Error::SerializationError(error.to_string())
    }
}

/// Convert text formatting errors to schema_migrate errors
impl From<std::fmt::Error> for Error {
    fn from(error: std::fmt::Error) -> Self {
        Error::SerializationError(error.to_string())
    }
}

/// Convert TOML deserialization errors to schema_migrate errors
impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Self {
        Error::ConfigError(error.to_string())
    }
}
