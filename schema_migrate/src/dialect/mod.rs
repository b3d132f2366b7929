//! SQL dialect handling
//!
//! Type conversion is two-phase: a dialect-specific type is normalized to a
//! [`CanonicalType`], which is then projected onto the target dialect. Adding a
//! dialect means adding one projection arm, not a pairwise table.

pub mod mapper;
pub mod transformer;
pub mod types;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

pub use transformer::{TransformWarning, Transformation, Transformer};
pub use types::{normalize_type, CanonicalType};

/// Supported SQL dialects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Postgres,
    #[serde(rename = "mysql")]
    MySql,
    #[serde(rename = "sqlserver")]
    SqlServer,
}

impl Dialect {
    /// Every supported dialect, in canonical order
    pub const ALL: [Dialect; 3] = [Dialect::Postgres, Dialect::MySql, Dialect::SqlServer];

    /// Canonical dialect identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Postgres => "postgres",
            Dialect::MySql => "mysql",
            Dialect::SqlServer => "sqlserver",
        }
    }

    /// Human-readable product name, used in warnings
    pub fn product_name(&self) -> &'static str {
        match self {
            Dialect::Postgres => "PostgreSQL",
            Dialect::MySql => "MySQL",
            Dialect::SqlServer => "SQL Server",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses the canonical identifiers only.
///
/// Matching is case-sensitive and there is no aliasing: `postgresql` or
/// `Postgres` are rejected with [`Error::UnsupportedDialect`].
impl FromStr for Dialect {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "postgres" => Ok(Dialect::Postgres),
            "mysql" => Ok(Dialect::MySql),
            "sqlserver" => Ok(Dialect::SqlServer),
            other => Err(Error::UnsupportedDialect(other.to_string())),
        }
    }
}

/// Canonical names of all supported dialects
pub fn supported_dialects() -> Vec<&'static str> {
    Dialect::ALL.iter().map(Dialect::as_str).collect()
}
