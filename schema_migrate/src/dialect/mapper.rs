//! Canonical-to-dialect projections
//!
//! Every table here is a pure function matched on [`Dialect`], so adding a
//! dialect is a compile error until each projection handles it.

use super::types::{clean_type, CanonicalType};
use super::Dialect;

/// Project a canonical type onto a target dialect
pub fn project_type(canonical: &CanonicalType, to: Dialect) -> String {
    match to {
        Dialect::Postgres => to_postgres(canonical),
        Dialect::MySql => to_mysql(canonical),
        Dialect::SqlServer => to_sqlserver(canonical),
    }
}

fn to_postgres(canonical: &CanonicalType) -> String {
    match canonical {
        CanonicalType::Boolean => "BOOLEAN".to_string(),
        CanonicalType::Timestamp => "TIMESTAMP".to_string(),
        CanonicalType::TimestampTz => "TIMESTAMP WITH TIME ZONE".to_string(),
        CanonicalType::Binary => "BYTEA".to_string(),
        CanonicalType::Json => "JSONB".to_string(),
        CanonicalType::Uuid => "UUID".to_string(),
        CanonicalType::Double => "DOUBLE PRECISION".to_string(),
        other => other.to_string(),
    }
}

fn to_mysql(canonical: &CanonicalType) -> String {
    match canonical {
        CanonicalType::Boolean => "TINYINT(1)".to_string(),
        CanonicalType::Timestamp => "DATETIME".to_string(),
        // no offset is stored; flagged by data_loss_note
        CanonicalType::TimestampTz => "TIMESTAMP".to_string(),
        CanonicalType::Binary => "LONGBLOB".to_string(),
        CanonicalType::Json => "JSON".to_string(),
        CanonicalType::Uuid => "CHAR(36)".to_string(),
        CanonicalType::Double => "DOUBLE".to_string(),
        CanonicalType::Text => "LONGTEXT".to_string(),
        other => other.to_string(),
    }
}

fn to_sqlserver(canonical: &CanonicalType) -> String {
    match canonical {
        CanonicalType::Boolean => "BIT".to_string(),
        CanonicalType::Timestamp => "DATETIME2".to_string(),
        CanonicalType::TimestampTz => "DATETIMEOFFSET".to_string(),
        CanonicalType::Binary => "VARBINARY(MAX)".to_string(),
        CanonicalType::Json => "NVARCHAR(MAX)".to_string(),
        CanonicalType::Uuid => "UNIQUEIDENTIFIER".to_string(),
        CanonicalType::Double => "FLOAT".to_string(),
        CanonicalType::Text => "NVARCHAR(MAX)".to_string(),
        CanonicalType::Integer => "INT".to_string(),
        CanonicalType::Varchar(len) => format!("NVARCHAR({})", len),
        other => other.to_string(),
    }
}

/// Target syntax for an identity column.
///
/// The base numeric width is irrelevant except for the BIGINT family, which
/// selects the big variant.
pub fn identity_type(raw: &str, to: Dialect) -> String {
    let is_big = raw.to_ascii_uppercase().contains("BIG");

    match (to, is_big) {
        (Dialect::Postgres, true) => "BIGSERIAL".to_string(),
        (Dialect::Postgres, false) => "SERIAL".to_string(),
        (Dialect::MySql, true) => "BIGINT AUTO_INCREMENT".to_string(),
        (Dialect::MySql, false) => "INT AUTO_INCREMENT".to_string(),
        (Dialect::SqlServer, true) => "BIGINT IDENTITY(1,1)".to_string(),
        (Dialect::SqlServer, false) => "INT IDENTITY(1,1)".to_string(),
    }
}

/// Default-value families recognised regardless of source dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DefaultFamily {
    CurrentTimestamp,
    Boolean(bool),
    RandomUuid,
}

fn classify_default(raw: &str) -> Option<DefaultFamily> {
    match raw.trim().to_ascii_uppercase().as_str() {
        "NOW()" | "CURRENT_TIMESTAMP" | "GETDATE()" | "GETUTCDATE()" => {
            Some(DefaultFamily::CurrentTimestamp)
        }
        "TRUE" => Some(DefaultFamily::Boolean(true)),
        "FALSE" => Some(DefaultFamily::Boolean(false)),
        "GEN_RANDOM_UUID()" | "UUID()" | "NEWID()" => Some(DefaultFamily::RandomUuid),
        _ => None,
    }
}

/// Rewrite a default expression for the target dialect.
///
/// Unrecognised expressions are returned verbatim.
pub fn map_default(raw: &str, to: Dialect) -> String {
    let Some(family) = classify_default(raw) else {
        return raw.to_string();
    };

    match (family, to) {
        (DefaultFamily::CurrentTimestamp, Dialect::Postgres) => "NOW()".to_string(),
        (DefaultFamily::CurrentTimestamp, Dialect::MySql) => "CURRENT_TIMESTAMP".to_string(),
        (DefaultFamily::CurrentTimestamp, Dialect::SqlServer) => "GETDATE()".to_string(),

        (DefaultFamily::Boolean(_), Dialect::Postgres) => raw.to_string(),
        (DefaultFamily::Boolean(value), Dialect::MySql | Dialect::SqlServer) => {
            let literal = if value { "1" } else { "0" };
            literal.to_string()
        }

        (DefaultFamily::RandomUuid, Dialect::Postgres) => "gen_random_uuid()".to_string(),
        (DefaultFamily::RandomUuid, Dialect::MySql) => "UUID()".to_string(),
        (DefaultFamily::RandomUuid, Dialect::SqlServer) => "NEWID()".to_string(),
    }
}

/// Degrade an index access method the target cannot express.
///
/// `None` means "no explicit method, let the target choose".
pub fn map_index_method(method: Option<&str>, to: Dialect) -> Option<String> {
    let method = method.map(str::trim).filter(|m| !m.is_empty())?;
    let upper = method.to_ascii_uppercase();

    match to {
        Dialect::Postgres => Some(method.to_string()),
        Dialect::MySql => match upper.as_str() {
            "GIN" | "GIST" | "BRIN" => Some("BTREE".to_string()),
            _ => Some(upper),
        },
        // SQL Server has CLUSTERED/NONCLUSTERED rather than access methods
        Dialect::SqlServer => None,
    }
}

/// Advisory note when a column cannot be represented faithfully in `to`
pub fn data_loss_note(raw: &str, canonical: &CanonicalType, to: Dialect) -> Option<&'static str> {
    match (canonical, to) {
        (CanonicalType::Json, Dialect::SqlServer) => {
            Some("JSON stored as NVARCHAR(MAX) - JSON functions available but no native type")
        }
        (CanonicalType::Uuid, Dialect::MySql) => {
            Some("UUID stored as CHAR(36) - no native UUID type in MySQL")
        }
        (CanonicalType::TimestampTz, Dialect::MySql) => {
            Some("Timezone information will be lost - MySQL TIMESTAMP stores no offset")
        }
        (CanonicalType::Double, Dialect::SqlServer) if clean_type(raw) == "DOUBLE PRECISION" => {
            Some("DOUBLE PRECISION mapped to FLOAT - verify precision requirements")
        }
        _ => None,
    }
}
