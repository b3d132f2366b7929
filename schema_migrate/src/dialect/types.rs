//! Canonical type normalization
//!
//! Maps a dialect-specific type token to one member of a closed set of
//! canonical types. Unknown tokens fall through as [`CanonicalType::Other`];
//! normalization never fails.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static LENGTH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(\s*(\d+|MAX)\s*\)").expect("valid length regex"));

/// Length used when a variable-length string type carries none
pub const DEFAULT_VARCHAR_LENGTH: u32 = 255;

/// Dialect-independent pivot type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CanonicalType {
    Integer,
    BigInt,
    SmallInt,
    Boolean,
    Varchar(u32),
    Text,
    /// CHAR / CHAR(n) / NCHAR..., kept as written (upper-cased)
    Char(String),
    Timestamp,
    TimestampTz,
    Date,
    Time,
    /// DECIMAL / NUMERIC with precision and scale kept as written
    Decimal(String),
    Real,
    Double,
    Binary,
    Json,
    Uuid,
    /// Anything unrecognised, upper-cased and trimmed
    Other(String),
}

impl fmt::Display for CanonicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CanonicalType::Integer => f.write_str("INTEGER"),
            CanonicalType::BigInt => f.write_str("BIGINT"),
            CanonicalType::SmallInt => f.write_str("SMALLINT"),
            CanonicalType::Boolean => f.write_str("BOOLEAN"),
            CanonicalType::Varchar(len) => write!(f, "VARCHAR({})", len),
            CanonicalType::Text => f.write_str("TEXT"),
            CanonicalType::Char(raw) => f.write_str(raw),
            CanonicalType::Timestamp => f.write_str("TIMESTAMP"),
            CanonicalType::TimestampTz => f.write_str("TIMESTAMP_TZ"),
            CanonicalType::Date => f.write_str("DATE"),
            CanonicalType::Time => f.write_str("TIME"),
            CanonicalType::Decimal(raw) => f.write_str(raw),
            CanonicalType::Real => f.write_str("REAL"),
            CanonicalType::Double => f.write_str("DOUBLE"),
            CanonicalType::Binary => f.write_str("BINARY"),
            CanonicalType::Json => f.write_str("JSON"),
            CanonicalType::Uuid => f.write_str("UUID"),
            CanonicalType::Other(raw) => f.write_str(raw),
        }
    }
}

/// Upper-case, trim and collapse inner whitespace of a type token
pub fn clean_type(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_uppercase()
}

/// Normalize a raw type token to its canonical type
pub fn normalize_type(raw: &str) -> CanonicalType {
    let t = clean_type(raw);

    match t.as_str() {
        "INT" | "INTEGER" | "INT4" => CanonicalType::Integer,
        "BIGINT" | "INT8" => CanonicalType::BigInt,
        "SMALLINT" | "TINYINT" | "INT2" => CanonicalType::SmallInt,

        "BOOLEAN" | "BOOL" | "BIT" | "TINYINT(1)" => CanonicalType::Boolean,

        s if s.starts_with("VARCHAR")
            || s.starts_with("NVARCHAR")
            || s.starts_with("CHARACTER VARYING") =>
        {
            varchar_type(s)
        }

        "TEXT" | "LONGTEXT" | "MEDIUMTEXT" | "NTEXT" => CanonicalType::Text,

        s if s == "CHAR" || s.starts_with("CHAR(") || s.starts_with("NCHAR") => {
            CanonicalType::Char(s.to_string())
        }

        "TIMESTAMP" | "TIMESTAMP WITHOUT TIME ZONE" | "DATETIME" | "DATETIME2" => {
            CanonicalType::Timestamp
        }
        "TIMESTAMP WITH TIME ZONE" | "TIMESTAMPTZ" | "DATETIMEOFFSET" => CanonicalType::TimestampTz,
        "DATE" => CanonicalType::Date,
        "TIME" | "TIME WITHOUT TIME ZONE" => CanonicalType::Time,

        s if s.starts_with("DECIMAL") || s.starts_with("NUMERIC") => {
            CanonicalType::Decimal(s.to_string())
        }
        "FLOAT" | "REAL" | "FLOAT4" => CanonicalType::Real,
        "DOUBLE" | "DOUBLE PRECISION" | "FLOAT8" => CanonicalType::Double,

        "BYTEA" | "BLOB" | "LONGBLOB" | "VARBINARY(MAX)" | "IMAGE" => CanonicalType::Binary,

        "JSON" | "JSONB" => CanonicalType::Json,
        "UUID" | "UNIQUEIDENTIFIER" => CanonicalType::Uuid,

        other => CanonicalType::Other(other.to_string()),
    }
}

/// Canonical form of a length-parameterized string type.
///
/// `(n)` gives `VARCHAR(n)`, `(MAX)` gives `TEXT`, no length gives
/// `VARCHAR(255)`.
fn varchar_type(upper: &str) -> CanonicalType {
    match LENGTH_RE.captures(upper) {
        Some(caps) if &caps[1] == "MAX" => CanonicalType::Text,
        Some(caps) => match caps[1].parse() {
            Ok(len) => CanonicalType::Varchar(len),
            Err(_) => CanonicalType::Other(upper.to_string()),
        },
        None => CanonicalType::Varchar(DEFAULT_VARCHAR_LENGTH),
    }
}

/// True for keywords of the identity / auto-increment family.
///
/// `IDENTITY(1,1)` and other parameterized forms match as well.
pub fn is_identity_keyword(word: &str) -> bool {
    let upper = word.to_ascii_uppercase();
    matches!(
        upper.as_str(),
        "SERIAL"
            | "BIGSERIAL"
            | "SMALLSERIAL"
            | "SERIAL4"
            | "SERIAL8"
            | "AUTO_INCREMENT"
            | "AUTOINCREMENT"
    ) || upper == "IDENTITY"
        || upper.starts_with("IDENTITY(")
}

/// True when any word of a type or modifier text marks an identity column
pub fn has_identity_marker(text: &str) -> bool {
    text.split_whitespace().any(is_identity_keyword)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("int", CanonicalType::Integer)]
    #[case("INTEGER", CanonicalType::Integer)]
    #[case("bigint", CanonicalType::BigInt)]
    #[case("tinyint", CanonicalType::SmallInt)]
    #[case("TINYINT(1)", CanonicalType::Boolean)]
    #[case("bit", CanonicalType::Boolean)]
    #[case("bool", CanonicalType::Boolean)]
    #[case("varchar(100)", CanonicalType::Varchar(100))]
    #[case("NVARCHAR(40)", CanonicalType::Varchar(40))]
    #[case("character varying(12)", CanonicalType::Varchar(12))]
    #[case("VARCHAR", CanonicalType::Varchar(255))]
    #[case("NVARCHAR(MAX)", CanonicalType::Text)]
    #[case("longtext", CanonicalType::Text)]
    #[case("timestamp without time zone", CanonicalType::Timestamp)]
    #[case("DATETIME2", CanonicalType::Timestamp)]
    #[case("timestamptz", CanonicalType::TimestampTz)]
    #[case("TIMESTAMP  WITH TIME ZONE", CanonicalType::TimestampTz)]
    #[case("DATETIMEOFFSET", CanonicalType::TimestampTz)]
    #[case("float", CanonicalType::Real)]
    #[case("double precision", CanonicalType::Double)]
    #[case("bytea", CanonicalType::Binary)]
    #[case("VARBINARY(MAX)", CanonicalType::Binary)]
    #[case("jsonb", CanonicalType::Json)]
    #[case("uniqueidentifier", CanonicalType::Uuid)]
    fn test_normalize_known_types(#[case] raw: &str, #[case] expected: CanonicalType) {
        assert_eq!(normalize_type(raw), expected);
    }

    #[test]
    fn test_passthrough_types() {
        assert_eq!(
            normalize_type("numeric(10,2)"),
            CanonicalType::Decimal("NUMERIC(10,2)".to_string())
        );
        assert_eq!(normalize_type("char(2)"), CanonicalType::Char("CHAR(2)".to_string()));
        assert_eq!(
            normalize_type(" geometry "),
            CanonicalType::Other("GEOMETRY".to_string())
        );
    }

    #[test]
    fn test_display_uses_canonical_names() {
        assert_eq!(CanonicalType::TimestampTz.to_string(), "TIMESTAMP_TZ");
        assert_eq!(CanonicalType::Varchar(255).to_string(), "VARCHAR(255)");
        assert_eq!(normalize_type("decimal(8, 3)").to_string(), "DECIMAL(8, 3)");
    }

    #[test]
    fn test_identity_keywords() {
        assert!(is_identity_keyword("serial"));
        assert!(is_identity_keyword("BIGSERIAL"));
        assert!(is_identity_keyword("AUTO_INCREMENT"));
        assert!(is_identity_keyword("IDENTITY(1,1)"));
        assert!(!is_identity_keyword("identity_hint"));
        assert!(has_identity_marker("INT AUTO_INCREMENT"));
        assert!(!has_identity_marker("INTEGER"));
    }
}
