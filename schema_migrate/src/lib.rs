//! schema_migrate: parse, compare and convert relational database schemas
//!
//! SQL DDL is parsed into a dialect-neutral [`Schema`] model. Two schemas can
//! be diffed structurally, and a schema can be transformed between the
//! PostgreSQL, MySQL and SQL Server dialects or rendered back into DDL.
//!
//! ```
//! let source = schema_migrate::parse_sql("CREATE TABLE users (id SERIAL PRIMARY KEY);");
//! let target = schema_migrate::parse_sql(
//!     "CREATE TABLE users (id SERIAL PRIMARY KEY, email TEXT NOT NULL);",
//! );
//! let changes = schema_migrate::diff(&source, &target);
//! assert_eq!(changes.modified_tables[0].added_columns[0].name, "email");
//! ```

pub mod config;
pub mod dialect;
pub mod error;
pub mod output;
pub mod schema;
pub mod utils;

use std::path::Path;

// Re-export main types for easier access
pub use config::Config;
pub use dialect::{Dialect, TransformWarning, Transformation, Transformer};
pub use error::{Error, Result};
pub use output::OutputFormat;
pub use schema::diff::{Changes, ColumnChanges, Differ, TableChanges, ViewChanges};
pub use schema::generator::SqlGenerator;
pub use schema::parser::{ParseReport, SchemaParser, SkipReason, SkippedStatement};
pub use schema::types::{
    Column, Constraint, ConstraintKind, ForeignKey, Index, PrimaryKey, Schema, Table, View,
};

/// Parse SQL DDL text into a schema.
///
/// Statements that are not CREATE TABLE / INDEX / VIEW, or that cannot be
/// parsed, are skipped. Use [`SchemaParser::parse_with_report`] to see them.
pub fn parse_sql(sql: &str) -> Schema {
    schema::parser::parse_sql(sql)
}

/// Read and parse a SQL DDL file
pub fn parse_file(path: impl AsRef<Path>) -> Result<Schema> {
    schema::parser::parse_file(path)
}

/// Compute the structural differences from `source` to `target`
pub fn diff(source: &Schema, target: &Schema) -> Changes {
    schema::diff::diff(source, target)
}

/// Transform a schema between dialects named by their canonical identifiers.
///
/// Fails only when a dialect name is not one of `postgres`, `mysql` or
/// `sqlserver`.
pub fn transform(schema: &Schema, from: &str, to: &str) -> Result<Transformation> {
    let from: Dialect = from.parse()?;
    let to: Dialect = to.parse()?;
    Ok(Transformer::new(from, to).transform(schema))
}

/// Render a schema as DDL for the named dialect
pub fn generate_sql(schema: &Schema, dialect: &str) -> Result<String> {
    let dialect: Dialect = dialect.parse()?;
    Ok(SqlGenerator::new(dialect).generate(schema))
}

/// Canonical names of all supported dialects
pub fn supported_dialects() -> Vec<&'static str> {
    dialect::supported_dialects()
}
