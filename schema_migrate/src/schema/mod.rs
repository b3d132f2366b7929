//! Schema module
//!
//! The schema model plus everything that produces or consumes it: the DDL
//! parser, the differ and the DDL generator.

pub mod diff;
pub mod generator;
pub mod parser;
pub mod splitter;
pub mod types;

// Re-export key types
pub use diff::{diff, ColumnChanges, Changes, Differ, TableChanges, ViewChanges};
pub use generator::SqlGenerator;
pub use parser::{parse_file, parse_sql, ParseReport, SchemaParser, SkipReason, SkippedStatement};
pub use types::{
    Column, Constraint, ConstraintKind, ForeignKey, Index, PrimaryKey, Schema, Table, View,
};
