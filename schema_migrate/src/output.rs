//! Output rendering
//!
//! Text, JSON and YAML renderers for schemas and diffs. Rendering is a pure
//! function of its input, so the same value always renders identically.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};

use crate::dialect::{Dialect, TransformWarning};
use crate::error::{Error, Result};
use crate::schema::diff::{Changes, ColumnChanges, TableChanges};
use crate::schema::generator::SqlGenerator;
use crate::schema::types::Schema;

const RULE_WIDTH: usize = 40;

/// Output format for rendered schemas and diffs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml,
    /// DDL for the chosen dialect (schemas only)
    Sql,
}

/// Render a schema. `dialect` is only used by [`OutputFormat::Sql`].
pub fn render_schema(schema: &Schema, format: OutputFormat, dialect: Dialect) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(schema_text(schema)?),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(schema)? + "\n"),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(schema)?),
        OutputFormat::Sql => Ok(SqlGenerator::new(dialect).generate(schema)),
    }
}

/// Render a diff. SQL output is not supported for diffs.
pub fn render_changes(changes: &Changes, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(changes_text(changes)?),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(changes)? + "\n"),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(changes)?),
        OutputFormat::Sql => Err(Error::SerializationError(
            "sql output is only available for schemas".to_string(),
        )),
    }
}

/// One warning per line, prefixed with `WARNING:`
pub fn render_warnings(warnings: &[TransformWarning]) -> String {
    warnings
        .iter()
        .map(|warning| format!("WARNING: {}\n", warning))
        .collect()
}

fn nullability(nullable: bool) -> &'static str {
    if nullable {
        "NULL"
    } else {
        "NOT NULL"
    }
}

fn schema_text(schema: &Schema) -> std::result::Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(
        out,
        "Schema: {} tables, {} indexes, {} views\n",
        schema.tables.len(),
        schema.indexes.len(),
        schema.views.len()
    )?;

    for table in &schema.tables {
        writeln!(out, "Table: {}", table.qualified_name())?;
        writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;

        for column in &table.columns {
            let pk = if column.is_primary_key { " [PK]" } else { "" };
            writeln!(
                out,
                "  {:<20} {:<15} {}{}",
                column.name,
                column.data_type,
                nullability(column.nullable),
                pk
            )?;
        }

        if !table.foreign_keys.is_empty() {
            writeln!(out, "\n  Foreign Keys:")?;
            for fk in &table.foreign_keys {
                writeln!(
                    out,
                    "    {} -> {}({})",
                    fk.columns.join(", "),
                    fk.referenced_table,
                    fk.referenced_columns.join(", ")
                )?;
            }
        }

        if !table.indexes.is_empty() {
            writeln!(out, "\n  Indexes:")?;
            for index in &table.indexes {
                let unique = if index.is_unique { " UNIQUE" } else { "" };
                writeln!(out, "    {}{} ({})", index.name, unique, index.columns.join(", "))?;
            }
        }

        out.push('\n');
    }

    if !schema.indexes.is_empty() {
        writeln!(out, "Indexes:")?;
        for index in &schema.indexes {
            let unique = if index.is_unique { " UNIQUE" } else { "" };
            writeln!(
                out,
                "  {}{} ON {} ({})",
                index.name,
                unique,
                index.table,
                index.columns.join(", ")
            )?;
        }
        out.push('\n');
    }

    if !schema.views.is_empty() {
        writeln!(out, "Views:")?;
        for view in &schema.views {
            let kind = if view.is_materialized { " [MATERIALIZED]" } else { "" };
            writeln!(out, "  {}{}", view.name, kind)?;
        }
        out.push('\n');
    }

    Ok(out)
}

fn changes_text(changes: &Changes) -> std::result::Result<String, fmt::Error> {
    if changes.is_empty() {
        return Ok("No differences found.\n".to_string());
    }

    let mut out = String::new();

    section(&mut out, "Added Tables", &changes.added_tables, |t| {
        format!("+ {} ({} columns)", t.name, t.columns.len())
    })?;
    section(&mut out, "Removed Tables", &changes.removed_tables, |t| {
        format!("- {}", t.name)
    })?;

    for table in &changes.modified_tables {
        table_changes_text(&mut out, table)?;
    }

    section(&mut out, "Added Indexes", &changes.added_indexes, |i| {
        format!("+ {} ON {}", i.name, i.table)
    })?;
    section(&mut out, "Removed Indexes", &changes.removed_indexes, |i| {
        format!("- {}", i.name)
    })?;
    section(&mut out, "Added Views", &changes.added_views, |v| format!("+ {}", v.name))?;
    section(&mut out, "Removed Views", &changes.removed_views, |v| format!("- {}", v.name))?;
    section(&mut out, "Modified Views", &changes.modified_views, |v| {
        format!("~ {}", v.name)
    })?;

    Ok(out)
}

/// Titled block of one line per item; nothing when `items` is empty
fn section<T>(
    out: &mut String,
    title: &str,
    items: &[T],
    line: impl Fn(&T) -> String,
) -> fmt::Result {
    if items.is_empty() {
        return Ok(());
    }
    writeln!(out, "{}:", title)?;
    for item in items {
        writeln!(out, "  {}", line(item))?;
    }
    out.push('\n');
    Ok(())
}

fn table_changes_text(out: &mut String, table: &TableChanges) -> fmt::Result {
    writeln!(out, "Modified Table: {}", table.name)?;
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;

    for column in &table.added_columns {
        writeln!(out, "  + Column: {} {}", column.name, column.data_type)?;
    }
    for column in &table.removed_columns {
        writeln!(out, "  - Column: {}", column.name)?;
    }
    for column in &table.modified_columns {
        column_changes_text(out, column)?;
    }
    for index in &table.added_indexes {
        writeln!(out, "  + Index: {}", index.name)?;
    }
    for index in &table.removed_indexes {
        writeln!(out, "  - Index: {}", index.name)?;
    }
    for fk in &table.added_foreign_keys {
        writeln!(out, "  + FK: {} -> {}", fk.columns.join(", "), fk.referenced_table)?;
    }
    for fk in &table.removed_foreign_keys {
        writeln!(out, "  - FK: {} -> {}", fk.columns.join(", "), fk.referenced_table)?;
    }
    if table.primary_key_changed {
        writeln!(out, "  ~ Primary key changed")?;
    }

    out.push('\n');
    Ok(())
}

fn column_changes_text(out: &mut String, column: &ColumnChanges) -> fmt::Result {
    if let (Some(old), Some(new)) = (&column.old_type, &column.new_type) {
        writeln!(out, "  ~ Column {}: type {} -> {}", column.name, old, new)?;
    }
    if column.nullable_changed {
        writeln!(
            out,
            "  ~ Column {}: {} -> {}",
            column.name,
            nullability(column.old_nullable),
            nullability(column.new_nullable)
        )?;
    }
    if column.default_changed {
        writeln!(
            out,
            "  ~ Column {}: default {} -> {}",
            column.name,
            column.old_default.as_deref().unwrap_or("(none)"),
            column.new_default.as_deref().unwrap_or("(none)")
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::diff::diff;
    use crate::schema::types::{Column, Table};
    use pretty_assertions::assert_eq;

    fn sample() -> Schema {
        let mut users = Table::new("users");
        users.columns.push(Column::new("id", "INT").nullable(false));
        users.columns.push(Column::new("email", "TEXT"));
        users.primary_key = Some(crate::schema::types::PrimaryKey {
            name: None,
            columns: vec!["id".to_string()],
        });
        users.columns[0].is_primary_key = true;
        Schema {
            tables: vec![users],
            ..Schema::default()
        }
    }

    #[test]
    fn test_schema_text() {
        let text = render_schema(&sample(), OutputFormat::Text, Dialect::Postgres).unwrap();
        assert!(text.starts_with("Schema: 1 tables, 0 indexes, 0 views\n\nTable: users\n"));
        assert!(text.contains("  id                   INT             NOT NULL [PK]\n"));
        assert!(text.contains("  email                TEXT            NULL\n"));
    }

    #[test]
    fn test_empty_diff_text() {
        let text = render_changes(&Changes::default(), OutputFormat::Text).unwrap();
        assert_eq!(text, "No differences found.\n");
    }

    #[test]
    fn test_diff_text() {
        let mut target = sample();
        target.tables[0].columns[1] = Column::new("email", "VARCHAR(320)").nullable(false);
        target.tables.push(Table::new("orders"));

        let text = render_changes(&diff(&sample(), &target), OutputFormat::Text).unwrap();
        assert_eq!(
            text,
            "Added Tables:\n  + orders (0 columns)\n\n\
             Modified Table: users\n\
             ----------------------------------------\n  \
             ~ Column email: type TEXT -> VARCHAR(320)\n  \
             ~ Column email: NULL -> NOT NULL\n\n"
        );
    }

    #[test]
    fn test_diff_text_index_and_view_sections() {
        let source = crate::schema::parser::parse_sql(
            "CREATE INDEX idx_old ON users (email); CREATE VIEW v AS SELECT 1;",
        );
        let target = crate::schema::parser::parse_sql(
            "CREATE INDEX idx_new ON users (email); CREATE VIEW v AS SELECT 2;",
        );

        let text = render_changes(&diff(&source, &target), OutputFormat::Text).unwrap();
        assert_eq!(
            text,
            "Added Indexes:\n  + idx_new ON users\n\n\
             Removed Indexes:\n  - idx_old\n\n\
             Modified Views:\n  ~ v\n\n"
        );
    }

    #[test]
    fn test_rendering_is_stable() {
        for format in [OutputFormat::Text, OutputFormat::Json, OutputFormat::Yaml] {
            let first = render_schema(&sample(), format, Dialect::MySql).unwrap();
            let second = render_schema(&sample(), format, Dialect::MySql).unwrap();
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_sql_output_is_schema_only() {
        let sql = render_schema(&sample(), OutputFormat::Sql, Dialect::MySql).unwrap();
        assert!(sql.starts_with("CREATE TABLE `users`"));
        assert!(render_changes(&Changes::default(), OutputFormat::Sql).is_err());
    }

    #[test]
    fn test_json_round_trips_schema() {
        let json = render_schema(&sample(), OutputFormat::Json, Dialect::Postgres).unwrap();
        let back: Schema = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sample());
    }
}
