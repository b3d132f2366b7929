//! DDL generator
//!
//! Renders a [`Schema`] back into CREATE TABLE / INDEX / VIEW statements for
//! one dialect. The output is accepted by the parser in this crate, so parsing
//! generated DDL gives back the schema, except for:
//!
//! - table-scoped indexes, which come back as standalone indexes (MySQL keeps
//!   non-unique ones inside the table as `KEY` members)
//! - column comments outside MySQL
//! - the materialized flag outside PostgreSQL
//! - index methods on SQL Server

use crate::dialect::types::has_identity_marker;
use crate::dialect::Dialect;
use crate::schema::types::{Column, Constraint, ConstraintKind, ForeignKey, Index, Schema, Table, View};

/// SQL DDL generator for one dialect
#[derive(Debug, Clone, Copy)]
pub struct SqlGenerator {
    dialect: Dialect,
}

impl SqlGenerator {
    /// Create a new generator
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    /// Render the whole schema: tables, then indexes, then views
    pub fn generate(&self, schema: &Schema) -> String {
        let mut statements = Vec::new();

        for table in &schema.tables {
            statements.push(self.create_table(table));
            for index in &table.indexes {
                if !self.index_inside_table(index) {
                    statements.push(self.create_index(index));
                }
            }
        }
        for index in &schema.indexes {
            statements.push(self.create_index(index));
        }
        for view in &schema.views {
            statements.push(self.create_view(view));
        }

        tracing::debug!(
            dialect = %self.dialect,
            statements = statements.len(),
            "Generated DDL"
        );

        statements
            .into_iter()
            .map(|statement| format!("{};\n", statement))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Quote an identifier for the target dialect
    pub fn quote(&self, name: &str) -> String {
        match self.dialect {
            Dialect::Postgres => format!("\"{}\"", name),
            Dialect::MySql => format!("`{}`", name),
            Dialect::SqlServer => format!("[{}]", name),
        }
    }

    fn qualified(&self, schema: Option<&str>, name: &str) -> String {
        match schema {
            Some(ns) if !ns.is_empty() => format!("{}.{}", self.quote(ns), self.quote(name)),
            _ => self.quote(name),
        }
    }

    /// Quote plain column names; expressions such as `lower(email)` pass through
    fn column_ref(&self, column: &str) -> String {
        if !column.is_empty() && column.chars().all(|c| c.is_alphanumeric() || c == '_') {
            self.quote(column)
        } else {
            column.to_string()
        }
    }

    fn column_list(&self, columns: &[String]) -> String {
        columns
            .iter()
            .map(|c| self.column_ref(c))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// MySQL keeps plain table-scoped indexes as `KEY` members
    fn index_inside_table(&self, index: &Index) -> bool {
        self.dialect == Dialect::MySql && !index.is_unique
    }

    /// CREATE TABLE statement
    pub fn create_table(&self, table: &Table) -> String {
        let mut members: Vec<String> = table
            .columns
            .iter()
            .map(|column| self.column_definition(column))
            .collect();

        if let Some(pk) = &table.primary_key {
            members.push(format!(
                "{}PRIMARY KEY ({})",
                self.constraint_prefix(pk.name.as_deref()),
                self.column_list(&pk.columns)
            ));
        }

        members.extend(table.foreign_keys.iter().map(|fk| self.foreign_key(fk)));
        members.extend(table.constraints.iter().map(|c| self.constraint(c)));

        for index in table.indexes.iter().filter(|i| self.index_inside_table(i)) {
            let mut key = format!("KEY {} ({})", self.quote(&index.name), self.column_list(&index.columns));
            if let Some(method) = &index.method {
                key.push_str(&format!(" USING {}", method));
            }
            members.push(key);
        }

        format!(
            "CREATE TABLE {} (\n    {}\n)",
            self.qualified(table.schema.as_deref(), &table.name),
            members.join(",\n    ")
        )
    }

    fn column_definition(&self, column: &Column) -> String {
        let mut sql = format!("{} {}", self.quote(&column.name), column.data_type);

        if let Some(default) = &column.default {
            sql.push_str(&format!(" DEFAULT {}", default));
        }
        if !column.nullable {
            sql.push_str(" NOT NULL");
        }
        if column.is_unique {
            sql.push_str(" UNIQUE");
        }
        if column.is_identity && !has_identity_marker(&column.data_type) {
            sql.push(' ');
            sql.push_str(match self.dialect {
                Dialect::Postgres => "GENERATED BY DEFAULT AS IDENTITY",
                Dialect::MySql => "AUTO_INCREMENT",
                Dialect::SqlServer => "IDENTITY(1,1)",
            });
        }
        if let (Dialect::MySql, Some(comment)) = (self.dialect, &column.comment) {
            sql.push_str(&format!(" COMMENT '{}'", comment.replace('\'', "''")));
        }

        sql
    }

    fn constraint_prefix(&self, name: Option<&str>) -> String {
        match name {
            Some(name) if !name.is_empty() => format!("CONSTRAINT {} ", self.quote(name)),
            _ => String::new(),
        }
    }

    fn foreign_key(&self, fk: &ForeignKey) -> String {
        let mut sql = format!(
            "{}FOREIGN KEY ({})",
            self.constraint_prefix(fk.name.as_deref()),
            self.column_list(&fk.columns)
        );

        if !fk.referenced_table.is_empty() {
            sql.push_str(&format!(
                " REFERENCES {}",
                self.qualified(fk.referenced_schema.as_deref(), &fk.referenced_table)
            ));
            if !fk.referenced_columns.is_empty() {
                sql.push_str(&format!(" ({})", self.column_list(&fk.referenced_columns)));
            }
        }
        if let Some(action) = &fk.on_delete {
            sql.push_str(&format!(" ON DELETE {}", action));
        }
        if let Some(action) = &fk.on_update {
            sql.push_str(&format!(" ON UPDATE {}", action));
        }

        sql
    }

    fn constraint(&self, constraint: &Constraint) -> String {
        let prefix = self.constraint_prefix(constraint.name.as_deref());
        match constraint.kind {
            ConstraintKind::Unique => {
                format!("{}UNIQUE ({})", prefix, self.column_list(&constraint.columns))
            }
            ConstraintKind::Check => format!(
                "{}CHECK ({})",
                prefix,
                constraint.expression.as_deref().unwrap_or_default()
            ),
        }
    }

    /// CREATE INDEX statement
    pub fn create_index(&self, index: &Index) -> String {
        let unique = if index.is_unique { "UNIQUE " } else { "" };
        let method = index.method.as_deref().filter(|m| !m.is_empty());
        let target = self.qualified(index.schema.as_deref(), &index.table);
        let columns = self.column_list(&index.columns);

        match (self.dialect, method) {
            (Dialect::Postgres, Some(m)) => format!(
                "CREATE {}INDEX {} ON {} USING {} ({})",
                unique,
                self.quote(&index.name),
                target,
                m,
                columns
            ),
            (Dialect::MySql, Some(m)) => format!(
                "CREATE {}INDEX {} ON {} ({}) USING {}",
                unique,
                self.quote(&index.name),
                target,
                columns,
                m
            ),
            _ => format!(
                "CREATE {}INDEX {} ON {} ({})",
                unique,
                self.quote(&index.name),
                target,
                columns
            ),
        }
    }

    /// CREATE VIEW statement, definition carried verbatim
    pub fn create_view(&self, view: &View) -> String {
        let materialized = if view.is_materialized && self.dialect == Dialect::Postgres {
            "MATERIALIZED "
        } else {
            ""
        };
        format!(
            "CREATE {}VIEW {} AS {}",
            materialized,
            self.qualified(view.schema.as_deref(), &view.name),
            view.definition
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::PrimaryKey;
    use pretty_assertions::assert_eq;

    fn accounts() -> Table {
        let mut table = Table::new("accounts");
        table.columns.push(Column::new("id", "BIGINT").nullable(false).identity());
        table
            .columns
            .push(Column::new("email", "VARCHAR(255)").nullable(false).unique());
        table.columns.push(Column::new("balance", "NUMERIC(10,2)").default("0"));
        table.primary_key = Some(PrimaryKey {
            name: None,
            columns: vec!["id".to_string()],
        });
        table.constraints.push(Constraint::check("balance >= 0"));
        table
    }

    #[test]
    fn test_postgres_table() {
        let sql = SqlGenerator::new(Dialect::Postgres).create_table(&accounts());
        assert_eq!(
            sql,
            "CREATE TABLE \"accounts\" (\n    \
             \"id\" BIGINT NOT NULL GENERATED BY DEFAULT AS IDENTITY,\n    \
             \"email\" VARCHAR(255) NOT NULL UNIQUE,\n    \
             \"balance\" NUMERIC(10,2) DEFAULT 0,\n    \
             PRIMARY KEY (\"id\"),\n    \
             CHECK (balance >= 0)\n)"
        );
    }

    #[test]
    fn test_identity_suffix_per_dialect() {
        let column = Column::new("id", "INT").identity();
        let render = |d| SqlGenerator::new(d).column_definition(&column);
        assert_eq!(render(Dialect::MySql), "`id` INT AUTO_INCREMENT");
        assert_eq!(render(Dialect::SqlServer), "[id] INT IDENTITY(1,1)");

        // already carried by the type
        let serial = Column::new("id", "SERIAL").identity();
        assert_eq!(
            SqlGenerator::new(Dialect::Postgres).column_definition(&serial),
            "\"id\" SERIAL"
        );
    }

    #[test]
    fn test_mysql_comment_quotes_are_escaped() {
        let mut column = Column::new("note", "TEXT");
        column.comment = Some("owner's note".to_string());

        let sql = SqlGenerator::new(Dialect::MySql).column_definition(&column);
        assert_eq!(sql, "`note` TEXT COMMENT 'owner''s note'");

        let reparsed = crate::schema::parser::parse_sql(&format!("CREATE TABLE t ({})", sql));
        let note = reparsed.tables[0].column("note").unwrap();
        assert_eq!(note.comment.as_deref(), Some("owner's note"));
    }

    #[test]
    fn test_index_method_placement() {
        let index = Index {
            name: "idx_tags".to_string(),
            table: "posts".to_string(),
            columns: vec!["tags".to_string(), "lower(title)".to_string()],
            method: Some("gin".to_string()),
            ..Index::default()
        };

        assert_eq!(
            SqlGenerator::new(Dialect::Postgres).create_index(&index),
            "CREATE INDEX \"idx_tags\" ON \"posts\" USING gin (\"tags\", lower(title))"
        );
        assert_eq!(
            SqlGenerator::new(Dialect::MySql).create_index(&index),
            "CREATE INDEX `idx_tags` ON `posts` (`tags`, lower(title)) USING gin"
        );
        assert_eq!(
            SqlGenerator::new(Dialect::SqlServer).create_index(&index),
            "CREATE INDEX [idx_tags] ON [posts] ([tags], lower(title))"
        );
    }

    #[test]
    fn test_foreign_key_clause() {
        let fk = ForeignKey {
            name: Some("fk_owner".to_string()),
            columns: vec!["owner_id".to_string()],
            referenced_table: "users".to_string(),
            referenced_schema: Some("auth".to_string()),
            referenced_columns: vec!["id".to_string()],
            on_delete: Some("SET NULL".to_string()),
            on_update: None,
        };
        assert_eq!(
            SqlGenerator::new(Dialect::SqlServer).foreign_key(&fk),
            "CONSTRAINT [fk_owner] FOREIGN KEY ([owner_id]) REFERENCES [auth].[users] ([id]) ON DELETE SET NULL"
        );
    }

    #[test]
    fn test_views() {
        let view = View {
            name: "totals".to_string(),
            schema: None,
            definition: "SELECT 1".to_string(),
            is_materialized: true,
        };
        assert_eq!(
            SqlGenerator::new(Dialect::Postgres).create_view(&view),
            "CREATE MATERIALIZED VIEW \"totals\" AS SELECT 1"
        );
        assert_eq!(
            SqlGenerator::new(Dialect::MySql).create_view(&view),
            "CREATE VIEW `totals` AS SELECT 1"
        );
    }

    #[test]
    fn test_statements_are_terminated() {
        let schema = Schema {
            tables: vec![Table::new("a"), Table::new("b")],
            ..Schema::default()
        };
        let sql = SqlGenerator::new(Dialect::MySql).generate(&schema);
        assert_eq!(sql.matches(";\n").count(), 2);
    }
}
