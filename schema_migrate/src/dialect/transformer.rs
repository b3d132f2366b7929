//! Schema transformation between dialects
//!
//! Produces a new [`Schema`] plus advisory warnings. Input order of tables,
//! columns, indexes and views is preserved so the output is deterministic.

use serde::Serialize;
use std::fmt;

use super::mapper::{data_loss_note, identity_type, map_default, map_index_method, project_type};
use super::types::normalize_type;
use super::Dialect;
use crate::schema::types::{Column, Index, Schema, Table, View};

/// Advisory produced alongside a transformed schema. Never blocks the transform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransformWarning {
    /// A column type with no faithful equivalent in the target dialect
    DataLoss {
        table: String,
        column: String,
        message: String,
    },
    /// A view body carried over verbatim from another dialect
    ViewReview { view: String, dialect: Dialect },
}

impl fmt::Display for TransformWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformWarning::DataLoss {
                table,
                column,
                message,
            } => write!(f, "{}.{}: {}", table, column, message),
            TransformWarning::ViewReview { view, dialect } => write!(
                f,
                "View '{}' may contain {}-specific SQL that requires manual review",
                view, dialect
            ),
        }
    }
}

/// Result of a dialect transformation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformation {
    pub schema: Schema,
    pub warnings: Vec<TransformWarning>,
}

/// Converts schemas from one dialect to another
#[derive(Debug, Clone, Copy)]
pub struct Transformer {
    from: Dialect,
    to: Dialect,
}

impl Transformer {
    /// Create a new transformer
    pub fn new(from: Dialect, to: Dialect) -> Self {
        Self { from, to }
    }

    /// Transform a schema, collecting warnings about lossy conversions.
    ///
    /// Transforming into the source dialect returns the schema unchanged.
    pub fn transform(&self, schema: &Schema) -> Transformation {
        if self.from == self.to {
            return Transformation {
                schema: schema.clone(),
                warnings: Vec::new(),
            };
        }

        tracing::debug!(
            from = %self.from,
            to = %self.to,
            tables = schema.tables.len(),
            "Transforming schema"
        );

        let mut warnings = Vec::new();

        let tables = schema
            .tables
            .iter()
            .map(|table| self.transform_table(table, &mut warnings))
            .collect();

        let indexes = schema
            .indexes
            .iter()
            .map(|index| self.transform_index(index))
            .collect();

        let views = schema
            .views
            .iter()
            .map(|view| self.transform_view(view, &mut warnings))
            .collect();

        Transformation {
            schema: Schema {
                tables,
                indexes,
                views,
            },
            warnings,
        }
    }

    fn transform_table(&self, table: &Table, warnings: &mut Vec<TransformWarning>) -> Table {
        Table {
            name: table.name.clone(),
            schema: table.schema.clone(),
            columns: table
                .columns
                .iter()
                .map(|column| self.transform_column(column, &table.name, warnings))
                .collect(),
            primary_key: table.primary_key.clone(),
            foreign_keys: table.foreign_keys.clone(),
            indexes: table
                .indexes
                .iter()
                .map(|index| self.transform_index(index))
                .collect(),
            constraints: table.constraints.clone(),
        }
    }

    fn transform_column(
        &self,
        column: &Column,
        table_name: &str,
        warnings: &mut Vec<TransformWarning>,
    ) -> Column {
        let data_type = if column.is_identity {
            identity_type(&column.data_type, self.to)
        } else {
            let canonical = normalize_type(&column.data_type);
            if let Some(note) = data_loss_note(&column.data_type, &canonical, self.to) {
                warnings.push(TransformWarning::DataLoss {
                    table: table_name.to_string(),
                    column: column.name.clone(),
                    message: note.to_string(),
                });
            }
            project_type(&canonical, self.to)
        };

        Column {
            data_type,
            default: column
                .default
                .as_deref()
                .map(|value| map_default(value, self.to)),
            ..column.clone()
        }
    }

    fn transform_index(&self, index: &Index) -> Index {
        Index {
            method: map_index_method(index.method.as_deref(), self.to),
            ..index.clone()
        }
    }

    fn transform_view(&self, view: &View, warnings: &mut Vec<TransformWarning>) -> View {
        warnings.push(TransformWarning::ViewReview {
            view: view.name.clone(),
            dialect: self.from,
        });
        view.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::{ForeignKey, PrimaryKey};
    use pretty_assertions::assert_eq;

    fn sample_schema() -> Schema {
        let mut users = Table::new("users");
        users.columns.push(Column::new("id", "SERIAL").nullable(false).identity());
        users.columns.push(Column::new("active", "BOOLEAN").default("TRUE"));
        users.columns.push(Column::new("created_at", "TIMESTAMPTZ").default("now()"));
        users.columns.push(Column::new("token", "UUID").default("gen_random_uuid()"));
        users.primary_key = Some(PrimaryKey {
            name: None,
            columns: vec!["id".to_string()],
        });
        users.indexes.push(Index {
            name: "users_tags_idx".to_string(),
            table: "users".to_string(),
            columns: vec!["tags".to_string()],
            method: Some("gin".to_string()),
            ..Index::default()
        });

        let mut posts = Table::new("posts");
        posts.columns.push(Column::new("user_id", "INTEGER"));
        posts.foreign_keys.push(ForeignKey {
            columns: vec!["user_id".to_string()],
            referenced_table: "users".to_string(),
            referenced_columns: vec!["id".to_string()],
            on_delete: Some("CASCADE".to_string()),
            ..ForeignKey::default()
        });

        Schema {
            tables: vec![users, posts],
            indexes: Vec::new(),
            views: vec![View {
                name: "active_users".to_string(),
                schema: None,
                definition: "SELECT * FROM users WHERE active".to_string(),
                is_materialized: false,
            }],
        }
    }

    #[test]
    fn test_postgres_to_mysql() {
        let result = Transformer::new(Dialect::Postgres, Dialect::MySql).transform(&sample_schema());
        let users = result.schema.table("users").unwrap();

        assert_eq!(users.column("id").unwrap().data_type, "INT AUTO_INCREMENT");
        assert_eq!(users.column("active").unwrap().data_type, "TINYINT(1)");
        assert_eq!(users.column("active").unwrap().default.as_deref(), Some("1"));
        assert_eq!(users.column("created_at").unwrap().data_type, "TIMESTAMP");
        assert_eq!(
            users.column("created_at").unwrap().default.as_deref(),
            Some("CURRENT_TIMESTAMP")
        );
        assert_eq!(users.column("token").unwrap().data_type, "CHAR(36)");
        assert_eq!(users.column("token").unwrap().default.as_deref(), Some("UUID()"));
        assert_eq!(users.indexes[0].method.as_deref(), Some("BTREE"));

        // keys are dialect-agnostic
        let posts = result.schema.table("posts").unwrap();
        assert_eq!(posts.foreign_keys, sample_schema().tables[1].foreign_keys);
        assert_eq!(users.primary_key, sample_schema().tables[0].primary_key);
    }

    #[test]
    fn test_warnings_are_ordered_and_readable() {
        let result = Transformer::new(Dialect::Postgres, Dialect::MySql).transform(&sample_schema());
        let messages: Vec<String> = result.warnings.iter().map(ToString::to_string).collect();

        assert_eq!(messages.len(), 3);
        assert!(messages[0].starts_with("users.created_at: Timezone information will be lost"));
        assert!(messages[1].starts_with("users.token: UUID stored as CHAR(36)"));
        assert_eq!(
            messages[2],
            "View 'active_users' may contain postgres-specific SQL that requires manual review"
        );
    }

    #[test]
    fn test_view_definition_is_verbatim() {
        let result =
            Transformer::new(Dialect::Postgres, Dialect::SqlServer).transform(&sample_schema());
        assert_eq!(result.schema.views, sample_schema().views);
    }

    #[test]
    fn test_same_dialect_is_identity() {
        for dialect in Dialect::ALL {
            let result = Transformer::new(dialect, dialect).transform(&sample_schema());
            assert_eq!(result.schema, sample_schema());
            assert!(result.warnings.is_empty());
        }
    }

    #[test]
    fn test_input_is_not_mutated() {
        let schema = sample_schema();
        let _ = Transformer::new(Dialect::Postgres, Dialect::SqlServer).transform(&schema);
        assert_eq!(schema, sample_schema());
    }
}
