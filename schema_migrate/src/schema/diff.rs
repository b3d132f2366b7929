//! Schema difference calculator
//!
//! Compares a source and a target schema and reports what was added, removed
//! or modified. Objects are matched by exact name; added objects keep the
//! target's order, removed and modified ones keep the source's.

use indexmap::IndexMap;
use serde::Serialize;

use crate::schema::splitter::normalize_sql;
use crate::schema::types::{Column, ForeignKey, Index, PrimaryKey, Schema, Table, View};

/// Structural differences between two schemas
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Changes {
    pub added_tables: Vec<Table>,
    pub removed_tables: Vec<Table>,
    pub modified_tables: Vec<TableChanges>,
    pub added_indexes: Vec<Index>,
    pub removed_indexes: Vec<Index>,
    pub added_views: Vec<View>,
    pub removed_views: Vec<View>,
    pub modified_views: Vec<ViewChanges>,
}

impl Changes {
    /// True when the two schemas are structurally equal
    pub fn is_empty(&self) -> bool {
        self.added_tables.is_empty()
            && self.removed_tables.is_empty()
            && self.modified_tables.is_empty()
            && self.added_indexes.is_empty()
            && self.removed_indexes.is_empty()
            && self.added_views.is_empty()
            && self.removed_views.is_empty()
            && self.modified_views.is_empty()
    }
}

/// Changes within a table present on both sides
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableChanges {
    pub name: String,
    pub added_columns: Vec<Column>,
    pub removed_columns: Vec<Column>,
    pub modified_columns: Vec<ColumnChanges>,
    pub added_indexes: Vec<Index>,
    pub removed_indexes: Vec<Index>,
    pub added_foreign_keys: Vec<ForeignKey>,
    pub removed_foreign_keys: Vec<ForeignKey>,
    pub primary_key_changed: bool,
}

impl TableChanges {
    pub fn is_empty(&self) -> bool {
        self.added_columns.is_empty()
            && self.removed_columns.is_empty()
            && self.modified_columns.is_empty()
            && self.added_indexes.is_empty()
            && self.removed_indexes.is_empty()
            && self.added_foreign_keys.is_empty()
            && self.removed_foreign_keys.is_empty()
            && !self.primary_key_changed
    }
}

/// Changes to a single column.
///
/// `old_type`/`new_type` are only set when the type changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnChanges {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_type: Option<String>,
    pub nullable_changed: bool,
    pub old_nullable: bool,
    pub new_nullable: bool,
    pub default_changed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_default: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_default: Option<String>,
}

impl ColumnChanges {
    pub fn type_changed(&self) -> bool {
        self.old_type.is_some() || self.new_type.is_some()
    }
}

/// A view whose definition changed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewChanges {
    pub name: String,
    pub old_definition: String,
    pub new_definition: String,
}

/// Compares a source schema against a target schema
#[derive(Debug, Clone, Copy)]
pub struct Differ<'a> {
    source: &'a Schema,
    target: &'a Schema,
}

impl<'a> Differ<'a> {
    pub fn new(source: &'a Schema, target: &'a Schema) -> Self {
        Self { source, target }
    }

    /// Compute the differences. Never fails.
    pub fn compare(&self) -> Changes {
        let source_tables = by_name(&self.source.tables, |t| t.name.clone());
        let target_tables = by_name(&self.target.tables, |t| t.name.clone());

        let mut changes = Changes {
            added_tables: added(&source_tables, &target_tables),
            removed_tables: added(&target_tables, &source_tables),
            ..Changes::default()
        };

        for (name, source_table) in &source_tables {
            if let Some(target_table) = target_tables.get(name) {
                let table_changes = compare_tables(source_table, target_table);
                if !table_changes.is_empty() {
                    changes.modified_tables.push(table_changes);
                }
            }
        }

        let source_indexes = by_name(&self.source.indexes, |i| i.name.clone());
        let target_indexes = by_name(&self.target.indexes, |i| i.name.clone());
        changes.added_indexes = added(&source_indexes, &target_indexes);
        changes.removed_indexes = added(&target_indexes, &source_indexes);

        let source_views = by_name(&self.source.views, |v| v.name.clone());
        let target_views = by_name(&self.target.views, |v| v.name.clone());
        changes.added_views = added(&source_views, &target_views);
        changes.removed_views = added(&target_views, &source_views);
        for (name, source_view) in &source_views {
            if let Some(target_view) = target_views.get(name) {
                if canonical_definition(&source_view.definition)
                    != canonical_definition(&target_view.definition)
                {
                    changes.modified_views.push(ViewChanges {
                        name: name.clone(),
                        old_definition: source_view.definition.clone(),
                        new_definition: target_view.definition.clone(),
                    });
                }
            }
        }

        tracing::debug!(
            added_tables = changes.added_tables.len(),
            removed_tables = changes.removed_tables.len(),
            modified_tables = changes.modified_tables.len(),
            modified_views = changes.modified_views.len(),
            "Compared schemas"
        );

        changes
    }
}

/// Diff two schemas
pub fn diff(source: &Schema, target: &Schema) -> Changes {
    Differ::new(source, target).compare()
}

/// Index items by key, keeping first-seen order
fn by_name<T>(items: &[T], key: impl Fn(&T) -> String) -> IndexMap<String, &T> {
    let mut map = IndexMap::with_capacity(items.len());
    for item in items {
        map.entry(key(item)).or_insert(item);
    }
    map
}

/// Items of `to` whose key is absent from `from`, in `to`'s order
fn added<T: Clone>(from: &IndexMap<String, &T>, to: &IndexMap<String, &T>) -> Vec<T> {
    to.iter()
        .filter(|(name, _)| !from.contains_key(*name))
        .map(|(_, item)| (*item).clone())
        .collect()
}

fn compare_tables(source: &Table, target: &Table) -> TableChanges {
    let source_columns = by_name(&source.columns, |c| c.name.clone());
    let target_columns = by_name(&target.columns, |c| c.name.clone());

    let modified_columns = source_columns
        .iter()
        .filter_map(|(name, old)| {
            target_columns
                .get(name)
                .and_then(|new| compare_columns(old, new))
        })
        .collect();

    let source_indexes = by_name(&source.indexes, |i| i.name.clone());
    let target_indexes = by_name(&target.indexes, |i| i.name.clone());

    let source_fks = by_name(&source.foreign_keys, ForeignKey::identity);
    let target_fks = by_name(&target.foreign_keys, ForeignKey::identity);

    TableChanges {
        name: source.name.clone(),
        added_columns: added(&source_columns, &target_columns),
        removed_columns: added(&target_columns, &source_columns),
        modified_columns,
        added_indexes: added(&source_indexes, &target_indexes),
        removed_indexes: added(&target_indexes, &source_indexes),
        added_foreign_keys: added(&source_fks, &target_fks),
        removed_foreign_keys: added(&target_fks, &source_fks),
        primary_key_changed: primary_key_changed(
            source.primary_key.as_ref(),
            target.primary_key.as_ref(),
        ),
    }
}

fn compare_columns(old: &Column, new: &Column) -> Option<ColumnChanges> {
    let mut changes = ColumnChanges {
        name: old.name.clone(),
        old_nullable: old.nullable,
        new_nullable: new.nullable,
        ..ColumnChanges::default()
    };

    if !old.data_type.eq_ignore_ascii_case(&new.data_type) {
        changes.old_type = Some(old.data_type.clone());
        changes.new_type = Some(new.data_type.clone());
    }

    changes.nullable_changed = old.nullable != new.nullable;

    changes.default_changed = match (&old.default, &new.default) {
        (None, None) => false,
        (Some(a), Some(b)) => !a.eq_ignore_ascii_case(b),
        _ => true,
    };
    if changes.default_changed {
        changes.old_default = old.default.clone();
        changes.new_default = new.default.clone();
    }

    (changes.type_changed() || changes.nullable_changed || changes.default_changed)
        .then_some(changes)
}

fn primary_key_changed(old: Option<&PrimaryKey>, new: Option<&PrimaryKey>) -> bool {
    match (old, new) {
        (None, None) => false,
        (Some(a), Some(b)) => a.columns != b.columns,
        _ => true,
    }
}

/// Comment-free, whitespace-collapsed, trimmed, upper-cased view body
fn canonical_definition(definition: &str) -> String {
    normalize_sql(definition)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}
