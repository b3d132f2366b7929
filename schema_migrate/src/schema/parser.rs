//! SQL DDL parser
//!
//! Builds a [`Schema`] from CREATE TABLE, CREATE INDEX and CREATE VIEW
//! statements. Parsing is best-effort: each statement is classified on its own,
//! and anything that is not one of those kinds, or does not have the expected
//! shape, is skipped without failing the document.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::dialect::types::{has_identity_marker, is_identity_keyword, normalize_type, CanonicalType};
use crate::error::Result;
use crate::schema::splitter::{
    find_matching_paren, normalize_sql, split_definitions, split_statements, split_words,
    unquote_identifier, Word,
};
use crate::schema::types::{
    Column, Constraint, ForeignKey, Index, PrimaryKey, Schema, Table, View,
};

// An optionally quoted identifier, optionally prefixed by a namespace.
macro_rules! qualified_ident {
    () => {
        r#"(?:["`\[]?(\w+)["`\]]?\s*\.\s*)?["`\[]?(\w+)["`\]]?"#
    };
}

static TABLE_HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)^CREATE\s+(?:(?:GLOBAL|LOCAL)\s+)?(?:(?:TEMP|TEMPORARY)\s+)?TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?",
        qualified_ident!()
    ))
    .expect("valid table header regex")
});

static INDEX_HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)^CREATE\s+(UNIQUE\s+)?(?:(?:CLUSTERED|NONCLUSTERED)\s+)?INDEX\s+(?:CONCURRENTLY\s+)?(?:IF\s+NOT\s+EXISTS\s+)?",
        qualified_ident!(),
        r"\s+ON\s+(?:ONLY\s+)?",
        qualified_ident!(),
        r"\s*(?:USING\s+(\w+)\s*)?\("
    ))
    .expect("valid index header regex")
});

static VIEW_HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)^CREATE\s+(?:OR\s+REPLACE\s+)?(?:(?:TEMP|TEMPORARY)\s+)?(MATERIALIZED\s+)?VIEW\s+(?:IF\s+NOT\s+EXISTS\s+)?",
        qualified_ident!()
    ))
    .expect("valid view header regex")
});

static REFERENCES_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)\bREFERENCES\s+",
        qualified_ident!(),
        r"\s*(?:\(([^)]*)\))?"
    ))
    .expect("valid references regex")
});

static ON_DELETE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bON\s+DELETE\s+(CASCADE|SET\s+NULL|SET\s+DEFAULT|RESTRICT|NO\s+ACTION)")
        .expect("valid on delete regex")
});

static ON_UPDATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bON\s+UPDATE\s+(CASCADE|SET\s+NULL|SET\s+DEFAULT|RESTRICT|NO\s+ACTION)")
        .expect("valid on update regex")
});

static USING_TAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*USING\s+(\w+)").expect("valid using regex"));

static KEY_MEMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)^(?:KEY|INDEX)\s+["`\[]?(\w+)["`\]]?\s*\("#).expect("valid key member regex")
});

static SORT_SUFFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s+(?:ASC|DESC)(?:\s+NULLS\s+(?:FIRST|LAST))?$").expect("valid sort suffix regex")
});

/// Words that end a DEFAULT expression
const DEFAULT_TERMINATORS: &[&str] = &[
    "NULL",
    "PRIMARY",
    "UNIQUE",
    "CHECK",
    "REFERENCES",
    "CONSTRAINT",
    "COLLATE",
    "ON",
    "GENERATED",
    "COMMENT",
];

/// Why a statement contributed nothing to the schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Not a CREATE TABLE / INDEX / VIEW statement
    Unsupported,
    /// The object name could not be extracted
    MissingName,
    /// CREATE TABLE without a parenthesized body
    MissingBody,
    /// CREATE INDEX without any columns
    MissingColumns,
    /// CREATE VIEW without an AS clause
    MissingDefinition,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SkipReason::Unsupported => "unsupported statement kind",
            SkipReason::MissingName => "object name not found",
            SkipReason::MissingBody => "table body not found",
            SkipReason::MissingColumns => "index has no columns",
            SkipReason::MissingDefinition => "view has no AS clause",
        };
        f.write_str(text)
    }
}

/// Result of parsing one statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementOutcome {
    Table(Table),
    Index(Index),
    View(View),
    Skipped(SkipReason),
}

/// A statement that was skipped, for diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedStatement {
    /// Zero-based position among the document's statements
    pub index: usize,
    pub statement: String,
    pub reason: SkipReason,
}

/// Parsed schema together with the statements that were skipped
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseReport {
    pub schema: Schema,
    pub skipped: Vec<SkippedStatement>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatementKind {
    Table,
    Index,
    View,
}

impl StatementKind {
    /// Classify a statement by its leading keywords
    fn classify(statement: &str) -> Option<Self> {
        let mut words = statement.split_whitespace().map(str::to_ascii_uppercase);
        if words.next()?.as_str() != "CREATE" {
            return None;
        }

        for word in words.take(6) {
            match word.as_str() {
                "OR" | "REPLACE" | "GLOBAL" | "LOCAL" | "TEMP" | "TEMPORARY" | "UNIQUE"
                | "CLUSTERED" | "NONCLUSTERED" | "MATERIALIZED" => continue,
                "TABLE" => return Some(StatementKind::Table),
                "INDEX" => return Some(StatementKind::Index),
                "VIEW" => return Some(StatementKind::View),
                _ => return None,
            }
        }
        None
    }
}

/// DDL parser for CREATE TABLE / INDEX / VIEW statements
#[derive(Debug, Default, Clone, Copy)]
pub struct SchemaParser;

impl SchemaParser {
    /// Create a new parser
    pub fn new() -> Self {
        Self
    }

    /// Parse a DDL document into a schema. Never fails.
    pub fn parse(&self, sql: &str) -> Schema {
        self.parse_with_report(sql).schema
    }

    /// Parse a DDL document, also reporting which statements were skipped
    pub fn parse_with_report(&self, sql: &str) -> ParseReport {
        let normalized = normalize_sql(sql);
        let mut report = ParseReport::default();

        for (index, statement) in split_statements(&normalized).enumerate() {
            match self.parse_statement(statement) {
                StatementOutcome::Table(table) => {
                    upsert(&mut report.schema.tables, table, |t| t.name.clone())
                }
                StatementOutcome::Index(index) => {
                    upsert(&mut report.schema.indexes, index, |i| i.name.clone())
                }
                StatementOutcome::View(view) => {
                    upsert(&mut report.schema.views, view, |v| v.name.clone())
                }
                StatementOutcome::Skipped(reason) => {
                    tracing::debug!(statement = index, %reason, "Skipping statement");
                    report.skipped.push(SkippedStatement {
                        index,
                        statement: statement.to_string(),
                        reason,
                    });
                }
            }
        }

        tracing::debug!(
            tables = report.schema.tables.len(),
            indexes = report.schema.indexes.len(),
            views = report.schema.views.len(),
            skipped = report.skipped.len(),
            "Parsed DDL document"
        );

        report
    }

    /// Parse a single, already normalized statement
    pub fn parse_statement(&self, statement: &str) -> StatementOutcome {
        let result = match StatementKind::classify(statement) {
            Some(StatementKind::Table) => parse_create_table(statement).map(StatementOutcome::Table),
            Some(StatementKind::Index) => parse_create_index(statement).map(StatementOutcome::Index),
            Some(StatementKind::View) => parse_create_view(statement).map(StatementOutcome::View),
            None => Err(SkipReason::Unsupported),
        };
        result.unwrap_or_else(StatementOutcome::Skipped)
    }
}

/// Later definitions of the same name replace earlier ones in place
fn upsert<T>(items: &mut Vec<T>, item: T, key: impl Fn(&T) -> String) {
    let name = key(&item);
    match items.iter_mut().find(|existing| key(existing) == name) {
        Some(existing) => *existing = item,
        None => items.push(item),
    }
}

/// Parse a SQL DDL string into a schema
pub fn parse_sql(sql: &str) -> Schema {
    SchemaParser::new().parse(sql)
}

/// Read and parse a SQL schema file
pub fn parse_file(path: impl AsRef<Path>) -> Result<Schema> {
    let content = fs::read_to_string(path.as_ref())?;
    Ok(parse_sql(&content))
}

fn non_empty(capture: Option<regex::Match<'_>>) -> Option<String> {
    capture
        .map(|m| m.as_str().to_string())
        .filter(|s| !s.is_empty())
}

fn parse_create_table(statement: &str) -> std::result::Result<Table, SkipReason> {
    let caps = TABLE_HEADER_RE
        .captures(statement)
        .ok_or(SkipReason::MissingName)?;
    let header_end = caps.get(0).map_or(0, |m| m.end());

    let mut table = Table::new(&caps[2]);
    table.schema = non_empty(caps.get(1));

    let rest = &statement[header_end..];
    let open = header_end + (rest.len() - rest.trim_start().len());
    if !statement[open..].starts_with('(') {
        return Err(SkipReason::MissingBody);
    }
    let close = find_matching_paren(statement, open).ok_or(SkipReason::MissingBody)?;
    let body = &statement[open + 1..close];

    let mut table_primary_key: Option<PrimaryKey> = None;

    for member in split_definitions(body) {
        let words = split_words(member);
        let Some(first) = words.first() else {
            continue;
        };

        if first.is("CONSTRAINT") {
            let name = words.get(1).map(|w| unquote_identifier(w.text));
            if let Some(rest_word) = words.get(2) {
                apply_constraint(&mut table, &mut table_primary_key, &member[rest_word.start..], name);
            }
        } else if is_constraint_member(&words) {
            apply_constraint(&mut table, &mut table_primary_key, member, None);
        } else if let Some(index) = parse_key_member(member, &table) {
            tracing::trace!(table = %table.name, index = %index.name, "Table-scoped index");
            table.indexes.push(index);
        } else if let Some(column) = parse_column_def(member, &mut table) {
            tracing::trace!(table = %table.name, column = %column.name, "Column definition");
            table.columns.push(column);
        }
    }

    let primary_key = table_primary_key.or_else(|| {
        let columns: Vec<String> = table
            .columns
            .iter()
            .filter(|c| c.is_primary_key)
            .map(|c| c.name.clone())
            .collect();
        (!columns.is_empty()).then_some(PrimaryKey {
            name: None,
            columns,
        })
    });

    if let Some(pk) = &primary_key {
        for column in table.columns.iter_mut() {
            if pk.columns.contains(&column.name) {
                column.is_primary_key = true;
                column.nullable = false;
            }
        }
    }
    table.primary_key = primary_key;

    Ok(table)
}

/// True for members led by PRIMARY KEY, FOREIGN KEY, UNIQUE or CHECK
fn is_constraint_member(words: &[Word<'_>]) -> bool {
    let Some(first) = words.first() else {
        return false;
    };
    let second_is_key = words.get(1).is_some_and(|w| w.is("KEY"));

    (first.is("PRIMARY") && second_is_key)
        || (first.is("FOREIGN") && second_is_key)
        || first.is("UNIQUE")
        || first.is("CHECK")
        || first.text.to_ascii_uppercase().starts_with("CHECK(")
}

/// Attach a PRIMARY KEY / FOREIGN KEY / UNIQUE / CHECK member to the table
fn apply_constraint(
    table: &mut Table,
    primary_key: &mut Option<PrimaryKey>,
    member: &str,
    name: Option<String>,
) {
    let words = split_words(member);
    let Some(first) = words.first() else {
        return;
    };
    let upper = first.text.to_ascii_uppercase();

    match upper.as_str() {
        "PRIMARY" => {
            *primary_key = Some(PrimaryKey {
                name,
                columns: column_list(member),
            });
        }
        "FOREIGN" => {
            let mut fk = parse_foreign_key(member);
            fk.name = name;
            table.foreign_keys.push(fk);
        }
        "UNIQUE" => {
            let mut constraint = Constraint::unique(column_list(member));
            constraint.name = name.or_else(|| unique_constraint_name(&words));
            table.constraints.push(constraint);
        }
        s if s.starts_with("CHECK") => {
            let mut constraint = parse_check(member);
            constraint.name = name;
            table.constraints.push(constraint);
        }
        _ => {
            tracing::trace!(table = %table.name, member, "Ignoring unsupported constraint");
        }
    }
}

/// Name in `UNIQUE [KEY|INDEX] name (cols)`
fn unique_constraint_name(words: &[Word<'_>]) -> Option<String> {
    let candidate = words
        .iter()
        .skip(1)
        .find(|w| !w.is("KEY") && !w.is("INDEX"))?;
    if candidate.text.starts_with('(') {
        return None;
    }
    let name = candidate.text.split('(').next().unwrap_or_default();
    Some(unquote_identifier(name)).filter(|n| !n.is_empty())
}

fn parse_check(member: &str) -> Constraint {
    let expression = member.find('(').and_then(|open| {
        find_matching_paren(member, open).map(|close| member[open + 1..close].trim())
    });

    Constraint {
        expression: expression.map(str::to_string),
        ..Constraint::check("")
    }
}

/// Table-level `FOREIGN KEY (cols) REFERENCES ...` clause
fn parse_foreign_key(member: &str) -> ForeignKey {
    let mut fk = ForeignKey {
        columns: column_list(member),
        ..ForeignKey::default()
    };
    apply_references(&mut fk, member);
    fk
}

/// Fill referenced table/columns and actions from a REFERENCES clause.
///
/// A missing clause leaves the referenced fields empty.
fn apply_references(fk: &mut ForeignKey, text: &str) {
    if let Some(caps) = REFERENCES_RE.captures(text) {
        fk.referenced_schema = non_empty(caps.get(1));
        fk.referenced_table = caps[2].to_string();
        fk.referenced_columns = caps
            .get(3)
            .map(|m| split_definitions(m.as_str()).into_iter().map(unquote_identifier).collect())
            .unwrap_or_default();
    }
    fk.on_delete = referential_action(&ON_DELETE_RE, text);
    fk.on_update = referential_action(&ON_UPDATE_RE, text);
}

fn referential_action(re: &Regex, text: &str) -> Option<String> {
    re.captures(text).map(|caps| {
        caps[1]
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_ascii_uppercase()
    })
}

/// MySQL `KEY name (cols)` / `INDEX name (cols)` member.
///
/// A column that happens to be called `key` or `index` is told apart by its
/// second word being a recognised type.
fn parse_key_member(member: &str, table: &Table) -> Option<Index> {
    let caps = KEY_MEMBER_RE.captures(member)?;
    let name = caps[1].to_string();
    if !matches!(normalize_type(&name), CanonicalType::Other(_)) {
        return None;
    }

    let open = caps.get(0).map_or(0, |m| m.end() - 1);
    let columns = column_list(&member[open..]);
    if columns.is_empty() {
        return None;
    }
    let tail = find_matching_paren(member, open).map_or("", |close| &member[close + 1..]);

    Some(Index {
        name,
        table: table.name.clone(),
        schema: table.schema.clone(),
        columns,
        is_unique: false,
        is_primary: false,
        method: USING_TAIL_RE.captures(tail).map(|c| c[1].to_string()),
    })
}

/// Columns of the first parenthesized list in `text`, without quotes or
/// ASC/DESC suffixes
fn column_list(text: &str) -> Vec<String> {
    let Some(open) = text.find('(') else {
        return Vec::new();
    };
    let Some(close) = find_matching_paren(text, open) else {
        return Vec::new();
    };
    split_definitions(&text[open + 1..close])
        .into_iter()
        .map(clean_column_ref)
        .filter(|c| !c.is_empty())
        .collect()
}

fn clean_column_ref(raw: &str) -> String {
    let stripped = SORT_SUFFIX_RE.replace(raw.trim(), "");
    unquote_identifier(&stripped)
}

/// Upper-cased bare keywords of `text`, at any paren depth, skipping quoted
/// literals and quoted identifiers
fn keyword_tokens(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for ch in text.chars() {
        if let Some(close) = quote {
            if ch == close {
                quote = None;
            }
            continue;
        }
        if ch.is_ascii_alphanumeric() || ch == '_' {
            current.push(ch.to_ascii_uppercase());
            continue;
        }
        if !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
        quote = match ch {
            '\'' | '"' | '`' => Some(ch),
            '[' => Some(']'),
            _ => None,
        };
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// Column definition: `name type [modifiers...]`
///
/// Inline REFERENCES clauses are added to `table` as unnamed foreign keys.
fn parse_column_def(member: &str, table: &mut Table) -> Option<Column> {
    let words = split_words(member);
    if words.len() < 2 {
        return None;
    }

    let (data_type, modifiers_at) = read_type(&words);
    let mut column = Column::new(&unquote_identifier(words[0].text), &data_type);
    let modifiers = &words[modifiers_at..];
    let modifier_text = modifiers.first().map_or("", |w| &member[w.start..]);

    let keywords = keyword_tokens(modifier_text);
    for (i, keyword) in keywords.iter().enumerate() {
        let next = keywords.get(i + 1).map(String::as_str);
        match (keyword.as_str(), next) {
            ("NOT", Some("NULL")) => column.nullable = false,
            ("PRIMARY", Some("KEY")) => {
                column.is_primary_key = true;
                column.nullable = false;
            }
            ("UNIQUE", _) => column.is_unique = true,
            (k, _) if is_identity_keyword(k) => column.is_identity = true,
            _ => {}
        }
    }
    if has_identity_marker(&data_type) {
        column.is_identity = true;
    }

    for (i, word) in modifiers.iter().enumerate() {
        if word.is_quoted() {
            continue;
        }
        // GENERATED BY DEFAULT and ON DELETE/UPDATE SET DEFAULT are not defaults
        let keyword_phrase = i > 0 && (modifiers[i - 1].is("BY") || modifiers[i - 1].is("SET"));
        if word.is("DEFAULT") && !keyword_phrase && column.default.is_none() {
            column.default = read_default(member, &modifiers[i + 1..]);
        } else if word.is("COMMENT") {
            column.comment = modifiers
                .get(i + 1)
                .filter(|w| w.is_quoted())
                .map(|w| unquote_literal(w.text));
        } else if word.is("REFERENCES") {
            let mut fk = ForeignKey {
                columns: vec![column.name.clone()],
                ..ForeignKey::default()
            };
            apply_references(&mut fk, &member[word.start..]);
            table.foreign_keys.push(fk);
        }
    }

    Some(column)
}

/// String literal body with doubled `''` escapes undone
fn unquote_literal(text: &str) -> String {
    let inner = text.strip_prefix('\'').unwrap_or(text);
    let inner = inner.strip_suffix('\'').unwrap_or(inner);
    inner.replace("''", "'")
}

/// Type text starting at the second word, plus the index of the first
/// modifier word.
///
/// Attaches a separated `(n)` group and absorbs the multi-word spellings
/// `DOUBLE PRECISION`, `CHARACTER VARYING`, `... WITH[OUT] TIME ZONE` and a
/// trailing `UNSIGNED`.
fn read_type(words: &[Word<'_>]) -> (String, usize) {
    let mut data_type = words[1].text.to_string();
    let mut i = 2;

    while let Some(next) = words.get(i) {
        let upper = data_type.to_ascii_uppercase();
        let is_word = |offset: usize, keyword: &str| {
            words.get(i + offset).is_some_and(|w| w.is(keyword))
        };

        if next.text.starts_with('(') {
            data_type.push_str(next.text);
            i += 1;
        } else if (upper == "DOUBLE" && next.is("PRECISION"))
            || (upper == "CHARACTER" && next.text.to_ascii_uppercase().starts_with("VARYING"))
            || next.is("UNSIGNED")
        {
            data_type.push(' ');
            data_type.push_str(next.text);
            i += 1;
        } else if upper.starts_with("TIME")
            && (next.is("WITH") || next.is("WITHOUT"))
            && is_word(1, "TIME")
            && is_word(2, "ZONE")
        {
            for word in &words[i..i + 3] {
                data_type.push(' ');
                data_type.push_str(word.text);
            }
            i += 3;
        } else {
            break;
        }
    }

    (data_type, i)
}

/// Exact source text of a DEFAULT expression.
///
/// The first word is always taken; following words are taken until a
/// modifier keyword.
fn read_default(member: &str, words: &[Word<'_>]) -> Option<String> {
    let first = words.first()?;
    let mut last = first;

    for (i, word) in words.iter().enumerate().skip(1) {
        let upper = word.text.to_ascii_uppercase();
        let ends = DEFAULT_TERMINATORS.contains(&upper.as_str())
            || (upper == "NOT" && words.get(i + 1).is_some_and(|w| w.is("NULL")))
            || is_identity_keyword(&upper);
        if ends && !word.is_quoted() {
            break;
        }
        last = word;
    }

    Some(member[first.start..last.end].to_string())
}

fn parse_create_index(statement: &str) -> std::result::Result<Index, SkipReason> {
    let caps = INDEX_HEADER_RE
        .captures(statement)
        .ok_or(SkipReason::MissingName)?;
    let open = caps.get(0).map_or(0, |m| m.end() - 1);
    let close = find_matching_paren(statement, open).ok_or(SkipReason::MissingColumns)?;

    let columns: Vec<String> = split_definitions(&statement[open + 1..close])
        .into_iter()
        .map(clean_column_ref)
        .filter(|c| !c.is_empty())
        .collect();
    if columns.is_empty() {
        return Err(SkipReason::MissingColumns);
    }

    let method = caps
        .get(6)
        .map(|m| m.as_str().to_string())
        .or_else(|| {
            USING_TAIL_RE
                .captures(&statement[close + 1..])
                .map(|c| c[1].to_string())
        });

    Ok(Index {
        name: caps[3].to_string(),
        table: caps[5].to_string(),
        schema: non_empty(caps.get(4)),
        columns,
        is_unique: caps.get(1).is_some(),
        is_primary: false,
        method,
    })
}

fn parse_create_view(statement: &str) -> std::result::Result<View, SkipReason> {
    let caps = VIEW_HEADER_RE
        .captures(statement)
        .ok_or(SkipReason::MissingName)?;
    let header_end = caps.get(0).map_or(0, |m| m.end());
    let rest = &statement[header_end..];

    let as_word = split_words(rest)
        .into_iter()
        .find(|w| w.is("AS"))
        .ok_or(SkipReason::MissingDefinition)?;

    Ok(View {
        name: caps[3].to_string(),
        schema: non_empty(caps.get(2)),
        definition: rest[as_word.end..].trim().to_string(),
        is_materialized: caps.get(1).is_some(),
    })
}
