// SQL assembly: one builder per operation family over a shared `Analysis` of the prompt.
mod clauses;
mod group;
mod join;
mod select;
mod write;

use serde::Serialize;
use tracing::debug;

use crate::classifier::{Classification, Operation};
use crate::conditions::Condition;
use crate::language::profile::GuardMessages;
use crate::language::{LanguageProfile, Pagination};
use crate::resolver::{ColumnCandidate, TableCandidate};
use crate::schema::{Column, Dialect, Schema, Table};
use crate::util::text::contains_word;

pub use clauses::{JoinClause, SelectStatement};

// Column-name hints shared by both languages
pub(crate) const DESCRIPTIVE_HINTS: [&str; 7] =
    ["name", "title", "description", "label", "nome", "titulo", "descricao"];
pub(crate) const CATEGORICAL_HINTS: [&str; 16] = [
    "category", "type", "status", "region", "country", "department", "state", "city", "gender",
    "level", "class", "categoria", "tipo", "regiao", "pais", "cidade",
];
pub(crate) const DATE_HINTS: [&str; 5] = ["created", "date", "updated", "time", "data"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardKind {
    NoTable,
    NoWriteTable(String),
    NoInsertColumns(String),
    UnsafeUpdate(String),
    UnsafeDelete(String),
    MissingFrom,
}

impl GuardKind {
    pub fn message(&self, messages: &GuardMessages) -> String {
        match self {
            GuardKind::NoTable => messages.no_table.to_string(),
            GuardKind::NoWriteTable(statement) => {
                messages.no_write_table.replace("{statement}", statement)
            }
            GuardKind::NoInsertColumns(table) => messages.no_insert_columns.replace("{table}", table),
            GuardKind::UnsafeUpdate(table) => messages.unsafe_update.replace("{table}", table),
            GuardKind::UnsafeDelete(table) => messages.unsafe_delete.replace("{table}", table),
            GuardKind::MissingFrom => messages.missing_from.to_string(),
        }
    }
}

/// What the pipeline produced for one prompt. A guard is never executable SQL.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SqlOutcome {
    Sql(String),
    Guarded { kind: GuardKind, message: String },
}

impl SqlOutcome {
    pub fn guard(kind: GuardKind, profile: &LanguageProfile) -> Self {
        let message = kind.message(&profile.messages);
        SqlOutcome::Guarded { kind, message }
    }

    pub fn sql(&self) -> Option<&str> {
        match self {
            SqlOutcome::Sql(sql) => Some(sql),
            SqlOutcome::Guarded { .. } => None,
        }
    }

    pub fn is_sql(&self) -> bool {
        matches!(self, SqlOutcome::Sql(_))
    }

    /// The statement, or the guard message as an SQL comment line.
    pub fn to_text(&self) -> String {
        match self {
            SqlOutcome::Sql(sql) => sql.clone(),
            SqlOutcome::Guarded { message, .. } => format!("-- {}", message),
        }
    }
}

/// Everything the earlier stages learned about a prompt.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub raw: String,
    pub normalized: String,
    pub tables: Vec<TableCandidate>,
    pub columns: Vec<ColumnCandidate>,
    pub conditions: Vec<Condition>,
    pub pagination: Option<Pagination>,
}

pub struct QueryBuilder<'a> {
    schema: &'a Schema,
    dialect: &'a Dialect,
    profile: &'a LanguageProfile,
}

impl<'a> QueryBuilder<'a> {
    pub fn new(schema: &'a Schema, dialect: &'a Dialect, profile: &'a LanguageProfile) -> Self {
        Self {
            schema,
            dialect,
            profile,
        }
    }

    pub fn build(&self, analysis: &Analysis, classification: &Classification) -> SqlOutcome {
        debug!(
            "Building {} query (secondary: {:?})",
            classification.operation, classification.secondary
        );

        match classification.operation {
            Operation::Insert => self.build_insert(analysis),
            Operation::Update => self.build_update(analysis),
            Operation::Delete => self.build_delete(analysis),
            Operation::Count if classification.has(Operation::Group) => self
                .build_group(analysis, classification)
                .unwrap_or_else(|| self.build_count(analysis, classification)),
            Operation::Count => self.build_count(analysis, classification),
            _ if classification.has(Operation::Group) => self
                .build_group(analysis, classification)
                .unwrap_or_else(|| self.build_select(analysis, classification)),
            _ => self.build_select(analysis, classification),
        }
    }

    fn guard(&self, kind: GuardKind) -> SqlOutcome {
        SqlOutcome::guard(kind, self.profile)
    }

    fn main_table(&self, analysis: &Analysis) -> Option<&'a Table> {
        analysis.tables.first().and_then(|t| self.schema.table(&t.name))
    }

    fn mentions(&self, analysis: &Analysis, terms: &[&str]) -> bool {
        let lower = analysis.normalized.to_lowercase();
        terms.iter().any(|term| contains_word(&lower, term))
    }

    /// Aggregate function named in the prompt, unless the word is itself a column of `table`.
    fn aggregation(&self, analysis: &Analysis, table: &Table) -> Option<&'static str> {
        let lower = analysis.normalized.to_lowercase();
        self.profile
            .aggregations
            .iter()
            .find(|(word, _)| contains_word(&lower, word) && !table.has_column(word))
            .map(|(_, function)| *function)
    }

    /// Numeric column an aggregate applies to: one the prompt tied to an aggregate,
    /// then a resolved numeric column, then the first non-key numeric column.
    fn aggregate_target(
        &self,
        analysis: &Analysis,
        table: &'a Table,
        exclude: Option<&str>,
    ) -> Option<&'a Column> {
        let usable = |column: &&Column| {
            column.kind().is_numeric()
                && !column.is_primary_key()
                && exclude.is_none_or(|e| !column.name.eq_ignore_ascii_case(e))
        };
        let resolved = |with_function: bool| {
            analysis
                .columns
                .iter()
                .filter(|c| c.table_name.eq_ignore_ascii_case(&table.name))
                .filter(|c| !with_function || c.aggregate_function.is_some())
                .filter_map(|c| table.column(&c.name))
                .find(|column| usable(column))
        };

        resolved(true)
            .or_else(|| resolved(false))
            .or_else(|| table.columns.iter().find(|column| usable(column)))
    }
}

pub(crate) fn qualify(table: &str, column: &str) -> String {
    format!("{}.{}", table, column)
}

pub(crate) fn name_matches(column: &Column, hints: &[&str]) -> bool {
    let name = column.name.to_lowercase();
    hints.iter().any(|hint| name.contains(hint))
}

/// Primary key plus descriptive columns of a table, qualified.
pub(crate) fn default_columns(table: &Table) -> Vec<String> {
    let key = table.primary_key();
    let mut columns: Vec<String> = key.iter().map(|c| qualify(&table.name, &c.name)).collect();
    columns.extend(
        table
            .columns
            .iter()
            .filter(|c| key.is_none_or(|k| k.name != c.name))
            .filter(|c| name_matches(c, &DESCRIPTIVE_HINTS))
            .map(|c| qualify(&table.name, &c.name)),
    );
    columns
}
