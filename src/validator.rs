use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use crate::builder::{GuardKind, SqlOutcome, DATE_HINTS, DESCRIPTIVE_HINTS};
use crate::language::LanguageProfile;
use crate::schema::{Schema, Table};

static STAR_PROJECTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^SELECT\s+(DISTINCT\s+)?\*\s+FROM\b").expect("star projection pattern")
});
static SOURCE_TABLES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:FROM|JOIN)\s+(\w+)").expect("source table pattern"));

/// Last checks on a generated statement. Guards pass through untouched.
pub fn validate(outcome: SqlOutcome, schema: &Schema, profile: &LanguageProfile) -> SqlOutcome {
    let SqlOutcome::Sql(sql) = outcome else {
        return outcome;
    };

    let code = mask_literals(&sql);
    let upper = code.to_uppercase();
    if upper.starts_with("SELECT") && !upper.contains(" FROM ") {
        debug!("Rejecting SELECT without FROM: {}", sql);
        return SqlOutcome::guard(GuardKind::MissingFrom, profile);
    }

    if upper.contains(" JOIN ") {
        if let Some(expanded) = expand_star(&sql, &code, schema) {
            return SqlOutcome::Sql(expanded);
        }
    }

    SqlOutcome::Sql(sql)
}

/// Useful columns of a table for a joined projection: key, labels and dates.
fn table_projection(table: &Table) -> Vec<String> {
    let key = table.primary_key();
    let mut columns: Vec<String> = key
        .iter()
        .map(|c| format!("{}.{}", table.name, c.name))
        .collect();

    for column in &table.columns {
        if key.is_some_and(|k| k.name == column.name) {
            continue;
        }
        let name = column.name.to_lowercase();
        let labelled = DESCRIPTIVE_HINTS.iter().any(|hint| name.contains(hint));
        let dated = DATE_HINTS[..2].iter().any(|hint| name.contains(hint));
        if labelled || dated {
            columns.push(format!("{}.{}", table.name, column.name));
        }
    }

    if columns.is_empty() {
        columns.push(format!("{}.*", table.name));
    }
    columns
}

/// Blanks out the contents of single-quoted literals, keeping the quotes.
fn mask_literals(sql: &str) -> String {
    let mut masked = String::with_capacity(sql.len());
    let mut quoted = false;
    for c in sql.chars() {
        if c == '\'' {
            // '' inside a literal closes and reopens, which leaves it quoted
            quoted = !quoted;
            masked.push(c);
        } else if quoted {
            masked.push(' ');
        } else {
            masked.push(c);
        }
    }
    masked
}

/// `code` is `sql` with its literals masked; tables are read from it only.
fn expand_star(sql: &str, code: &str, schema: &Schema) -> Option<String> {
    let caps = STAR_PROJECTION.captures(sql)?;
    let whole = caps.get(0)?;

    let mut seen: Vec<String> = Vec::new();
    let mut projection: Vec<String> = Vec::new();
    for source in SOURCE_TABLES.captures_iter(code) {
        let name = source[1].to_string();
        if seen.iter().any(|s| s.eq_ignore_ascii_case(&name)) {
            continue;
        }
        match schema.table(&name) {
            Some(table) => projection.extend(table_projection(table)),
            None => projection.push(format!("{}.*", name)),
        }
        seen.push(name);
    }

    let distinct = if caps.get(1).is_some() { "DISTINCT " } else { "" };
    Some(format!(
        "SELECT {}{} FROM{}",
        distinct,
        projection.join(", "),
        &sql[whole.end()..]
    ))
}
