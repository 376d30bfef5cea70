use regex::{Captures, Regex};
use serde::Serialize;
use std::fmt;
use std::ops::Range;
use std::sync::LazyLock;

use crate::language::profile::VALUE;
use crate::language::LanguageProfile;
use crate::resolver::{ColumnCandidate, TableCandidate};
use crate::schema::{Column, Schema, Table};
use crate::util::text::{format_in_list, format_like_value, format_value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Operator {
    Eq,
    NotEq,
    Gt,
    Ge,
    Lt,
    Le,
    Like,
    Between,
    In,
    IsNull,
    IsNotNull,
}

impl Operator {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol.trim().to_uppercase().as_str() {
            "=" => Operator::Eq,
            "!=" | "<>" => Operator::NotEq,
            ">" => Operator::Gt,
            ">=" => Operator::Ge,
            "<" => Operator::Lt,
            "<=" => Operator::Le,
            "LIKE" => Operator::Like,
            "BETWEEN" => Operator::Between,
            "IN" => Operator::In,
            _ => return None,
        })
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::NotEq => "!=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Like => "LIKE",
            Operator::Between => "BETWEEN",
            Operator::In => "IN",
            Operator::IsNull => "IS NULL",
            Operator::IsNotNull => "IS NOT NULL",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Conjunction {
    And,
    Or,
}

impl Conjunction {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Conjunction::And => "AND",
            Conjunction::Or => "OR",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Condition {
    pub column_name: String,
    pub table_name: Option<String>,
    pub operator: Operator,
    /// Already formatted for SQL: quoted literal, bare number, `(a, b)` list or `a AND b` range.
    pub value: String,
    pub conjunction: Conjunction,
    pub is_complex: bool,
    pub complex_expr: Option<String>,
    /// Date-part function wrapping the column, e.g. `MONTH`.
    pub function: Option<String>,
    pub position: usize,
}

impl Condition {
    pub fn qualified_column(&self) -> String {
        match &self.table_name {
            Some(table) => format!("{}.{}", table, self.column_name),
            None => self.column_name.clone(),
        }
    }

    pub fn render(&self) -> String {
        if let Some(expr) = self.complex_expr.as_ref().filter(|_| self.is_complex) {
            return expr.clone();
        }
        let column = match &self.function {
            Some(function) => format!("{}({})", function, self.qualified_column()),
            None => self.qualified_column(),
        };
        match self.operator {
            Operator::IsNull | Operator::IsNotNull => format!("{} {}", column, self.operator),
            Operator::In => format!("{} IN {}", column, self.value),
            _ => format!("{} {} {}", column, self.operator, self.value),
        }
    }

    pub fn is_equality(&self) -> bool {
        self.operator == Operator::Eq && self.function.is_none() && !self.is_complex
    }
}

/// Joins rendered conditions with their conjunctions, without the WHERE keyword.
pub fn render_all(conditions: &[Condition]) -> String {
    let mut sql = String::new();
    for (index, condition) in conditions.iter().enumerate() {
        if index > 0 {
            sql.push(' ');
            sql.push_str(condition.conjunction.as_sql());
            sql.push(' ');
        }
        sql.push_str(&condition.render());
    }
    sql
}

const DATE_VALUE: &str = r"(?:DATE_(?:SUB|ADD)\((?:CURRENT_DATE\(\)|DATE_TRUNC\('\w+', CURRENT_DATE\(\)\)), INTERVAL \d+ \w+\)|DATE_TRUNC\('\w+', CURRENT_DATE\(\)\)|CURRENT_DATE\(\))";

static COMPLEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:where|whose|onde|cujo|cuja)\s+(.+?)\s+(and|or|e|ou)\s+\((.+?)\)")
        .expect("complex pattern")
});
static DATE_EXPRESSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?:\b(\w+)\s+)?(>=|=|BETWEEN)\s+({DATE_VALUE}(?:\s+AND\s+{DATE_VALUE})?)"
    ))
    .expect("date expression pattern")
});
static DATE_PART: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\b(\w+)\s+)?ON_(MONTH|WEEKDAY|QUARTER|SEMESTER)\((\d+)\)")
        .expect("date part pattern")
});
static BETWEEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\b(\w+)\s+BETWEEN\s+{VALUE}\s+AND\s+{VALUE}")).expect("between pattern")
});
static IN_LIST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\w+)\s+IN\s*\(([^)]*)\)").expect("in pattern"));
static NOT_NULL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\w+)\s+IS NOT NULL\b").expect("not null pattern"));
static NULL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\w+)\s+IS NULL\b").expect("null pattern"));
static LIKE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\w+)\s+LIKE\s+('(?:[^']|'')*'|\S+)").expect("like pattern")
});
static COMPARISON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\b(\w+)\s*(>=|<=|!=|<>|=|>|<)\s*{VALUE}")).expect("comparison pattern")
});

const DESCRIPTIVE_COLUMNS: [&str; 5] = ["name", "nome", "title", "titulo", "label"];
const TEMPORAL_COLUMNS: [&str; 5] = ["date", "data", "created", "updated", "time"];

pub fn is_temporal_column(column: &Column) -> bool {
    let name = column.name.to_lowercase();
    column.kind().is_temporal() || TEMPORAL_COLUMNS.iter().any(|hint| name.contains(hint))
}

pub struct ConditionExtractor<'a> {
    schema: &'a Schema,
    profile: &'a LanguageProfile,
    tables: &'a [TableCandidate],
    columns: &'a [ColumnCandidate],
}

struct Found {
    column: String,
    table: String,
}

impl<'a> ConditionExtractor<'a> {
    pub fn new(
        schema: &'a Schema,
        profile: &'a LanguageProfile,
        tables: &'a [TableCandidate],
        columns: &'a [ColumnCandidate],
    ) -> Self {
        Self {
            schema,
            profile,
            tables,
            columns,
        }
    }

    fn main_table(&self) -> Option<&'a Table> {
        self.tables.first().and_then(|t| self.schema.table(&t.name))
    }

    /// Resolved columns first, then the resolved tables, then anywhere in the schema.
    fn resolve(&self, word: &str) -> Option<Found> {
        if let Some(candidate) = self.columns.iter().find(|c| c.name.eq_ignore_ascii_case(word)) {
            return Some(Found {
                column: candidate.name.clone(),
                table: candidate.table_name.clone(),
            });
        }

        let resolved = self
            .tables
            .iter()
            .filter_map(|t| self.schema.table(&t.name))
            .find_map(|table| table.column(word).map(|column| (table, column)));
        if let Some((table, column)) = resolved {
            return Some(Found {
                column: column.name.clone(),
                table: table.name.clone(),
            });
        }

        self.schema
            .tables
            .iter()
            .find_map(|table| table.column(word).map(|column| (table, column)))
            .map(|(table, column)| Found {
                column: column.name.clone(),
                table: table.name.clone(),
            })
    }

    fn temporal(&self, word: Option<&str>) -> Option<Found> {
        if let Some(found) = word.and_then(|w| self.resolve(w)) {
            let column = self
                .schema
                .table(&found.table)
                .and_then(|t| t.column(&found.column));
            if column.is_some_and(is_temporal_column) {
                return Some(found);
            }
        }
        let table = self.main_table()?;
        let column = table
            .columns
            .iter()
            .find(|c| c.kind().is_temporal())
            .or_else(|| table.columns.iter().find(|c| is_temporal_column(c)))?;
        Some(Found {
            column: column.name.clone(),
            table: table.name.clone(),
        })
    }

    fn descriptive(&self) -> Option<Found> {
        let table = self.main_table()?;
        let column = table.columns.iter().find(|c| {
            let name = c.name.to_lowercase();
            DESCRIPTIVE_COLUMNS.iter().any(|hint| name.contains(hint))
        })?;
        Some(Found {
            column: column.name.clone(),
            table: table.name.clone(),
        })
    }

    pub fn extract(&self, normalized: &str, raw: &str) -> Vec<Condition> {
        let plain = self.profile.inclusive_comparison.replace_all(raw, " ");
        let conjunction = if self.profile.disjunction.is_match(&plain) {
            Conjunction::Or
        } else {
            Conjunction::And
        };

        let mut taken: Vec<Range<usize>> = Vec::new();
        let mut conditions = Vec::new();

        let mut accept = |range: Range<usize>, condition: Option<Condition>| {
            if taken.iter().any(|t| t.start < range.end && range.start < t.end) {
                return;
            }
            if let Some(condition) = condition {
                taken.push(range);
                conditions.push(condition);
            }
        };

        let condition = |found: Found, operator: Operator, value: String, position: usize| Condition {
            column_name: found.column,
            table_name: Some(found.table),
            operator,
            value,
            conjunction,
            is_complex: false,
            complex_expr: None,
            function: None,
            position,
        };

        for caps in COMPLEX.captures_iter(normalized) {
            let Some(whole) = caps.get(0) else { continue };
            let joiner = if matches!(caps[2].to_lowercase().as_str(), "or" | "ou") {
                "OR"
            } else {
                "AND"
            };
            accept(
                whole.range(),
                Some(Condition {
                    column_name: String::new(),
                    table_name: None,
                    operator: Operator::Eq,
                    value: String::new(),
                    conjunction,
                    is_complex: true,
                    complex_expr: Some(format!("{} {} ({})", caps[1].trim(), joiner, caps[3].trim())),
                    function: None,
                    position: whole.start(),
                }),
            );
        }

        for caps in DATE_EXPRESSION.captures_iter(normalized) {
            let Some(whole) = caps.get(0) else { continue };
            let operator = Operator::from_symbol(&caps[2]).unwrap_or(Operator::Eq);
            let found = self.temporal(caps.get(1).map(|m| m.as_str()));
            accept(
                whole.range(),
                found.map(|f| condition(f, operator, caps[3].to_string(), whole.start())),
            );
        }

        for caps in DATE_PART.captures_iter(normalized) {
            let Some(whole) = caps.get(0) else { continue };
            let found = self.temporal(caps.get(1).map(|m| m.as_str()));
            let built = found.map(|f| date_part(f, &caps, whole.start(), conjunction));
            accept(whole.range(), built);
        }

        let simple: [(&Regex, fn(&Captures) -> (Operator, String)); 6] = [
            (&*BETWEEN, |caps: &Captures| {
                (
                    Operator::Between,
                    format!("{} AND {}", format_value(&caps[2]), format_value(&caps[3])),
                )
            }),
            (&*IN_LIST, |caps: &Captures| (Operator::In, format_in_list(&caps[2]))),
            (&*NOT_NULL, |_: &Captures| (Operator::IsNotNull, String::new())),
            (&*NULL, |_: &Captures| (Operator::IsNull, String::new())),
            (&*LIKE, |caps: &Captures| {
                (Operator::Like, format_like_value(&caps[2].replace("''", "'")))
            }),
            (&*COMPARISON, |caps: &Captures| {
                (
                    Operator::from_symbol(&caps[2]).unwrap_or(Operator::Eq),
                    format_value(&caps[3]),
                )
            }),
        ];

        for (pattern, parse) in simple {
            for caps in pattern.captures_iter(normalized) {
                let Some(whole) = caps.get(0) else { continue };
                let found = self.resolve(&caps[1]);
                let built = found.map(|f| {
                    let (operator, value) = parse(&caps);
                    condition(f, operator, value, whole.start())
                });
                accept(whole.range(), built);
            }
        }

        for caps in self.profile.equality.captures_iter(normalized) {
            let Some(whole) = caps.get(0) else { continue };
            let found = self.resolve(&caps[1]);
            accept(
                whole.range(),
                found.map(|f| condition(f, Operator::Eq, format_value(&caps[2]), whole.start())),
            );
        }

        for caps in self.profile.named.captures_iter(normalized) {
            let Some(whole) = caps.get(0) else { continue };
            let found = self.descriptive();
            accept(
                whole.range(),
                found.map(|f| condition(f, Operator::Eq, format_value(&caps[1]), whole.start())),
            );
        }

        conditions.sort_by_key(|c| c.position);
        conditions
    }
}

fn date_part(found: Found, caps: &Captures, position: usize, conjunction: Conjunction) -> Condition {
    let number = &caps[3];
    let (function, operator, value) = match &caps[2] {
        "MONTH" => ("MONTH", Operator::Eq, number.to_string()),
        "WEEKDAY" => ("DAYOFWEEK", Operator::Eq, number.to_string()),
        "QUARTER" => ("QUARTER", Operator::Eq, number.to_string()),
        _ if number == "1" => ("MONTH", Operator::Between, "1 AND 6".to_string()),
        _ => ("MONTH", Operator::Between, "7 AND 12".to_string()),
    };
    Condition {
        column_name: found.column,
        table_name: Some(found.table),
        operator,
        value,
        conjunction,
        is_complex: false,
        complex_expr: None,
        function: Some(function.to_string()),
        position,
    }
}

/// Convenience wrapper around [`ConditionExtractor`].
pub fn extract(
    normalized: &str,
    raw: &str,
    tables: &[TableCandidate],
    columns: &[ColumnCandidate],
    schema: &Schema,
    profile: &LanguageProfile,
) -> Vec<Condition> {
    ConditionExtractor::new(schema, profile, tables, columns).extract(normalized, raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::{normalize, Language};

    fn schema() -> Schema {
        Schema::new(vec![
            Table::new(
                "family",
                vec![
                    Column::new("rfam_id", "varchar").primary(),
                    Column::new("rfam_acc", "varchar"),
                ],
            ),
            Table::new(
                "orders",
                vec![
                    Column::new("id", "int").primary(),
                    Column::new("status", "varchar"),
                    Column::new("total", "decimal"),
                    Column::new("created_at", "timestamp"),
                    Column::new("customer_name", "varchar"),
                ],
            ),
        ])
    }

    fn table(name: &str) -> Vec<TableCandidate> {
        vec![TableCandidate {
            name: name.to_string(),
            confidence: 0.95,
        }]
    }

    fn run(prompt: &str, main: &str) -> Vec<Condition> {
        let schema = schema();
        let language = crate::language::detect(prompt);
        let profile = language.profile();
        let normalized = normalize(prompt, profile);
        extract(&normalized, prompt, &table(main), &[], &schema, profile)
    }

    fn rendered(prompt: &str, main: &str) -> Vec<String> {
        run(prompt, main).iter().map(Condition::render).collect()
    }

    #[test]
    fn portuguese_comparisons() {
        assert_eq!(
            rendered("selecione a coluna rfam_id da tabela family onde a coluna rfam_acc é igual a 3", "family"),
            vec!["family.rfam_acc = 3"]
        );
        assert_eq!(
            rendered("selecione a coluna rfam_id da tabela family onde a coluna rfam_acc for menor ou igual a 100", "family"),
            vec!["family.rfam_acc <= 100"]
        );
    }

    #[test]
    fn values_are_formatted_by_kind() {
        assert_eq!(
            rendered("show orders where status is shipped and total above 10", "orders"),
            vec!["orders.status = 'shipped'", "orders.total > 10"]
        );
        assert_eq!(
            rendered("show orders where status is in (open, 'on hold')", "orders"),
            vec!["orders.status IN ('open', 'on hold')"]
        );
        assert_eq!(
            rendered(r#"orders whose customer_name contains "O'Brien""#, "orders"),
            vec!["orders.customer_name LIKE '%O''Brien%'"]
        );
    }

    #[test]
    fn ranges_and_nulls() {
        assert_eq!(
            rendered("orders where total between 10 and 20", "orders"),
            vec!["orders.total BETWEEN 10 AND 20"]
        );
        assert_eq!(
            rendered("orders where status is null", "orders"),
            vec!["orders.status IS NULL"]
        );
    }

    #[test]
    fn relative_dates_bind_to_temporal_columns() {
        assert_eq!(
            rendered("orders placed in the last 30 days", "orders"),
            vec!["orders.created_at >= DATE_SUB(CURRENT_DATE(), INTERVAL 30 DAY)"]
        );
        assert_eq!(
            rendered("orders in the second semester", "orders"),
            vec!["MONTH(orders.created_at) BETWEEN 7 AND 12"]
        );
        assert_eq!(
            rendered("orders on mondays", "orders"),
            vec!["DAYOFWEEK(orders.created_at) = 2"]
        );
    }

    #[test]
    fn upcoming_periods() {
        assert_eq!(
            rendered("orders due next month", "orders"),
            vec![
                "orders.created_at BETWEEN DATE_ADD(DATE_TRUNC('month', CURRENT_DATE()), INTERVAL 1 MONTH) AND DATE_ADD(DATE_TRUNC('month', CURRENT_DATE()), INTERVAL 2 MONTH)"
            ]
        );
        assert_eq!(
            rendered("orders in the next 7 days", "orders"),
            vec!["orders.created_at BETWEEN CURRENT_DATE() AND DATE_ADD(CURRENT_DATE(), INTERVAL 7 DAY)"]
        );
        assert_eq!(
            rendered("mostre os pedidos de amanhã", "orders"),
            vec!["orders.created_at = DATE_ADD(CURRENT_DATE(), INTERVAL 1 DAY)"]
        );
    }

    #[test]
    fn disjunction_switches_conjunction() {
        let conditions = run("orders where status = open or total > 100", "orders");
        assert_eq!(conditions.len(), 2);
        assert!(conditions.iter().all(|c| c.conjunction == Conjunction::Or));
        assert_eq!(
            render_all(&conditions),
            "orders.status = 'open' OR orders.total > 100"
        );
    }

    #[test]
    fn inclusive_comparisons_keep_and() {
        let conditions = run(
            "delete orders where total greater than or equal to 10 and status is open",
            "orders",
        );
        assert_eq!(
            render_all(&conditions),
            "orders.total >= 10 AND orders.status = 'open'"
        );

        let conditions = run(
            "selecione rfam_id da tabela family onde rfam_acc for maior ou igual a 5 e rfam_id é igual a 7",
            "family",
        );
        assert_eq!(conditions.len(), 2);
        assert!(conditions.iter().all(|c| c.conjunction == Conjunction::And));
        assert_eq!(
            render_all(&conditions),
            "family.rfam_acc >= 5 AND family.rfam_id = 7"
        );
    }

    #[test]
    fn named_values_bind_to_descriptive_columns() {
        assert_eq!(
            rendered("show orders named Acme", "orders"),
            vec!["orders.customer_name = 'Acme'"]
        );
    }

    #[test]
    fn unknown_columns_are_ignored() {
        assert!(run("delete the user with no condition specified", "orders").is_empty());
        assert!(rendered("orders where colour = red", "orders").is_empty());
    }
}
