use super::*;
use crate::classifier::Operation;
use crate::conditions::is_temporal_column;
use crate::language::normalizer::{vocabulary_limit, DEFAULT_LIMIT, MAX_LIMIT};

#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    pub kind: &'static str,
    pub table: String,
    pub on: String,
}

/// A SELECT assembled clause by clause and rendered in SQL order.
#[derive(Debug, Clone, Default)]
pub struct SelectStatement {
    pub distinct: bool,
    pub projection: Vec<String>,
    pub from: String,
    pub joins: Vec<JoinClause>,
    pub filters: Option<String>,
    pub group_by: Vec<String>,
    pub having: Option<String>,
    pub order_by: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl SelectStatement {
    pub fn new(from: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            ..Default::default()
        }
    }

    pub fn with_filters(mut self, conditions: &[Condition]) -> Self {
        if !conditions.is_empty() {
            self.filters = Some(crate::conditions::render_all(conditions));
        }
        self
    }

    pub fn set_order(&mut self, order: String) {
        if self.order_by.is_none() {
            self.order_by = Some(order);
        }
    }

    pub fn set_limit(&mut self, limit: u32, offset: Option<u32>) {
        if self.limit.is_none() {
            self.limit = Some(limit.clamp(1, MAX_LIMIT));
            self.offset = offset;
        }
    }

    pub fn render(&self, dialect: &Dialect) -> String {
        let mut sql = String::from("SELECT ");
        if self.distinct {
            sql.push_str("DISTINCT ");
        }
        if self.projection.is_empty() {
            sql.push('*');
        } else {
            sql.push_str(&self.projection.join(", "));
        }
        sql.push_str(" FROM ");
        sql.push_str(&self.from);

        for join in &self.joins {
            sql.push_str(&format!(" {} {} ON {}", join.kind, join.table, join.on));
        }
        if let Some(filters) = &self.filters {
            sql.push_str(" WHERE ");
            sql.push_str(filters);
        }
        if !self.group_by.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&self.group_by.join(", "));
        }
        if let Some(having) = &self.having {
            sql.push_str(" HAVING ");
            sql.push_str(having);
        }
        if let Some(order) = &self.order_by {
            sql.push_str(" ORDER BY ");
            sql.push_str(order);
        }
        if let Some(limit) = self.limit {
            sql.push_str(&dialect.pagination(limit, self.offset));
        }
        sql
    }
}

impl QueryBuilder<'_> {
    fn direction(&self, analysis: &Analysis, explicit: Option<&str>) -> &'static str {
        match explicit.map(str::to_lowercase).as_deref() {
            Some("desc") => "DESC",
            Some("asc") => "ASC",
            _ if self.mentions(analysis, self.profile.descending_terms) => "DESC",
            _ => "ASC",
        }
    }

    /// ORDER BY from an explicit `order by x`, else the most natural column of the main table.
    pub(super) fn apply_order(
        &self,
        statement: &mut SelectStatement,
        analysis: &Analysis,
        classification: &Classification,
        participants: &[&Table],
    ) {
        let explicit = self.profile.order_by.captures(&analysis.normalized);
        if classification.score(Operation::Order) <= 0.0 && explicit.is_none() {
            return;
        }

        if let Some(caps) = &explicit {
            let owner = participants
                .iter()
                .find_map(|table| table.column(&caps[1]).map(|column| (table, column)));
            if let Some((table, column)) = owner {
                let direction = self.direction(analysis, caps.get(2).map(|m| m.as_str()));
                statement.set_order(format!("{} {}", qualify(&table.name, &column.name), direction));
                return;
            }
        }

        let Some(main) = participants.first() else {
            return;
        };
        let column = main
            .columns
            .iter()
            .find(|c| is_temporal_column(c))
            .or_else(|| main.primary_key())
            .or_else(|| main.columns.iter().find(|c| name_matches(c, &["name", "title", "nome", "titulo"])));
        if let Some(column) = column {
            let direction = self.direction(analysis, None);
            statement.set_order(format!("{} {}", qualify(&main.name, &column.name), direction));
        }
    }

    /// Explicit pagination always applies; otherwise a limit intent picks a size from wording.
    pub(super) fn apply_limit(
        &self,
        statement: &mut SelectStatement,
        analysis: &Analysis,
        classification: &Classification,
        main: &Table,
    ) {
        let (limit, offset) = match analysis.pagination {
            Some(pagination) => (
                pagination
                    .limit
                    .or_else(|| vocabulary_limit(&analysis.normalized, self.profile))
                    .unwrap_or(DEFAULT_LIMIT),
                pagination.offset,
            ),
            None if classification.has(Operation::Limit) => (
                vocabulary_limit(&analysis.normalized, self.profile).unwrap_or(DEFAULT_LIMIT),
                None,
            ),
            None => return,
        };

        if self.dialect.requires_order_for_pagination() {
            let order = pagination_order(statement, main);
            statement.set_order(order);
        }
        statement.set_limit(limit, offset);
    }
}

/// ORDER BY for OFFSET/FETCH dialects. Grouped and DISTINCT statements may only
/// order by what they project.
fn pagination_order(statement: &SelectStatement, main: &Table) -> String {
    if let Some(first) = statement.group_by.first() {
        return first.clone();
    }
    if statement.distinct {
        return match statement.projection.first() {
            Some(first) => strip_alias(first).to_string(),
            None => "(SELECT NULL)".to_string(),
        };
    }
    match main.primary_key() {
        Some(key) => qualify(&main.name, &key.name),
        None => "(SELECT NULL)".to_string(),
    }
}

fn strip_alias(expression: &str) -> &str {
    expression
        .rsplit_once(" AS ")
        .map_or(expression, |(expression, _)| expression)
}
