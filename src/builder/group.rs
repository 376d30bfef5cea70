use super::*;
use crate::conditions::is_temporal_column;

/// The expression rows are grouped on, with the projection that exposes it.
struct Grouping {
    expression: String,
    projection: String,
    column: String,
}

impl<'a> QueryBuilder<'a> {
    fn granularity_grouping(&self, word: &str, table: &Table) -> Option<Grouping> {
        let unit = self
            .profile
            .granularities
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(word))
            .map(|(_, unit)| *unit)?;
        let column = table
            .columns
            .iter()
            .find(|c| c.kind().is_temporal())
            .or_else(|| table.columns.iter().find(|c| is_temporal_column(c)))?;

        let expression = format!("EXTRACT({} FROM {})", unit, qualify(&table.name, &column.name));
        Some(Grouping {
            projection: format!("{} AS {}", expression, unit.to_lowercase()),
            expression,
            column: column.name.clone(),
        })
    }

    fn column_grouping(table: &Table, column: &Column) -> Grouping {
        let expression = qualify(&table.name, &column.name);
        Grouping {
            projection: expression.clone(),
            expression,
            column: column.name.clone(),
        }
    }

    /// Explicit `group by x`, then a mentioned date granularity, then a categorical
    /// text column, then a non-key `_id` column.
    fn grouping(&self, analysis: &Analysis, participants: &[&'a Table]) -> Option<Grouping> {
        let main = *participants.first()?;

        if let Some(caps) = self.profile.group_by.captures(&analysis.normalized) {
            let word = &caps[1];
            if let Some(grouping) = self.granularity_grouping(word, main) {
                return Some(grouping);
            }
            let owner = participants
                .iter()
                .find_map(|table| table.column(word).map(|column| (table, column)));
            if let Some((table, column)) = owner {
                return Some(Self::column_grouping(table, column));
            }
        }

        let lower = analysis.normalized.to_lowercase();
        let mentioned_granularity = self
            .profile
            .granularities
            .iter()
            .find(|(name, _)| contains_word(&lower, name));
        if let Some(grouping) =
            mentioned_granularity.and_then(|(name, _)| self.granularity_grouping(name, main))
        {
            return Some(grouping);
        }

        let categorical = main
            .columns
            .iter()
            .filter(|c| c.kind().is_textual() || c.kind() == crate::schema::ColumnKind::Other)
            .find(|c| name_matches(c, &CATEGORICAL_HINTS));
        if let Some(column) = categorical {
            return Some(Self::column_grouping(main, column));
        }

        main.columns
            .iter()
            .find(|c| !c.is_primary_key() && c.name.to_lowercase().ends_with("_id"))
            .map(|column| Self::column_grouping(main, column))
    }

    /// Explicit numeric threshold that is not already a WHERE condition.
    fn having(&self, analysis: &Analysis, aggregate: &str) -> Option<String> {
        let caps = self.profile.having.captures(&analysis.normalized)?;
        let whole = caps.get(0)?;
        let overlaps_condition = analysis
            .conditions
            .iter()
            .any(|c| (whole.start()..whole.end()).contains(&c.position));
        if overlaps_condition {
            return None;
        }
        let operator = caps.get(1).map_or(">", |m| m.as_str());
        Some(format!("{} {} {}", aggregate, operator, &caps[2]))
    }

    /// GROUP BY statement, or `None` when nothing sensible can be grouped on.
    pub(super) fn build_group(
        &self,
        analysis: &Analysis,
        classification: &Classification,
    ) -> Option<SqlOutcome> {
        let main = self.main_table(analysis)?;
        let (mut statement, participants) = self.base_statement(analysis, classification, main);
        let grouping = self.grouping(analysis, &participants)?;

        let aggregate = match self.aggregation(analysis, main) {
            Some(function) if classification.operation != Operation::Count => self
                .aggregate_target(analysis, main, Some(&grouping.column))
                .map(|column| {
                    (
                        format!("{}({})", function, qualify(&main.name, &column.name)),
                        format!("{}_{}", function.to_lowercase(), column.name),
                    )
                }),
            _ => None,
        };
        let (expression, alias) =
            aggregate.unwrap_or_else(|| ("COUNT(*)".to_string(), "count".to_string()));

        statement.projection = vec![
            grouping.projection.clone(),
            format!("{} AS {}", expression, alias),
        ];
        statement.group_by.push(grouping.expression.clone());
        statement.having = self.having(analysis, &expression);

        if self.mentions(analysis, self.profile.descending_terms) {
            statement.set_order(format!("{} DESC", expression));
        }
        self.apply_limit(&mut statement, analysis, classification, main);

        Some(SqlOutcome::Sql(statement.render(self.dialect)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::classify;
    use crate::conditions::extract;
    use crate::config::EngineConfig;
    use crate::language::{extract_limit, normalize};
    use crate::resolver::EntityResolver;

    fn schema() -> Schema {
        Schema::new(vec![Table::new(
            "orders",
            vec![
                Column::new("id", "int").primary(),
                Column::new("customer_id", "int"),
                Column::new("status", "varchar"),
                Column::new("amount", "decimal"),
                Column::new("created_at", "timestamp"),
            ],
        )])
    }

    fn build(prompt: &str) -> String {
        let schema = schema();
        let dialect = Dialect::for_db_type(Some("mysql"));
        let profile = crate::language::detect(prompt).profile();
        let config = EngineConfig::default();

        let normalized = normalize(prompt, profile);
        let resolver = EntityResolver::new(&schema, profile, &config);
        let tables = resolver.resolve_tables(&normalized);
        let columns = resolver.resolve_columns(&normalized, &tables);
        let conditions = extract(&normalized, prompt, &tables, &columns, &schema, profile);
        let classification = classify(&normalized, prompt, profile, tables.len());
        let analysis = Analysis {
            raw: prompt.to_string(),
            pagination: extract_limit(&normalized, profile),
            normalized,
            tables,
            columns,
            conditions,
        };

        QueryBuilder::new(&schema, &dialect, profile)
            .build(&analysis, &classification)
            .to_text()
    }

    #[test]
    fn groups_by_explicit_column() {
        assert_eq!(
            build("count orders per status"),
            "SELECT orders.status, COUNT(*) AS count FROM orders GROUP BY orders.status"
        );
    }

    #[test]
    fn groups_by_date_granularity() {
        assert_eq!(
            build("show the total amount of orders by month"),
            "SELECT EXTRACT(MONTH FROM orders.created_at) AS month, SUM(orders.amount) AS sum_amount \
             FROM orders GROUP BY EXTRACT(MONTH FROM orders.created_at)"
        );
    }

    #[test]
    fn having_threshold_and_descending_order() {
        assert_eq!(
            build("group orders by status having count > 5 highest first"),
            "SELECT orders.status, COUNT(*) AS count FROM orders GROUP BY orders.status \
             HAVING COUNT(*) > 5 ORDER BY COUNT(*) DESC"
        );
    }
}
