use super::*;
use crate::resolver::Markers;

impl<'a> QueryBuilder<'a> {
    /// FROM/JOIN/WHERE shared by every SELECT-shaped statement. Returns the tables in play.
    pub(super) fn base_statement(
        &self,
        analysis: &Analysis,
        classification: &Classification,
        main: &'a Table,
    ) -> (SelectStatement, Vec<&'a Table>) {
        let mut statement = SelectStatement::new(main.name.clone()).with_filters(&analysis.conditions);
        let mut participants = vec![main];

        if analysis.tables.len() > 1 || classification.has(Operation::Join) {
            for (table, clause) in self.plan_joins(analysis, main) {
                participants.push(table);
                statement.joins.push(clause);
            }
        }

        (statement, participants)
    }

    fn projection(&self, analysis: &Analysis, participants: &[&'a Table], joined: bool) -> Vec<String> {
        let Some(main) = participants.first() else {
            return Vec::new();
        };
        let owns = |candidate: &ColumnCandidate| {
            participants
                .iter()
                .any(|t| t.name.eq_ignore_ascii_case(&candidate.table_name))
        };

        // explicitly named columns, in the order they were named
        let markers = Markers::parse(&analysis.normalized);
        let explicit: Vec<String> = markers
            .columns
            .iter()
            .filter_map(|marker| {
                analysis
                    .columns
                    .iter()
                    .find(|c| c.explicit && c.name.eq_ignore_ascii_case(marker))
            })
            .map(|c| qualify(&c.table_name, &c.name))
            .collect();
        if !explicit.is_empty() {
            return explicit;
        }

        if let Some(function) = self.aggregation(analysis, main) {
            if let Some(column) = self.aggregate_target(analysis, main, None) {
                return vec![format!(
                    "{}({}) AS {}_{}",
                    function,
                    qualify(&main.name, &column.name),
                    function.to_lowercase(),
                    column.name
                )];
            }
        }

        let operand_only = |candidate: &ColumnCandidate| {
            analysis.conditions.iter().any(|condition| {
                condition.column_name.eq_ignore_ascii_case(&candidate.name)
                    && condition
                        .table_name
                        .as_deref()
                        .is_none_or(|t| t.eq_ignore_ascii_case(&candidate.table_name))
            })
        };
        let resolved: Vec<String> = analysis
            .columns
            .iter()
            .filter(|c| owns(c) && !operand_only(c))
            .map(|c| qualify(&c.table_name, &c.name))
            .collect();
        if !resolved.is_empty() {
            return resolved;
        }

        if joined {
            return participants.iter().flat_map(|t| default_columns(t)).collect();
        }

        Vec::new()
    }

    pub(super) fn build_select(&self, analysis: &Analysis, classification: &Classification) -> SqlOutcome {
        let Some(main) = self.main_table(analysis) else {
            return self.guard(GuardKind::NoTable);
        };

        let (mut statement, participants) = self.base_statement(analysis, classification, main);
        statement.projection = self.projection(analysis, &participants, !statement.joins.is_empty());
        statement.distinct = classification.has(Operation::Distinct)
            || self.mentions(analysis, self.profile.distinct_terms);

        self.apply_order(&mut statement, analysis, classification, &participants);
        self.apply_limit(&mut statement, analysis, classification, main);

        SqlOutcome::Sql(statement.render(self.dialect))
    }

    pub(super) fn build_count(&self, analysis: &Analysis, classification: &Classification) -> SqlOutcome {
        let Some(main) = self.main_table(analysis) else {
            return self.guard(GuardKind::NoTable);
        };

        let (mut statement, _) = self.base_statement(analysis, classification, main);

        let distinct_column = self
            .mentions(analysis, self.profile.distinct_terms)
            .then(|| {
                analysis
                    .columns
                    .iter()
                    .find(|c| !c.is_primary && c.table_name.eq_ignore_ascii_case(&main.name))
            })
            .flatten();

        statement.projection = vec![match distinct_column {
            Some(column) => format!("COUNT(DISTINCT {})", qualify(&column.table_name, &column.name)),
            None => "COUNT(*)".to_string(),
        }];

        SqlOutcome::Sql(statement.render(self.dialect))
    }
}

#[cfg(test)]
mod tests {
    use crate::classifier::classify;
    use crate::conditions::extract;
    use crate::config::EngineConfig;
    use crate::language::{extract_limit, normalize, Language};
    use crate::resolver::EntityResolver;

    use super::*;

    fn schema() -> Schema {
        Schema::new(vec![
            Table::new(
                "users",
                vec![
                    Column::new("id", "int").primary(),
                    Column::new("name", "varchar"),
                    Column::new("email", "varchar"),
                    Column::new("created_at", "timestamp"),
                ],
            ),
            Table::new(
                "orders",
                vec![
                    Column::new("id", "int").primary(),
                    Column::new("user_id", "int"),
                    Column::new("total", "decimal"),
                ],
            )
            .with_foreign_key("user_id", "users", "id"),
            Table::new("products", vec![Column::new("price", "decimal")]),
        ])
    }

    fn build(prompt: &str, db_type: &str) -> String {
        let schema = schema();
        let dialect = Dialect::for_db_type(Some(db_type));
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
    fn joins_follow_declared_keys() {
        assert_eq!(
            build("Show me all orders along with customer information", "mysql"),
            "SELECT orders.id, users.id, users.name FROM orders JOIN users ON orders.user_id = users.id"
        );
    }

    #[test]
    fn counts_with_filters() {
        assert_eq!(
            build("How many products have a price greater than 100", "mysql"),
            "SELECT COUNT(*) FROM products WHERE products.price > 100"
        );
    }

    #[test]
    fn explicit_limits_use_the_dialect() {
        assert_eq!(
            build("show the first 5 users", "postgres"),
            "SELECT * FROM users LIMIT 5"
        );
        assert_eq!(
            build("show the first 5 users", "sqlserver"),
            "SELECT * FROM users ORDER BY users.id OFFSET 0 ROWS FETCH NEXT 5 ROWS ONLY"
        );
    }

    #[test]
    fn ordering_prefers_dates() {
        assert_eq!(
            build("list users sorted by name descending", "mysql"),
            "SELECT users.name FROM users ORDER BY users.name DESC"
        );
        assert_eq!(
            build("show the newest users", "mysql"),
            "SELECT * FROM users ORDER BY users.created_at DESC"
        );
    }

    #[test]
    fn aggregates_from_vocabulary() {
        assert_eq!(
            build("show the average price of products", "mysql"),
            "SELECT AVG(products.price) AS avg_price FROM products"
        );
    }

    #[test]
    fn distinct_wording_sets_distinct() {
        assert_eq!(
            build("show distinct name from users", "mysql"),
            "SELECT DISTINCT users.name FROM users"
        );
    }

    #[test]
    fn missing_tables_are_guarded() {
        assert_eq!(
            build("show me the weather", "mysql"),
            "-- Unable to determine which table to query. Please specify the table in your query."
        );
    }
}
