use super::*;
use crate::util::text::format_value;

const MAX_PLACEHOLDER_COLUMNS: usize = 3;

impl<'a> QueryBuilder<'a> {
    /// Offset where the filter part of the prompt starts, if there is one.
    fn filter_start(&self, analysis: &Analysis) -> Option<usize> {
        self.profile
            .filter_words
            .find(&analysis.normalized)
            .map(|m| m.start())
    }

    /// `column = value` pairs for `table` from `set x to v` / `x = v` wording and
    /// equality conditions, limited to text before `until` when given.
    fn assignments(
        &self,
        analysis: &Analysis,
        table: &Table,
        until: Option<usize>,
    ) -> Vec<(String, String)> {
        let head = &analysis.normalized[..until.unwrap_or(analysis.normalized.len())];
        let mut pairs: Vec<(usize, String, String)> = Vec::new();

        for condition in &analysis.conditions {
            let in_head = until.is_none_or(|start| condition.position < start);
            let same_table = condition
                .table_name
                .as_deref()
                .is_some_and(|t| t.eq_ignore_ascii_case(&table.name));
            if in_head && same_table && condition.is_equality() {
                pairs.push((condition.position, condition.column_name.clone(), condition.value.clone()));
            }
        }

        for caps in self.profile.assignment.captures_iter(head) {
            let (Some(whole), Some(column)) = (caps.get(0), table.column(&caps[1])) else {
                continue;
            };
            if !pairs.iter().any(|(_, name, _)| name.eq_ignore_ascii_case(&column.name)) {
                pairs.push((whole.start(), column.name.clone(), format_value(&caps[2])));
            }
        }

        pairs.sort_by_key(|(position, _, _)| *position);
        pairs.into_iter().map(|(_, column, value)| (column, value)).collect()
    }

    pub(super) fn build_insert(&self, analysis: &Analysis) -> SqlOutcome {
        let Some(table) = self.main_table(analysis) else {
            return self.guard(GuardKind::NoWriteTable("INSERT".to_string()));
        };

        let columns: Vec<&Column> = table.columns.iter().filter(|c| !c.is_auto_increment()).collect();
        if columns.is_empty() {
            return self.guard(GuardKind::NoInsertColumns(table.name.clone()));
        }

        let provided = self.assignments(analysis, table, None);
        let values: Vec<String> = columns
            .iter()
            .map(|column| {
                provided
                    .iter()
                    .find(|(name, _)| name.eq_ignore_ascii_case(&column.name))
                    .map_or_else(|| "?".to_string(), |(_, value)| value.clone())
            })
            .collect();
        let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();

        SqlOutcome::Sql(format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table.name,
            names.join(", "),
            values.join(", ")
        ))
    }

    pub(super) fn build_update(&self, analysis: &Analysis) -> SqlOutcome {
        let Some(table) = self.main_table(analysis) else {
            return self.guard(GuardKind::NoWriteTable("UPDATE".to_string()));
        };

        let filter_start = self.filter_start(analysis);
        let mut assignments = self.assignments(analysis, table, filter_start);

        let filters: Vec<Condition> = analysis
            .conditions
            .iter()
            .filter(|c| {
                let assigned = c.is_equality()
                    && filter_start.is_none_or(|start| c.position < start)
                    && assignments
                        .iter()
                        .any(|(name, _)| name.eq_ignore_ascii_case(&c.column_name));
                !assigned
            })
            .cloned()
            .collect();

        if filters.is_empty() {
            return self.guard(GuardKind::UnsafeUpdate(table.name.clone()));
        }

        if assignments.is_empty() {
            assignments = table
                .columns
                .iter()
                .filter(|c| !c.is_primary_key() && !c.is_auto_increment())
                .take(MAX_PLACEHOLDER_COLUMNS)
                .map(|c| (c.name.clone(), "?".to_string()))
                .collect();
        }

        let set: Vec<String> = assignments
            .iter()
            .map(|(column, value)| format!("{} = {}", column, value))
            .collect();

        SqlOutcome::Sql(format!(
            "UPDATE {} SET {} WHERE {}",
            table.name,
            set.join(", "),
            crate::conditions::render_all(&filters)
        ))
    }

    pub(super) fn build_delete(&self, analysis: &Analysis) -> SqlOutcome {
        let Some(table) = self.main_table(analysis) else {
            return self.guard(GuardKind::NoWriteTable("DELETE".to_string()));
        };

        if analysis.conditions.is_empty() {
            return self.guard(GuardKind::UnsafeDelete(table.name.clone()));
        }

        SqlOutcome::Sql(format!(
            "DELETE FROM {} WHERE {}",
            table.name,
            crate::conditions::render_all(&analysis.conditions)
        ))
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
        let mut id = Column::new("id", "int").primary();
        id.extra = Some("auto_increment".to_string());
        Schema::new(vec![Table::new(
            "users",
            vec![
                id,
                Column::new("name", "varchar"),
                Column::new("email", "varchar"),
                Column::new("age", "int"),
            ],
        )])
    }

    fn build(prompt: &str) -> String {
        let schema = schema();
        let dialect = Dialect::default();
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
    fn delete_without_conditions_is_guarded() {
        assert_eq!(
            build("delete the user with no condition specified"),
            "-- DELETE on users requires a WHERE condition. Please specify which records to delete."
        );
        assert_eq!(
            build("delete users where age < 18"),
            "DELETE FROM users WHERE users.age < 18"
        );
    }

    #[test]
    fn update_splits_assignments_from_filters() {
        assert_eq!(
            build("update users set email to 'a@b.com' where id = 7"),
            "UPDATE users SET email = 'a@b.com' WHERE users.id = 7"
        );
        assert_eq!(
            build("update the users where age > 30"),
            "UPDATE users SET name = ?, email = ?, age = ? WHERE users.age > 30"
        );
    }

    #[test]
    fn update_without_filter_is_guarded() {
        assert_eq!(
            build("update users set email to 'x@y.com'"),
            "-- UPDATE on users requires a WHERE condition. Please specify which records to update."
        );
    }

    #[test]
    fn insert_skips_auto_increment_columns() {
        assert_eq!(
            build("add a new user named Ann"),
            "INSERT INTO users (name, email, age) VALUES ('Ann', ?, ?)"
        );
    }
}
