use super::*;
use crate::schema::{Column, Table};

const DESCRIPTIVE_NAMES: [&str; 4] = ["name", "title", "description", "label"];
const TEMPORAL_NAMES: [&str; 4] = ["date", "time", "created", "updated"];

impl EntityResolver<'_> {
    /// Columns of the resolved tables that the prompt refers to, most confident first.
    pub fn resolve_columns(&self, normalized: &str, tables: &[TableCandidate]) -> Vec<ColumnCandidate> {
        let prompt = Prompt::new(normalized, self.profile);
        let mut candidates = Vec::new();

        for candidate in tables {
            let Some(table) = self.schema.table(&candidate.name) else {
                continue;
            };
            let base = candidate.confidence * COLUMN_BASE_FACTOR;

            for column in &table.columns {
                let (confidence, explicit) = column_score(column, base, &prompt);
                if confidence >= self.confidence_threshold {
                    candidates.push(self.candidate(table, column, confidence, explicit, &prompt));
                }
            }
        }

        // explicitly named columns may live in a table nothing else pointed at
        for marker in &prompt.markers.columns {
            if candidates.iter().any(|c| c.name.eq_ignore_ascii_case(marker)) {
                continue;
            }
            let owner = self
                .schema
                .tables
                .iter()
                .find_map(|table| table.column(marker).map(|column| (table, column)));
            if let Some((table, column)) = owner {
                candidates.push(self.candidate(table, column, EXPLICIT_MARKER, true, &prompt));
            }
        }

        dedup_names(&mut candidates, |c| format!("{}.{}", c.table_name, c.name));
        candidates.sort_by(|a, b| by_confidence(a.confidence, b.confidence));
        candidates
    }

    fn candidate(
        &self,
        table: &Table,
        column: &Column,
        confidence: f64,
        explicit: bool,
        prompt: &Prompt,
    ) -> ColumnCandidate {
        ColumnCandidate {
            name: column.name.clone(),
            table_name: table.name.clone(),
            data_type: column.data_type.clone(),
            is_primary: column.is_primary_key(),
            confidence,
            aggregate_function: self.aggregate_for(column, prompt),
            explicit,
        }
    }

    // "average price", "soma de total"
    fn aggregate_for(&self, column: &Column, prompt: &Prompt) -> Option<String> {
        if !column.kind().is_numeric() {
            return None;
        }
        let name = column.name.to_lowercase();
        self.profile
            .aggregations
            .iter()
            .find(|(word, _)| {
                ["", "of ", "de ", "do ", "da "]
                    .iter()
                    .any(|joiner| prompt.mentions(&format!("{} {}{}", word, joiner, name)))
            })
            .map(|(_, function)| function.to_string())
    }
}

fn column_score(column: &Column, base: f64, prompt: &Prompt) -> (f64, bool) {
    let name = column.name.to_lowercase();
    let profile = prompt.profile;

    if prompt.markers.columns.contains(&name) {
        return (EXPLICIT_MARKER, true);
    }

    let mut score: f64 = 0.0;
    if prompt.mentions(&name) {
        score = score.max(EXACT_MATCH);
    }
    if name.contains('_') && prompt.mentions(&name.replace('_', " ")) {
        score = score.max(SPACED_NAME_MATCH);
    }
    if prompt.matches_description(column.description.as_deref()) {
        score = score.max(DESCRIPTION_MATCH);
    }
    if let Some(fraction) = prompt.parts_fraction(&name) {
        if fraction >= 1.0 {
            score = score.max(ALL_PARTS_MATCH);
        } else if fraction > 0.0 {
            score = score.max(base + PARTIAL_COLUMN_WEIGHT * fraction);
        }
    }
    if (column.is_primary_key() || name == "id") && prompt.mentions_any(profile.identifier_terms) {
        score = score.max(base + IDENTIFIER_BOOST);
    }
    if DESCRIPTIVE_NAMES.iter().any(|n| name.contains(n))
        && prompt.mentions_any(profile.descriptive_terms)
    {
        score = score.max(base + DESCRIPTIVE_BOOST);
    }
    if (column.kind().is_temporal() || TEMPORAL_NAMES.iter().any(|n| name.contains(n)))
        && prompt.mentions_any(profile.temporal_terms)
    {
        score = score.max(base + TEMPORAL_BOOST);
    }
    if name.chars().count() >= 3 && prompt.mentions_stem(&name) {
        score = score.max(base);
    }
    if column
        .sample_values
        .iter()
        .filter(|value| value.chars().count() >= 2)
        .any(|value| prompt.mentions(&value.to_lowercase()))
    {
        score = score.max(SAMPLE_VALUE_MATCH);
    }

    (score.min(1.0), false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Language;

    fn schema() -> Schema {
        let mut status = Column::new("status", "varchar");
        status.sample_values = vec!["shipped".to_string(), "pending".to_string()];
        Schema::new(vec![
            Table::new(
                "family",
                vec![
                    Column::new("rfam_id", "varchar").primary(),
                    Column::new("rfam_acc", "varchar"),
                    Column::new("description", "text"),
                ],
            ),
            Table::new(
                "orders",
                vec![
                    Column::new("id", "int").primary(),
                    Column::new("created_at", "timestamp"),
                    Column::new("total", "decimal"),
                    status,
                ],
            ),
        ])
    }

    fn resolve(prompt: &str, tables: &[(&str, f64)]) -> Vec<ColumnCandidate> {
        let schema = schema();
        let config = EngineConfig::default();
        let tables: Vec<TableCandidate> = tables
            .iter()
            .map(|(name, confidence)| TableCandidate {
                name: name.to_string(),
                confidence: *confidence,
            })
            .collect();
        EntityResolver::new(&schema, Language::English.profile(), &config)
            .resolve_columns(prompt, &tables)
    }

    #[test]
    fn explicit_columns_are_flagged() {
        let columns = resolve(
            "select COLUMN:rfam_id TABLE:family onde rfam_acc = 3",
            &[("family", 1.0)],
        );
        assert_eq!(columns[0].name, "rfam_id");
        assert!(columns[0].explicit);
        assert_eq!(columns[1].name, "rfam_acc");
        assert_eq!(columns[1].confidence, EXACT_MATCH);
        assert!(!columns[1].explicit);
    }

    #[test]
    fn explicit_columns_are_found_outside_resolved_tables() {
        let columns = resolve("select COLUMN:total", &[]);
        assert_eq!(columns.len(), 1);
        assert_eq!(columns[0].table_name, "orders");
    }

    #[test]
    fn spaced_names_and_sample_values_resolve() {
        let columns = resolve("select orders created at today", &[("orders", 0.95)]);
        assert!(columns.iter().any(|c| c.name == "created_at"));

        let columns = resolve("select orders that are shipped", &[("orders", 0.95)]);
        assert_eq!(columns[0].name, "status");
        assert_eq!(columns[0].confidence, SAMPLE_VALUE_MATCH);
    }

    #[test]
    fn aggregation_words_attach_to_numeric_columns() {
        let columns = resolve("select average total of orders", &[("orders", 0.95)]);
        let total = columns.iter().find(|c| c.name == "total").unwrap();
        assert_eq!(total.aggregate_function.as_deref(), Some("AVG"));
    }
}
