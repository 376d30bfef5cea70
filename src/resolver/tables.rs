use strsim::jaro_winkler;
use tracing::debug;

use super::*;
use crate::schema::Table;
use crate::util::text::{make_plural, make_singular};

impl EntityResolver<'_> {
    /// Tables the prompt refers to, most confident first.
    pub fn resolve_tables(&self, normalized: &str) -> Vec<TableCandidate> {
        let prompt = Prompt::new(normalized, self.profile);

        let mut candidates: Vec<TableCandidate> = self
            .schema
            .tables
            .iter()
            .map(|table| TableCandidate {
                name: table.name.clone(),
                confidence: table_score(table, &prompt),
            })
            .filter(|candidate| candidate.confidence >= self.confidence_threshold)
            .collect();
        candidates.sort_by(|a, b| by_confidence(a.confidence, b.confidence));

        if candidates.is_empty() {
            candidates = self.fuzzy_tables(&prompt);
            if !candidates.is_empty() {
                debug!("Tables resolved by fuzzy matching: {:?}", candidates);
            }
        }

        if candidates.is_empty() {
            if let Some(owner) = self.column_owner(&prompt) {
                debug!("Table {} resolved through its mentioned columns", owner.name);
                candidates.push(owner);
            }
        }

        candidates
    }

    fn fuzzy_tables(&self, prompt: &Prompt) -> Vec<TableCandidate> {
        let entities: Vec<&String> = prompt.content_words(3).collect();

        let mut candidates: Vec<TableCandidate> = self
            .schema
            .tables
            .iter()
            .filter_map(|table| {
                let name = table.name.to_lowercase();
                let forms = [make_singular(&name), make_plural(&name), name];
                let best = entities
                    .iter()
                    .flat_map(|entity| forms.iter().map(move |form| jaro_winkler(entity, form)))
                    .fold(0.0_f64, f64::max);

                (best > self.fuzzy_threshold).then(|| TableCandidate {
                    name: table.name.clone(),
                    confidence: best * FUZZY_DISCOUNT,
                })
            })
            .collect();
        candidates.sort_by(|a, b| by_confidence(a.confidence, b.confidence));
        candidates
    }

    fn column_owner(&self, prompt: &Prompt) -> Option<TableCandidate> {
        let mut owner: Option<(&Table, usize)> = None;
        for table in &self.schema.tables {
            let mentioned = table
                .columns
                .iter()
                .filter(|column| prompt.mentions(&column.name.to_lowercase()))
                .count();
            if mentioned > owner.map_or(0, |(_, best)| best) {
                owner = Some((table, mentioned));
            }
        }

        owner.map(|(table, _)| TableCandidate {
            name: table.name.clone(),
            confidence: COLUMN_OWNER_CONFIDENCE,
        })
    }
}

fn table_score(table: &Table, prompt: &Prompt) -> f64 {
    let name = table.name.to_lowercase();
    let mut score: f64 = 0.0;

    if prompt.markers.tables.contains(&name) {
        score = score.max(EXPLICIT_MARKER);
    }
    if prompt.mentions(&name) {
        score = score.max(EXACT_MATCH);
    }
    let singular = make_singular(&name);
    let plural = make_plural(&name);
    if (singular != name && prompt.mentions(&singular)) || prompt.mentions(&plural) {
        score = score.max(INFLECTED_MATCH);
    }
    if let Some(fraction) = prompt.parts_fraction(&name) {
        if fraction >= 1.0 {
            score = score.max(ALL_PARTS_MATCH);
        } else if fraction > 0.0 {
            score = score.max(PARTIAL_PARTS_BASE + PARTIAL_PARTS_WEIGHT * fraction);
        }
    }
    if prompt.matches_description(table.description.as_deref()) {
        score = score.max(DESCRIPTION_MATCH);
    }
    if prompt.lower.contains(&name) {
        let length = name.chars().count().min(20) as f64;
        score = score.max(SUBSTRING_BASE + SUBSTRING_WEIGHT * length / 20.0);
    }

    score
}
