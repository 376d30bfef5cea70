// Maps prompt wording onto schema tables and columns with confidence scores.
mod columns;
mod tables;

use regex::Regex;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::config::EngineConfig;
use crate::language::LanguageProfile;
use crate::schema::Schema;
use crate::util::text::{contains_word, tokens};

// Table signals
pub const EXPLICIT_MARKER: f64 = 1.0;
pub const EXACT_MATCH: f64 = 0.95;
pub const INFLECTED_MATCH: f64 = 0.9;
pub const ALL_PARTS_MATCH: f64 = 0.85;
pub const DESCRIPTION_MATCH: f64 = 0.85;
pub const PARTIAL_PARTS_BASE: f64 = 0.5;
pub const PARTIAL_PARTS_WEIGHT: f64 = 0.3;
pub const SUBSTRING_BASE: f64 = 0.5;
pub const SUBSTRING_WEIGHT: f64 = 0.1;
pub const FUZZY_DISCOUNT: f64 = 0.75;
pub const COLUMN_OWNER_CONFIDENCE: f64 = 0.5;

// Column signals
pub const COLUMN_BASE_FACTOR: f64 = 0.8;
pub const SPACED_NAME_MATCH: f64 = 0.9;
pub const SAMPLE_VALUE_MATCH: f64 = 0.85;
pub const PARTIAL_COLUMN_WEIGHT: f64 = 0.2;
pub const IDENTIFIER_BOOST: f64 = 0.15;
pub const DESCRIPTIVE_BOOST: f64 = 0.2;
pub const TEMPORAL_BOOST: f64 = 0.2;

static MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(TABLE|COLUMN):(\w+)").expect("marker pattern"));
// clause keywords, not entity mentions
static ORDER_BY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\border by\b").expect("order by pattern"));

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableCandidate {
    pub name: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnCandidate {
    pub name: String,
    pub table_name: String,
    pub data_type: String,
    pub is_primary: bool,
    pub confidence: f64,
    pub aggregate_function: Option<String>,
    pub explicit: bool,
}

/// `TABLE:` and `COLUMN:` markers left in a prompt by the normalizer, lowercased.
#[derive(Debug, Default)]
pub struct Markers {
    pub tables: Vec<String>,
    pub columns: Vec<String>,
}

impl Markers {
    pub fn parse(normalized: &str) -> Self {
        let mut markers = Markers::default();
        for caps in MARKER.captures_iter(normalized) {
            let name = caps[2].to_lowercase();
            if &caps[1] == "TABLE" {
                markers.tables.push(name);
            } else {
                markers.columns.push(name);
            }
        }
        markers
    }
}

/// Lowercased views of one normalized prompt, computed once per resolution.
struct Prompt<'a> {
    lower: String,
    tokens: Vec<String>,
    markers: Markers,
    profile: &'a LanguageProfile,
}

impl<'a> Prompt<'a> {
    fn new(normalized: &str, profile: &'a LanguageProfile) -> Self {
        let text = ORDER_BY.replace_all(normalized, " ");
        Self {
            lower: text.to_lowercase(),
            tokens: tokens(&text),
            markers: Markers::parse(normalized),
            profile,
        }
    }

    fn mentions(&self, phrase: &str) -> bool {
        contains_word(&self.lower, phrase)
    }

    fn mentions_any(&self, terms: &[&str]) -> bool {
        terms.iter().any(|term| self.mentions(term))
    }

    /// Some token starts with `stem`, so "emails" counts for `email` but "page" not for `age`.
    fn mentions_stem(&self, stem: &str) -> bool {
        self.tokens.iter().any(|token| token.starts_with(stem))
    }

    fn content_words(&self, min_len: usize) -> impl Iterator<Item = &String> {
        self.tokens.iter().filter(move |token| {
            token.chars().count() >= min_len
                && !self.profile.is_common_word(token)
                && !token.chars().all(|c| c.is_ascii_digit())
        })
    }

    /// A content word of the prompt appears in a schema description.
    fn matches_description(&self, description: Option<&str>) -> bool {
        let Some(description) = description else {
            return false;
        };
        let description = description.to_lowercase();
        self.content_words(4)
            .any(|word| word != "table" && word != "column" && contains_word(&description, word))
    }

    /// Fraction of the underscore-separated parts (longer than two chars) present in the prompt.
    fn parts_fraction(&self, name: &str) -> Option<f64> {
        if !name.contains('_') {
            return None;
        }
        let parts: Vec<&str> = name.split('_').filter(|p| p.len() > 2).collect();
        if parts.is_empty() {
            return None;
        }
        let found = parts.iter().filter(|p| self.mentions(p)).count();
        Some(found as f64 / parts.len() as f64)
    }
}

pub struct EntityResolver<'a> {
    schema: &'a Schema,
    profile: &'a LanguageProfile,
    confidence_threshold: f64,
    fuzzy_threshold: f64,
}

impl<'a> EntityResolver<'a> {
    pub fn new(schema: &'a Schema, profile: &'a LanguageProfile, config: &EngineConfig) -> Self {
        Self {
            schema,
            profile,
            confidence_threshold: config.confidence_threshold,
            fuzzy_threshold: config.fuzzy_threshold,
        }
    }
}

fn by_confidence(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

fn dedup_names<T>(items: &mut Vec<T>, key: impl Fn(&T) -> String) {
    let mut seen = HashSet::new();
    items.retain(|item| seen.insert(key(item)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_markers() {
        let markers = Markers::parse("select COLUMN:rfam_id COLUMN:Name TABLE:family onde x = 1");
        assert_eq!(markers.tables, vec!["family"]);
        assert_eq!(markers.columns, vec!["rfam_id", "name"]);
    }
}
