use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

use crate::language::LanguageProfile;
use crate::util::text::contains_word;

pub const BASE_SELECT: f64 = 0.1;
pub const PATTERN_WEIGHT: f64 = 0.5;
pub const KEYWORD_WEIGHT: f64 = 0.3;
pub const SQL_FRAGMENT_WEIGHT: f64 = 0.4;
pub const ENTITY_WEIGHT: f64 = 0.3;
pub const QUESTION_WEIGHT: f64 = 0.2;
pub const FILTER_WEIGHT: f64 = 0.2;
pub const COUNT_REFINEMENT: f64 = 0.6;
pub const SECONDARY_THRESHOLD: f64 = 0.7;
// Sums of the weights above are compared with this tolerance
const SCORE_EPSILON: f64 = 1e-9;

static FILTER_MARKERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(>=|<=|!=|<>|=|>|<)|\bLIKE\b|\bBETWEEN\b|\bIS (?:NOT )?NULL\b|\bIN \(")
        .expect("filter marker pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Select,
    Count,
    Insert,
    Update,
    Delete,
    Join,
    Group,
    Order,
    Limit,
    Distinct,
}

impl Operation {
    /// Evaluation order; on equal scores the earlier operation wins.
    pub const ALL: [Operation; 10] = [
        Operation::Select,
        Operation::Count,
        Operation::Insert,
        Operation::Update,
        Operation::Delete,
        Operation::Join,
        Operation::Group,
        Operation::Order,
        Operation::Limit,
        Operation::Distinct,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Select => "select",
            Operation::Count => "count",
            Operation::Insert => "insert",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::Join => "join",
            Operation::Group => "group",
            Operation::Order => "order",
            Operation::Limit => "limit",
            Operation::Distinct => "distinct",
        }
    }

    fn sql_fragments(&self) -> &'static [&'static str] {
        match self {
            Operation::Select => &["select "],
            Operation::Count => &["count("],
            Operation::Insert => &["insert into"],
            Operation::Update => &["update "],
            Operation::Delete => &["delete from"],
            Operation::Join => &["join "],
            Operation::Group => &["group by"],
            Operation::Order => &["order by"],
            Operation::Limit => &["limit "],
            Operation::Distinct => &["distinct"],
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Classification {
    pub operation: Operation,
    pub secondary: Vec<Operation>,
    pub scores: Vec<(Operation, f64)>,
}

impl Classification {
    pub fn score(&self, operation: Operation) -> f64 {
        self.scores
            .iter()
            .find(|(op, _)| *op == operation)
            .map_or(0.0, |(_, score)| *score)
    }

    /// The primary operation together with every secondary one.
    pub fn has(&self, operation: Operation) -> bool {
        self.operation == operation || self.secondary.contains(&operation)
    }
}

/// Scores every operation against the prompt and picks the winner.
/// `entity_count` is the number of tables the resolver found.
pub fn classify(
    normalized: &str,
    raw: &str,
    profile: &LanguageProfile,
    entity_count: usize,
) -> Classification {
    let lower = normalized.to_lowercase();
    let raw_lower = raw.to_lowercase();
    let mut scores: Vec<(Operation, f64)> = Operation::ALL.iter().map(|op| (*op, 0.0)).collect();

    let mut add = |operation: Operation, weight: f64| {
        if let Some((_, score)) = scores.iter_mut().find(|(op, _)| *op == operation) {
            *score += weight;
        }
    };

    add(Operation::Select, BASE_SELECT);

    for (operation, pattern) in &profile.operation_patterns {
        if pattern.is_match(normalized) {
            add(*operation, PATTERN_WEIGHT);
        }
    }

    for (operation, keywords) in profile.operation_keywords {
        for keyword in keywords.iter() {
            if contains_word(&lower, keyword) {
                add(*operation, KEYWORD_WEIGHT);
            }
        }
    }

    for operation in Operation::ALL {
        for fragment in operation.sql_fragments() {
            if raw_lower.contains(fragment) {
                add(operation, SQL_FRAGMENT_WEIGHT);
            }
        }
    }

    add(Operation::Select, ENTITY_WEIGHT * entity_count as f64);

    if raw.contains('?') {
        add(Operation::Select, QUESTION_WEIGHT);
        add(Operation::Count, QUESTION_WEIGHT);
    }

    if profile.filter_words.is_match(normalized) || FILTER_MARKERS.is_match(normalized) {
        add(Operation::Select, FILTER_WEIGHT);
    }

    let mut operation = Operation::Select;
    let mut best = f64::MIN;
    for (op, score) in &scores {
        if *score > best + SCORE_EPSILON {
            best = *score;
            operation = *op;
        }
    }

    let count_score = scores
        .iter()
        .find(|(op, _)| *op == Operation::Count)
        .map_or(0.0, |(_, score)| *score);
    if operation == Operation::Select && count_score > COUNT_REFINEMENT {
        operation = Operation::Count;
    }

    let secondary = scores
        .iter()
        .filter(|(op, score)| *op != operation && *score > SECONDARY_THRESHOLD)
        .map(|(op, _)| *op)
        .collect();

    Classification {
        operation,
        secondary,
        scores,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::{normalize, Language};

    fn run(prompt: &str, entities: usize) -> Classification {
        let language = crate::language::detect(prompt);
        let profile = language.profile();
        classify(&normalize(prompt, profile), prompt, profile, entities)
    }

    #[test]
    fn plain_requests_default_to_select() {
        let classification = run("users", 1);
        assert_eq!(classification.operation, Operation::Select);
        assert!(classification.secondary.is_empty());
    }

    #[test]
    fn counting_refines_select() {
        assert_eq!(run("How many products have a price greater than 100", 1).operation, Operation::Count);
        assert_eq!(run("Quantos produtos têm preço maior que 100", 1).operation, Operation::Count);
    }

    #[test]
    fn destructive_operations_win_over_entity_weight() {
        assert_eq!(run("delete the user with no condition specified", 1).operation, Operation::Delete);
        assert_eq!(run("delete users where id = 5", 1).operation, Operation::Delete);
        assert_eq!(run("update users set name to Ann where id = 3", 1).operation, Operation::Update);
        assert_eq!(run("add a new user named Ann", 1).operation, Operation::Insert);
    }

    #[test]
    fn join_intent_becomes_secondary() {
        let classification = run("Show me all orders along with customer information", 1);
        assert_eq!(classification.operation, Operation::Select);
        assert!(classification.has(Operation::Join));
    }

    #[test]
    fn ties_keep_select() {
        let classification = run("", 0);
        assert_eq!(classification.operation, Operation::Select);
        assert_eq!(classification.score(Operation::Select), BASE_SELECT);
    }

    #[test]
    fn operation_names_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&Operation::Distinct).unwrap(), "\"distinct\"");
        assert_eq!(Operation::Group.to_string(), "group");
    }
}
