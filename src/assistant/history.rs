use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::config::FeedbackCorrelation;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryHistoryEntry {
    pub sql: String,
    pub prompt: String,
    pub created_at: DateTime<Utc>,
    pub success: bool,
    pub result_count: Option<u64>,
    /// Seconds, as reported by whoever ran the statement.
    pub execution_time: Option<f64>,
    pub error_message: Option<String>,
    pub feedback_received: bool,
}

impl QueryHistoryEntry {
    pub fn new(sql: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            prompt: prompt.into(),
            created_at: Utc::now(),
            success: true,
            result_count: None,
            execution_time: None,
            error_message: None,
            feedback_received: false,
        }
    }

    fn apply(&mut self, feedback: &QueryFeedback) {
        self.success = feedback.was_successful;
        self.result_count = feedback.row_count;
        self.execution_time = feedback.execution_time;
        self.error_message = feedback.error_message.clone();
        self.feedback_received = true;
    }
}

/// Outcome of running a generated statement, reported back by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryFeedback {
    pub sql: String,
    pub was_successful: bool,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub row_count: Option<u64>,
    #[serde(default)]
    pub execution_time: Option<f64>,
}

/// Append-only log of generated statements. The oldest entry is evicted at capacity.
#[derive(Debug)]
pub struct QueryHistory {
    entries: VecDeque<QueryHistoryEntry>,
    capacity: usize,
}

impl QueryHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, entry: QueryHistoryEntry) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Applies feedback to entries with the same SQL text. Returns whether any matched.
    pub fn apply_feedback(&mut self, feedback: &QueryFeedback, correlation: FeedbackCorrelation) -> bool {
        let sql = feedback.sql.trim();
        let mut matching = self.entries.iter_mut().filter(|entry| entry.sql == sql);

        match correlation {
            FeedbackCorrelation::FirstMatch => matching.next().map(|entry| entry.apply(feedback)).is_some(),
            FeedbackCorrelation::MostRecent => matching
                .next_back()
                .map(|entry| entry.apply(feedback))
                .is_some(),
            FeedbackCorrelation::AllMatches => {
                let mut matched = false;
                for entry in matching {
                    entry.apply(feedback);
                    matched = true;
                }
                matched
            }
        }
    }

    /// Share of successful executions among entries that received feedback.
    pub fn success_rate(&self) -> Option<f64> {
        let reported: Vec<&QueryHistoryEntry> =
            self.entries.iter().filter(|e| e.feedback_received).collect();
        if reported.is_empty() {
            return None;
        }
        let successes = reported.iter().filter(|e| e.success).count();
        Some(successes as f64 / reported.len() as f64)
    }

    pub fn entries(&self) -> Vec<QueryHistoryEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feedback(sql: &str, ok: bool, rows: u64) -> QueryFeedback {
        QueryFeedback {
            sql: sql.to_string(),
            was_successful: ok,
            error_message: (!ok).then(|| "boom".to_string()),
            row_count: Some(rows),
            execution_time: Some(0.1),
        }
    }

    fn history() -> QueryHistory {
        let mut history = QueryHistory::new(10);
        history.push(QueryHistoryEntry::new("SELECT * FROM a", "first"));
        history.push(QueryHistoryEntry::new("SELECT * FROM b", "other"));
        history.push(QueryHistoryEntry::new("SELECT * FROM a", "second"));
        history
    }

    #[test]
    fn most_recent_match_receives_feedback() {
        let mut history = history();
        assert!(history.apply_feedback(&feedback("SELECT * FROM a", true, 5), FeedbackCorrelation::MostRecent));

        let entries = history.entries();
        assert!(!entries[0].feedback_received);
        assert!(entries[2].feedback_received);
        assert_eq!(entries[2].result_count, Some(5));
    }

    #[test]
    fn first_and_all_matches() {
        let mut history = history();
        history.apply_feedback(&feedback("SELECT * FROM a", false, 0), FeedbackCorrelation::FirstMatch);
        let entries = history.entries();
        assert!(entries[0].feedback_received && !entries[0].success);
        assert!(!entries[2].feedback_received);

        let mut history = self::history();
        history.apply_feedback(&feedback("SELECT * FROM a", true, 1), FeedbackCorrelation::AllMatches);
        let received = history.entries().iter().filter(|e| e.feedback_received).count();
        assert_eq!(received, 2);
    }

    #[test]
    fn unmatched_feedback_is_reported() {
        let mut history = history();
        assert!(!history.apply_feedback(&feedback("SELECT 1", true, 1), FeedbackCorrelation::AllMatches));
        assert_eq!(history.success_rate(), None);
    }

    #[test]
    fn success_rate_counts_reported_entries() {
        let mut history = history();
        history.apply_feedback(&feedback("SELECT * FROM a", true, 1), FeedbackCorrelation::MostRecent);
        history.apply_feedback(&feedback("SELECT * FROM b", false, 0), FeedbackCorrelation::MostRecent);
        assert_eq!(history.success_rate(), Some(0.5));
    }

    #[test]
    fn oldest_entries_are_evicted() {
        let mut history = QueryHistory::new(2);
        for n in 0..3 {
            history.push(QueryHistoryEntry::new(format!("SELECT {}", n), "p"));
        }
        let sql: Vec<String> = history.entries().into_iter().map(|e| e.sql).collect();
        assert_eq!(sql, vec!["SELECT 1", "SELECT 2"]);
    }
}
