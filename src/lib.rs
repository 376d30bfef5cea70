//! Rule-based translation of English and Portuguese requests into SQL over a scanned schema.
//!
//! The pipeline runs language detection and normalization, entity resolution, operation
//! classification, condition extraction, statement building and validation. [`SqlAssistant`]
//! owns the loaded schema, the per-schema cache and the query history.

pub mod assistant;
pub mod builder;
pub mod classifier;
pub mod conditions;
pub mod config;
pub mod db;
pub mod language;
pub mod resolver;
pub mod schema;
pub mod source;
pub mod template;
pub mod util;
pub mod validator;
pub mod web;

pub use assistant::{
    AssistantError, AssistantStats, AssistantStatus, Generation, QueryFeedback, QueryHistoryEntry,
    SqlAssistant,
};
pub use builder::{GuardKind, SqlOutcome};
pub use classifier::Operation;
pub use language::Language;
pub use schema::{Column, Dialect, ForeignKey, Schema, Table};
