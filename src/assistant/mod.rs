pub mod history;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::{debug, info, warn};

use crate::builder::{Analysis, QueryBuilder, SqlOutcome};
use crate::classifier::classify;
use crate::conditions::extract;
use crate::config::EngineConfig;
use crate::language::{self, extract_limit, normalize, Language};
use crate::resolver::EntityResolver;
use crate::schema::{Dialect, Schema};
use crate::validator::validate;

pub use history::{QueryFeedback, QueryHistory, QueryHistoryEntry};

#[derive(Debug)]
pub enum AssistantError {
    Initialization(String),
    NotInitialized,
}

impl fmt::Display for AssistantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssistantError::Initialization(msg) => write!(f, "Initialization error: {}", msg),
            AssistantError::NotInitialized => {
                write!(f, "Assistant not initialized: load a schema first")
            }
        }
    }
}

impl Error for AssistantError {}

impl From<serde_json::Error> for AssistantError {
    fn from(err: serde_json::Error) -> Self {
        AssistantError::Initialization(format!("invalid schema JSON: {}", err))
    }
}

/// One loaded schema with everything derived from it. Replaced wholesale on `init`.
struct Snapshot {
    schema: Schema,
    dialect: Dialect,
    cache: Mutex<HashMap<String, SqlOutcome>>,
    loaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Generation {
    pub outcome: SqlOutcome,
    pub language: Language,
    pub cached: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AssistantStats {
    /// Prompts that went through entity resolution.
    pub resolutions: u64,
    pub cache_hits: u64,
    pub generations: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssistantStatus {
    pub initialized: bool,
    pub dialect: Option<String>,
    pub tables: usize,
    pub columns: usize,
    pub cached_queries: usize,
    pub history_size: usize,
    pub loaded_at: Option<DateTime<Utc>>,
    pub success_rate: Option<f64>,
    pub stats: AssistantStats,
}

pub struct SqlAssistant {
    config: EngineConfig,
    snapshot: RwLock<Option<Arc<Snapshot>>>,
    history: Mutex<QueryHistory>,
    resolutions: AtomicU64,
    cache_hits: AtomicU64,
    generations: AtomicU64,
}

impl SqlAssistant {
    pub fn new(config: EngineConfig) -> Self {
        let history = QueryHistory::new(config.max_history);
        Self {
            config,
            snapshot: RwLock::new(None),
            history: Mutex::new(history),
            resolutions: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
            generations: AtomicU64::new(0),
        }
    }

    /// Loads a schema from its JSON ingestion payload.
    pub fn init(&self, schema_json: &str) -> Result<(), AssistantError> {
        if schema_json.trim().is_empty() {
            return Err(AssistantError::Initialization("empty schema payload".to_string()));
        }
        let schema = Schema::from_json(schema_json)?;
        let db_type = schema.db_type.clone();
        self.init_with_schema(schema, db_type.as_deref())
    }

    pub fn init_with_schema(&self, mut schema: Schema, db_type: Option<&str>) -> Result<(), AssistantError> {
        if schema.is_empty() {
            return Err(AssistantError::Initialization("schema has no tables".to_string()));
        }
        if db_type.is_some() {
            schema.db_type = db_type.map(str::to_string);
        }

        let dialect = Dialect::for_db_type(schema.db_type.as_deref());
        info!(
            "Loaded schema with {} tables and {} columns ({})",
            schema.tables.len(),
            schema.column_count(),
            dialect.name
        );

        let snapshot = Snapshot {
            schema,
            dialect,
            cache: Mutex::new(HashMap::new()),
            loaded_at: Utc::now(),
        };
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(snapshot));
        Ok(())
    }

    fn current(&self) -> Result<Arc<Snapshot>, AssistantError> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(AssistantError::NotInitialized)
    }

    pub fn generate_sql(&self, prompt: &str) -> Result<SqlOutcome, AssistantError> {
        self.generate(prompt).map(|generation| generation.outcome)
    }

    pub fn generate(&self, prompt: &str) -> Result<Generation, AssistantError> {
        // Holding the read guard keeps `reset` waiting until this generation is done
        let guard = self.snapshot.read().unwrap_or_else(PoisonError::into_inner);
        let snapshot = guard.as_ref().ok_or(AssistantError::NotInitialized)?;

        self.generations.fetch_add(1, Ordering::Relaxed);
        let language = language::detect(prompt);
        let key = prompt.trim().to_lowercase();

        let cached = snapshot
            .cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned();
        if let Some(outcome) = cached {
            debug!("Cache hit for prompt: {}", key);
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Generation {
                outcome,
                language,
                cached: true,
            });
        }

        let outcome = self.translate(snapshot, prompt, language);
        snapshot
            .cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, outcome.clone());

        match &outcome {
            SqlOutcome::Sql(sql) => {
                info!("Generated SQL: {}", sql);
                self.history
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(QueryHistoryEntry::new(sql.clone(), prompt));
            }
            SqlOutcome::Guarded { kind, message } => {
                warn!("Prompt guarded ({:?}): {}", kind, message);
            }
        }

        Ok(Generation {
            outcome,
            language,
            cached: false,
        })
    }

    fn translate(&self, snapshot: &Snapshot, prompt: &str, language: Language) -> SqlOutcome {
        let profile = language.profile();
        let normalized = normalize(prompt, profile);
        debug!("Normalized ({}): {}", language, normalized);

        self.resolutions.fetch_add(1, Ordering::Relaxed);
        let resolver = EntityResolver::new(&snapshot.schema, profile, &self.config);
        let tables = resolver.resolve_tables(&normalized);
        let columns = resolver.resolve_columns(&normalized, &tables);
        debug!("Resolved tables: {:?}", tables);

        let conditions = extract(&normalized, prompt, &tables, &columns, &snapshot.schema, profile);
        let classification = classify(&normalized, prompt, profile, tables.len());
        debug!("Classified as {}", classification.operation);

        let analysis = Analysis {
            raw: prompt.to_string(),
            pagination: extract_limit(&normalized, profile),
            normalized,
            tables,
            columns,
            conditions,
        };

        let outcome = QueryBuilder::new(&snapshot.schema, &snapshot.dialect, profile)
            .build(&analysis, &classification);
        validate(outcome, &snapshot.schema, profile)
    }

    /// Folds execution feedback into the history. Returns whether any entry matched.
    pub fn record_feedback(&self, feedback: &QueryFeedback) -> bool {
        let matched = self
            .history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .apply_feedback(feedback, self.config.feedback_correlation);
        if !matched {
            debug!("No history entry for feedback on: {}", feedback.sql);
        }
        matched
    }

    /// Drops the schema, its cache and the history.
    pub fn reset(&self) {
        let mut snapshot = self.snapshot.write().unwrap_or_else(PoisonError::into_inner);
        *snapshot = None;
        self.history.lock().unwrap_or_else(PoisonError::into_inner).clear();
        info!("Assistant reset");
    }

    pub fn is_initialized(&self) -> bool {
        self.current().is_ok()
    }

    pub fn schema(&self) -> Option<Schema> {
        self.current().ok().map(|snapshot| snapshot.schema.clone())
    }

    pub fn history(&self) -> Vec<QueryHistoryEntry> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner).entries()
    }

    pub fn success_rate(&self) -> Option<f64> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner).success_rate()
    }

    pub fn stats(&self) -> AssistantStats {
        AssistantStats {
            resolutions: self.resolutions.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            generations: self.generations.load(Ordering::Relaxed),
        }
    }

    pub fn status(&self) -> AssistantStatus {
        let snapshot = self.current().ok();
        let history_size = self.history.lock().unwrap_or_else(PoisonError::into_inner).len();

        AssistantStatus {
            initialized: snapshot.is_some(),
            dialect: snapshot.as_ref().map(|s| s.dialect.name.to_string()),
            tables: snapshot.as_ref().map_or(0, |s| s.schema.tables.len()),
            columns: snapshot.as_ref().map_or(0, |s| s.schema.column_count()),
            cached_queries: snapshot.as_ref().map_or(0, |s| {
                s.cache.lock().unwrap_or_else(PoisonError::into_inner).len()
            }),
            history_size,
            loaded_at: snapshot.as_ref().map(|s| s.loaded_at),
            success_rate: self.success_rate(),
            stats: self.stats(),
        }
    }
}

impl Default for SqlAssistant {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
