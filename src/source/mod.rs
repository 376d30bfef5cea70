pub mod providers;

use async_trait::async_trait;
use std::error::Error;
use std::fmt;
use tracing::info;

use crate::config::SchemaConfig;
use crate::schema::Schema;

#[derive(Debug)]
pub enum SourceError {
    Io(std::io::Error),
    Parse(String),
    Database(String),
    Config(String),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::Io(err) => write!(f, "Schema source I/O error: {}", err),
            SourceError::Parse(msg) => write!(f, "Schema parse error: {}", msg),
            SourceError::Database(msg) => write!(f, "Schema database error: {}", msg),
            SourceError::Config(msg) => write!(f, "Schema source configuration error: {}", msg),
        }
    }
}

impl Error for SourceError {}

impl From<std::io::Error> for SourceError {
    fn from(err: std::io::Error) -> Self {
        SourceError::Io(err)
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Parse(err.to_string())
    }
}

impl From<duckdb::Error> for SourceError {
    fn from(err: duckdb::Error) -> Self {
        SourceError::Database(err.to_string())
    }
}

impl From<r2d2::Error> for SourceError {
    fn from(err: r2d2::Error) -> Self {
        SourceError::Database(format!("connection pool: {}", err))
    }
}

impl From<tokio::task::JoinError> for SourceError {
    fn from(err: tokio::task::JoinError) -> Self {
        SourceError::Database(format!("introspection task failed: {}", err))
    }
}

/// A scanned schema together with the database type it was declared for.
#[derive(Debug, Clone)]
pub struct LoadedSchema {
    pub schema: Schema,
    pub db_type: Option<String>,
    pub origin: String,
}

#[async_trait]
pub trait SchemaSource: Send + Sync {
    async fn load(&self) -> Result<LoadedSchema, SourceError>;
}

pub struct SourceManager {
    source: Option<Box<dyn SchemaSource + Send + Sync>>,
    db_type: Option<String>,
    infer_foreign_keys: bool,
}

impl SourceManager {
    pub fn new(config: &SchemaConfig) -> Result<Self, SourceError> {
        let path = || {
            config
                .path
                .clone()
                .ok_or_else(|| SourceError::Config(format!("backend '{}' needs schema.path", config.backend)))
        };

        let source: Option<Box<dyn SchemaSource + Send + Sync>> = match config.backend.as_str() {
            "none" | "" => None,
            "json" => Some(Box::new(providers::json::JsonFileSource::new(path()?))),
            "duckdb" => Some(Box::new(providers::duckdb::DuckDbSource::new(
                &path()?,
                config.pool_size,
            )?)),
            other => {
                return Err(SourceError::Config(format!("unknown schema backend: {}", other)));
            }
        };

        Ok(Self {
            source,
            db_type: config.db_type.clone(),
            infer_foreign_keys: config.infer_foreign_keys,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.source.is_some()
    }

    /// Loads the configured schema, if any. A configured `db_type` wins over the one
    /// the source reports.
    pub async fn load(&self) -> Result<Option<LoadedSchema>, SourceError> {
        let Some(source) = &self.source else {
            return Ok(None);
        };

        let mut loaded = source.load().await?;
        if self.db_type.is_some() {
            loaded.db_type = self.db_type.clone();
        }
        if self.infer_foreign_keys {
            let added = loaded.schema.infer_foreign_keys();
            if added > 0 {
                info!("Inferred {} foreign keys from column naming", added);
            }
        }

        info!(
            "Loaded {} tables from {}",
            loaded.schema.tables.len(),
            loaded.origin
        );
        Ok(Some(loaded))
    }
}
