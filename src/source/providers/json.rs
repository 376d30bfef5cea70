use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

use crate::schema::Schema;
use crate::source::{LoadedSchema, SchemaSource, SourceError};

/// Schema ingestion payload stored in a file.
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SchemaSource for JsonFileSource {
    async fn load(&self) -> Result<LoadedSchema, SourceError> {
        debug!("Reading schema file {}", self.path.display());
        let payload = tokio::fs::read_to_string(&self.path).await?;
        let schema = Schema::from_json(&payload)?;

        Ok(LoadedSchema {
            db_type: schema.db_type.clone(),
            schema,
            origin: self.path.display().to_string(),
        })
    }
}
