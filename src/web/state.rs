use crate::assistant::SqlAssistant;
use crate::config::AppConfig;

/// Shared application state for the web server
pub struct AppState {
    pub config: AppConfig,
    pub assistant: SqlAssistant,
    pub startup_time: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let assistant = SqlAssistant::new(config.engine.clone());
        Self::with_assistant(config, assistant)
    }

    pub fn with_assistant(config: AppConfig, assistant: SqlAssistant) -> Self {
        Self {
            config,
            assistant,
            startup_time: chrono::Utc::now(),
        }
    }
}
