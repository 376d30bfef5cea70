use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};

use nl_sql::assistant::SqlAssistant;
use nl_sql::config::{AppConfig, CliArgs};
use nl_sql::source::SourceManager;
use nl_sql::util::logging::init_tracing;
use nl_sql::web::{self, state::AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args = CliArgs::parse();

    // Initialize logging
    init_tracing(args.log_json);

    // Load configuration
    let config = match AppConfig::new(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let assistant = SqlAssistant::new(config.engine.clone());

    info!("Initializing schema source with backend: {}", config.schema.backend);
    let sources = SourceManager::new(&config.schema)?;
    match sources.load().await {
        Ok(Some(loaded)) => {
            assistant.init_with_schema(loaded.schema, loaded.db_type.as_deref())?;
        }
        Ok(None) => info!("No schema configured; POST one to /api/schema"),
        Err(e) => {
            error!("Failed to load schema: {}", e);
            return Err(e.into());
        }
    }

    // One-shot translation
    if let Some(prompt) = &args.prompt {
        let outcome = assistant.generate_sql(prompt)?;
        println!("{}", outcome.to_text());
        return Ok(());
    }

    if !assistant.is_initialized() {
        warn!("Starting without a schema");
    }

    let app_state = Arc::new(AppState::with_assistant(config.clone(), assistant));

    info!("Starting nl-sql server on {}:{}", config.web.host, config.web.port);
    match web::run_server(config.web, app_state).await {
        Ok(_) => info!("Server stopped gracefully"),
        Err(e) => {
            error!("Server error: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}
