use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::assistant::{AssistantError, AssistantStatus, QueryFeedback, QueryHistoryEntry};
use crate::builder::SqlOutcome;
use crate::language::Language;
use crate::schema::Schema;
use crate::template::{bind_rows, Row, TemplateError, Variable};
use crate::web::state::AppState;

// Translation types

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    /// The statement, or the guard message as an SQL comment.
    pub text: String,
    pub outcome: SqlOutcome,
    pub language: Language,
    pub cached: bool,
}

#[derive(Debug, Deserialize)]
pub struct BindRequest {
    pub query: String,
    pub rows: Vec<Row>,
    pub variables: Vec<Variable>,
    #[serde(default)]
    pub minify: bool,
}

#[derive(Debug, Serialize)]
pub struct BindResponse {
    pub sql: String,
}

#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub matched: bool,
}

// System status

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: String,
    pub uptime_seconds: i64,
    pub assistant: AssistantStatus,
}

fn assistant_error(err: AssistantError) -> (StatusCode, String) {
    match err {
        AssistantError::NotInitialized => (StatusCode::CONFLICT, err.to_string()),
        AssistantError::Initialization(_) => (StatusCode::BAD_REQUEST, err.to_string()),
    }
}

fn join_error(err: tokio::task::JoinError) -> (StatusCode, String) {
    error!("Assistant task failed: {}", err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Assistant task failed".to_string(),
    )
}

// API Implementations

pub async fn generate(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, (StatusCode, String)> {
    let prompt = payload.prompt.trim().to_string();
    if prompt.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Prompt must not be empty".to_string()));
    }
    debug!("Generate: {}", prompt);

    let state = Arc::clone(&app_state);
    let generation = tokio::task::spawn_blocking(move || state.assistant.generate(&prompt))
        .await
        .map_err(join_error)?
        .map_err(assistant_error)?;

    Ok(Json(GenerateResponse {
        text: generation.outcome.to_text(),
        outcome: generation.outcome,
        language: generation.language,
        cached: generation.cached,
    }))
}

/// Replaces the loaded schema with the raw ingestion payload in the body.
pub async fn load_schema(
    State(app_state): State<Arc<AppState>>,
    body: String,
) -> Result<Json<AssistantStatus>, (StatusCode, String)> {
    // init waits on the assistant's write lock
    let state = Arc::clone(&app_state);
    let status = tokio::task::spawn_blocking(move || -> Result<AssistantStatus, AssistantError> {
        state.assistant.init(&body)?;
        Ok(state.assistant.status())
    })
    .await
    .map_err(join_error)?
    .map_err(assistant_error)?;

    info!("Schema loaded over HTTP");
    Ok(Json(status))
}

pub async fn get_schema(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Schema>, (StatusCode, String)> {
    app_state
        .assistant
        .schema()
        .map(Json)
        .ok_or_else(|| assistant_error(AssistantError::NotInitialized))
}

pub async fn reset(
    State(app_state): State<Arc<AppState>>,
) -> Result<StatusCode, (StatusCode, String)> {
    let state = Arc::clone(&app_state);
    tokio::task::spawn_blocking(move || state.assistant.reset())
        .await
        .map_err(join_error)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn feedback(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<QueryFeedback>,
) -> Result<Json<FeedbackResponse>, (StatusCode, String)> {
    let state = Arc::clone(&app_state);
    let matched = tokio::task::spawn_blocking(move || state.assistant.record_feedback(&payload))
        .await
        .map_err(join_error)?;
    Ok(Json(FeedbackResponse { matched }))
}

pub async fn history(State(app_state): State<Arc<AppState>>) -> Json<Vec<QueryHistoryEntry>> {
    Json(app_state.assistant.history())
}

pub async fn bind(
    Json(payload): Json<BindRequest>,
) -> Result<Json<BindResponse>, (StatusCode, String)> {
    let sql = bind_rows(&payload.query, &payload.rows, &payload.variables, payload.minify)
        .map_err(|e: TemplateError| (StatusCode::BAD_REQUEST, e.to_string()))?;
    Ok(Json(BindResponse { sql }))
}

pub async fn system_status(State(app_state): State<Arc<AppState>>) -> Json<SystemStatus> {
    let now = chrono::Utc::now();
    let uptime = now.signed_duration_since(app_state.startup_time).num_seconds();

    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: uptime,
        assistant: app_state.assistant.status(),
    })
}
