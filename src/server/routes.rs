//! Axum route handlers for the SignGPT HTTP server.
//!
//! # Routes
//!
//! - `GET  /`                - `{message, docs, health}`
//! - `GET  /docs`            - Endpoint listing
//! - `GET  /health`          - `{status, message, asl_dataset_size}`
//! - `POST /process-tokens`  - `{words: [..]}` → `{result}`
//! - `GET  /asl-dataset`     - `{total_words, sample_words, description}`
//! - `POST /validate-tokens` - `[..]` → per-token verdicts plus summary

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::error::ApiError;
use crate::dataset::{AslDataset, ValidationReport};
use crate::signgpt::SignGptCrew;
use crate::utilities::config::Settings;

/// Number of vocabulary entries shown by `/asl-dataset`.
pub const SAMPLE_SIZE: usize = 20;

/// Shared application state for the HTTP server.
#[derive(Clone)]
pub struct AppState {
    /// Vocabulary loaded at startup.
    pub dataset: Arc<AslDataset>,
    /// Runtime settings.
    pub settings: Arc<Settings>,
    /// Crew blueprint; each request runs a fresh crew built from it.
    pub crew: Arc<SignGptCrew>,
}

impl AppState {
    pub fn new(dataset: AslDataset, settings: Settings, crew: SignGptCrew) -> Self {
        Self {
            dataset: Arc::new(dataset),
            settings: Arc::new(settings),
            crew: Arc::new(crew),
        }
    }
}

/// Body of `POST /process-tokens`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessTokensRequest {
    /// ASL tokens to process, e.g. `["YOU", "NAME", "WHAT"]`.
    pub words: Vec<String>,
}

/// Response of `POST /process-tokens`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessTokensResponse {
    /// Final text produced by the crew.
    pub result: String,
}

/// Response of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub asl_dataset_size: usize,
}

/// Build the axum router with all routes.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/docs", get(docs_handler))
        .route("/health", get(health_handler))
        .route("/process-tokens", post(process_tokens_handler))
        .route("/asl-dataset", get(asl_dataset_handler))
        .route("/validate-tokens", post(validate_tokens_handler))
        .fallback(not_found_handler)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET / - basic service information.
async fn root_handler() -> Json<Value> {
    Json(serde_json::json!({
        "message": "SignGPT Crew Server is running",
        "docs": "/docs",
        "health": "/health",
    }))
}

/// GET /docs - list the available endpoints.
async fn docs_handler() -> Json<Value> {
    Json(serde_json::json!({
        "title": "SignGPT Crew Server",
        "description": "API server for processing ASL tokens using AI agents",
        "version": crate::VERSION,
        "endpoints": [
            {"method": "GET", "path": "/", "summary": "Basic service information"},
            {"method": "GET", "path": "/health", "summary": "Health check"},
            {"method": "POST", "path": "/process-tokens", "summary": "Process ASL tokens through the SignGPT crew"},
            {"method": "GET", "path": "/asl-dataset", "summary": "Information about the ASL vocabulary"},
            {"method": "POST", "path": "/validate-tokens", "summary": "Validate tokens against the ASL vocabulary"},
        ],
    }))
}

/// GET /health - liveness probe that also reports the credential state.
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let (status, message) = if state.settings.api_key_configured() {
        ("healthy", "Service is running")
    } else {
        ("warning", "Service running but OPENAI_API_KEY not configured")
    };

    Json(HealthResponse {
        status: status.to_string(),
        message: message.to_string(),
        asl_dataset_size: state.dataset.len(),
    })
}

/// POST /process-tokens - run the SignGPT crew on the given tokens and return
/// only the final result.
async fn process_tokens_handler(
    State(state): State<AppState>,
    payload: Result<Json<ProcessTokensRequest>, JsonRejection>,
) -> Result<Json<ProcessTokensResponse>, ApiError> {
    let Json(request) = payload?;

    if !state.settings.api_key_configured() {
        return Err(ApiError::Internal(
            "OPENAI_API_KEY not configured. Please set it in your environment or .env file."
                .to_string(),
        ));
    }

    if request.words.is_empty() {
        return Err(ApiError::BadRequest(
            "Words list cannot be empty".to_string(),
        ));
    }

    tracing::info!("Processing {} ASL tokens", request.words.len());

    let output = state
        .crew
        .kickoff(&request.words, &state.dataset)
        .await
        .map_err(|e| ApiError::Internal(format!("Error processing tokens: {}", e)))?;

    tracing::debug!(
        "Crew finished: {} tasks, {} tokens",
        output.tasks_output.len(),
        output.token_usage.total_tokens
    );

    Ok(Json(ProcessTokensResponse { result: output.raw }))
}

/// GET /asl-dataset - vocabulary size and the first entries.
async fn asl_dataset_handler(State(state): State<AppState>) -> Json<Value> {
    Json(serde_json::json!({
        "total_words": state.dataset.len(),
        "sample_words": state.dataset.sample(SAMPLE_SIZE),
        "description": "Available ASL vocabulary tokens",
    }))
}

/// POST /validate-tokens - check whether each token exists in the vocabulary.
async fn validate_tokens_handler(
    State(state): State<AppState>,
    payload: Result<Json<Vec<String>>, JsonRejection>,
) -> Result<Json<ValidationReport>, ApiError> {
    let Json(tokens) = payload?;
    Ok(Json(state.dataset.validate(&tokens)))
}

/// Fallback for unknown routes.
async fn not_found_handler() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "error": "Not found",
            "detail": "The requested resource was not found",
        })),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
