//! HTTP surface for the JSON translation orchestrator
//!
//! `POST /translate-multiple` takes `{ data, toLanguages, ... }` and answers
//! 200 when every language succeeded, 207 when some failed, and 500 when none
//! produced a translation. Malformed requests get 400.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    routing::{get, post},
};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use transjson::{Orchestrator, OutcomeStatus, TranslateError, TranslationRequest, TranslationSummary};

const AVAILABLE_ROUTES: [&str; 2] = ["POST /translate-multiple", "GET /health"];

#[derive(Serialize)]
pub struct TranslateResponse {
    pub message: String,
    pub output: Map<String, Value>,
    pub summary: TranslationSummary,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<TranslationSummary>,
}

impl ErrorResponse {
    fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
            suggestions: Vec::new(),
            summary: None,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub uptime_seconds: u64,
    pub backends: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotFoundResponse {
    pub error: String,
    pub available_routes: Vec<&'static str>,
}

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub started: Instant,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            started: Instant::now(),
        }
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/translate-multiple", post(translate_multiple))
        .route("/health", get(health))
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn bad_request(error: &TranslateError) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new(error.to_string())),
    )
}

async fn translate_multiple(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<TranslateResponse>), ApiError> {
    let Json(body) = body.map_err(|rejection| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(format!(
                "Invalid JSON body: {}",
                rejection.body_text()
            ))),
        )
    })?;

    let request = TranslationRequest::from_value(&body).map_err(|e| bad_request(&e))?;
    info!(
        "Translating {} keys into {:?}",
        request.data.len(),
        request.to_languages
    );

    let outcome = state.orchestrator.translate(&request).await.map_err(|e| {
        if e.is_client_error() {
            bad_request(&e)
        } else {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    details: Some(e.to_string()),
                    ..ErrorResponse::new("Translation failed")
                }),
            )
        }
    })?;

    let failed = &outcome.summary.failed_languages;
    match outcome.status() {
        OutcomeStatus::Complete => Ok((
            StatusCode::OK,
            Json(TranslateResponse {
                message: "Translations completed successfully.".to_string(),
                output: outcome.output,
                summary: outcome.summary,
            }),
        )),
        OutcomeStatus::Partial => {
            warn!("Translation partially failed for {:?}", failed);
            Ok((
                StatusCode::MULTI_STATUS,
                Json(TranslateResponse {
                    message: format!(
                        "Translations completed with failures for: {}.",
                        failed.join(", ")
                    ),
                    output: outcome.output,
                    summary: outcome.summary,
                }),
            ))
        }
        OutcomeStatus::Failed => {
            warn!("Translation failed for every language: {:?}", failed);
            let suggestions = outcome
                .summary
                .suggestions(&state.orchestrator.available_modules());
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Translation failed for all requested languages.".to_string(),
                    details: Some(format!("Failed languages: {}", failed.join(", "))),
                    suggestions,
                    summary: Some(outcome.summary),
                }),
            ))
        }
    }
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime_seconds: state.started.elapsed().as_secs(),
        backends: state
            .orchestrator
            .available_modules()
            .into_iter()
            .map(str::to_string)
            .collect(),
    })
}

async fn not_found() -> (StatusCode, Json<NotFoundResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(NotFoundResponse {
            error: "Not found".to_string(),
            available_routes: AVAILABLE_ROUTES.to_vec(),
        }),
    )
}

// Integration tests (only available during testing)
#[cfg(test)]
mod integration_tests;

async fn method_not_allowed() -> (StatusCode, Json<NotFoundResponse>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(NotFoundResponse {
            error: "Method not allowed".to_string(),
            available_routes: AVAILABLE_ROUTES.to_vec(),
        }),
    )
}
