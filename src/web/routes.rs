//! HTTP route handlers for the invocation trigger.
//!
//! All business logic is delegated to `crate::service`.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tracing::info;

use crate::service;
use crate::AppState;

/// Build the API router with all endpoints.
pub fn api_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/submit", post(run_submission))
        .route("/config", get(get_config))
        .route("/health", get(health))
        .layer(Extension(state))
}

/// Trigger one batch run. 200 on full success, 500 on any failure,
/// 409 when a batch is already in flight.
async fn run_submission(Extension(state): Extension<Arc<AppState>>) -> impl IntoResponse {
    info!("Submission batch triggered via web API");

    match service::run_batch_logic(&state).await {
        Ok(summary) => {
            let status = if summary.succeeded {
                StatusCode::OK
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            (status, Json(summary)).into_response()
        }
        Err(msg) => (
            StatusCode::CONFLICT,
            Json(serde_json::json!({ "error": msg })),
        )
            .into_response(),
    }
}

async fn get_config(Extension(state): Extension<Arc<AppState>>) -> impl IntoResponse {
    let config = state.config.read().await.clone();
    Json(config)
}

async fn health() -> impl IntoResponse {
    StatusCode::OK
}
