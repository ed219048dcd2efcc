use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde_json::{Value, json};
use stresslens_ai::JournalAnalyzer;
use stresslens_core::{JournalInput, PredictResponse};
use tracing::instrument;

use crate::error::ApiError;

pub(crate) fn create_router() -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/predict", post(predict))
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Stress-burnout detector API is running" }))
}

/// Liveness only; does not touch the model.
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[instrument(skip_all)]
async fn predict(
    Extension(analyzer): Extension<Arc<JournalAnalyzer>>,
    payload: Result<Json<JournalInput>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let Json(input) = payload?;
    // Tokenization and the forward pass are CPU-bound.
    let response = tokio::task::spawn_blocking(move || analyzer.analyze(&input.text)).await??;
    Ok(Json(response))
}
