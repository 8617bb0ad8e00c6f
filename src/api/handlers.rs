use crate::api::AppState;
use crate::error::Result;
use crate::metrics::{PREDICTIONS_TOTAL, PREDICTION_BATCH_SIZE, PREDICTION_FALLBACKS_TOTAL};
use crate::models::PredictionResult;
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "ready".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model: state.engine.model_kind().to_string(),
        artifact_version: state.engine.artifact_version().to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    }))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub model: String,
    pub artifact_version: String,
    pub uptime_seconds: u64,
}

/// Classify a single comment
pub async fn predict(
    State(state): State<AppState>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<PredictionResult>> {
    request.validate()?;

    let mut result = state.engine.predict(&request.comment)?;
    if let Some(id) = request.comment_id {
        result = result.with_comment_id(id);
    }

    record_prediction(&result);

    Ok(Json(result))
}

#[derive(Debug, Deserialize, Validate)]
pub struct PredictRequest {
    #[validate(length(max = 10000))]
    pub comment: String,
    pub comment_id: Option<String>,
}

/// Classify a batch of comments in one call
///
/// The response is a bare array in the same order as the request.
pub async fn batch_predict(
    State(state): State<AppState>,
    Json(request): Json<BatchPredictRequest>,
) -> Result<Json<Vec<PredictionResult>>> {
    request.validate()?;

    PREDICTION_BATCH_SIZE.observe(request.comments.len() as f64);

    let results = state.engine.predict_batch(&request.comments)?;
    for result in &results {
        record_prediction(result);
    }

    Ok(Json(results))
}

#[derive(Debug, Deserialize, Validate)]
pub struct BatchPredictRequest {
    #[validate(length(min = 1, max = 1024))]
    pub comments: Vec<String>,
}

fn record_prediction(result: &PredictionResult) {
    PREDICTIONS_TOTAL
        .with_label_values(&[&result.label.to_string()])
        .inc();
    if result.fallback {
        PREDICTION_FALLBACKS_TOTAL.inc();
    }
}

/// Prometheus metrics endpoint
///
/// Returns metrics in Prometheus text exposition format
pub async fn metrics() -> (StatusCode, String) {
    let metrics = crate::metrics::gather_metrics();
    (StatusCode::OK, metrics)
}
