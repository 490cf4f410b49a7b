use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;

use crate::metrics::AdmissionMetrics;
use crate::response::{HealthResponse, MetricsResponse};

/// State for the unthrottled service endpoints
#[derive(Clone)]
pub struct AppState {
    pub strategy: String,
    pub limit: u64,
    pub metrics: Arc<AdmissionMetrics>,
}

/// Rate limited landing endpoint
pub async fn root() -> &'static str {
    "Success"
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse::healthy(&state.strategy))
}

/// Admission counters since startup
pub async fn metrics_snapshot(State(state): State<AppState>) -> impl IntoResponse {
    Json(MetricsResponse {
        strategy: state.strategy.clone(),
        limit: state.limit,
        metrics: state.metrics.snapshot(),
    })
}
