use crate::metrics::ThrottleMetrics;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub strategy: String,
}

impl HealthResponse {
    pub fn healthy(strategy: &str) -> Self {
        Self {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            strategy: strategy.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    pub strategy: String,
    pub limit: u64,
    #[serde(flatten)]
    pub metrics: ThrottleMetrics,
}
