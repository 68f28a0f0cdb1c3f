use axum::{Router, response::Json as ResponseJson, routing::get};
use serde::Serialize;
use ts_rs::TS;
use utils::response::ApiResponse;

use crate::DeploymentImpl;

#[derive(Debug, Serialize, TS)]
pub struct HealthStatus {
    pub status: String,
}

/// GET /api/health
pub async fn health_check() -> ResponseJson<ApiResponse<HealthStatus>> {
    ResponseJson(ApiResponse::success(HealthStatus {
        status: "ok".to_string(),
    }))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().route("/health", get(health_check))
}
