//! 存活探针

use axum::{Json, extract::State};

use crate::{
    dto::{ApiResponse, HealthResponse},
    state::AppState,
};

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::success(HealthResponse {
        status: "ok",
        service: "osc-router",
        rules_count: state.store.len(),
        osc_enabled: state.settings.current().enabled,
    }))
}
