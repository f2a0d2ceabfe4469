//! 处理历史 API 处理器

use axum::{
    Json,
    extract::{Query, State},
};

use crate::{
    dto::{ApiResponse, HistoryQuery},
    history::HistoryEntry,
    state::AppState,
};

/// 获取处理历史（最新在前）
///
/// GET /api/history?limit=N
pub async fn list_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Json<ApiResponse<Vec<HistoryEntry>>> {
    Json(ApiResponse::success(state.history.list(query.limit)))
}

/// 清空处理历史
///
/// DELETE /api/history
pub async fn clear_history(State(state): State<AppState>) -> Json<ApiResponse<()>> {
    state.history.clear();
    Json(ApiResponse::<()>::success_empty())
}
