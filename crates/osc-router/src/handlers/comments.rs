//! 评论推送 API 处理器

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use tracing::debug;

use crate::{
    dispatcher::DispatchSummary,
    dto::{ApiResponse, CommentBatch},
    error::ApiError,
    state::AppState,
};

/// 批量推送评论，按顺序逐条分发
///
/// POST /api/comments
pub async fn ingest_comments(
    State(state): State<AppState>,
    payload: Result<Json<CommentBatch>, JsonRejection>,
) -> Result<Json<ApiResponse<Vec<DispatchSummary>>>, ApiError> {
    let Json(batch) = payload?;
    let envelopes = batch.into_envelopes();
    debug!(count = envelopes.len(), "收到评论批次");

    let summaries = state.dispatcher.dispatch_batch(&envelopes).await;
    Ok(Json(ApiResponse::success(summaries)))
}
