//! 规则管理 API 处理器
//!
//! 规则的增删改查、显式重新加载，以及不触发发送的测试与预览。

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use rule_engine::{RuleCompiler, RuleDefinition, RuleExecutor, RuleSetResult, RuleStoreStats};
use tracing::info;
use validator::Validate;

use crate::{
    dto::{ApiResponse, PreviewRequest, ReloadResponse, RuleRequest, TestRuleRequest, TestRuleResponse},
    error::ApiError,
    platform,
    state::AppState,
};

/// 获取规则列表（存储顺序）
///
/// GET /api/rules
pub async fn list_rules(State(state): State<AppState>) -> Json<ApiResponse<Vec<RuleDefinition>>> {
    Json(ApiResponse::success(state.store.list()))
}

/// 获取规则详情
///
/// GET /api/rules/{id}
pub async fn get_rule(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<RuleDefinition>>, ApiError> {
    let rule = state.store.get(&id).ok_or(ApiError::RuleNotFound(id))?;
    Ok(Json(ApiResponse::success(rule)))
}

/// 创建规则
///
/// POST /api/rules
pub async fn create_rule(
    State(state): State<AppState>,
    payload: Result<Json<RuleRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<RuleDefinition>>, ApiError> {
    let Json(req) = payload?;
    req.validate()?;

    let rule = state.store.add(req.into_definition()).await?;
    info!(rule_id = %rule.id, name = %rule.name, "规则已创建");

    Ok(Json(ApiResponse::success(rule)))
}

/// 更新规则
///
/// PUT /api/rules/{id}
pub async fn update_rule(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<RuleRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<RuleDefinition>>, ApiError> {
    let Json(req) = payload?;
    req.validate()?;

    let rule = state.store.update(&id, req.into_definition()).await?;
    info!(rule_id = %rule.id, "规则已更新");

    Ok(Json(ApiResponse::success(rule)))
}

/// 删除规则
///
/// DELETE /api/rules/{id}
pub async fn delete_rule(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.store.delete(&id).await?;
    info!(rule_id = %id, "规则已删除");

    Ok(Json(ApiResponse::<()>::success_empty()))
}

/// 从持久层重新加载规则
///
/// POST /api/rules/reload
pub async fn reload_rules(State(state): State<AppState>) -> Json<ApiResponse<ReloadResponse>> {
    let rules_count = state.store.reload().await;
    Json(ApiResponse::success(ReloadResponse { rules_count }))
}

/// 规则统计
///
/// GET /api/rules/stats
pub async fn rule_stats(State(state): State<AppState>) -> Json<ApiResponse<RuleStoreStats>> {
    Json(ApiResponse::success(state.store.stats()))
}

/// 用单条规则评估一条消息（不保存、不发送）
///
/// POST /api/rules/test
pub async fn test_rule(
    payload: Result<Json<TestRuleRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<TestRuleResponse>>, ApiError> {
    let Json(req) = payload?;

    let message = platform::normalize_value(req.message);
    let compiled = RuleCompiler::new().compile(req.rule);
    let result = RuleExecutor::new().with_trace().execute(&compiled, &message);

    Ok(Json(ApiResponse::success(TestRuleResponse {
        matched: result.matched,
        message,
        evaluation_trace: result.evaluation_trace,
    })))
}

/// 用当前规则集评估一条消息（不发送）
///
/// POST /api/rules/preview
pub async fn preview_rules(
    State(state): State<AppState>,
    payload: Result<Json<PreviewRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<RuleSetResult>>, ApiError> {
    let Json(req) = payload?;

    let message = platform::normalize_value(req.message);
    Ok(Json(ApiResponse::success(state.dispatcher.preview(&message))))
}
