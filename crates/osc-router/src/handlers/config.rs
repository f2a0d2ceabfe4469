//! 发送设置 API 处理器

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use validator::Validate;

use crate::{
    dto::{ApiResponse, UpdateConfigRequest},
    error::ApiError,
    settings::TransportSettings,
    state::AppState,
};

/// 获取当前发送设置
///
/// GET /api/config
pub async fn get_config(State(state): State<AppState>) -> Json<ApiResponse<TransportSettings>> {
    Json(ApiResponse::success(state.settings.current()))
}

/// 更新发送设置，持久化后切换发送目标
///
/// PUT /api/config
pub async fn update_config(
    State(state): State<AppState>,
    payload: Result<Json<UpdateConfigRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<TransportSettings>>, ApiError> {
    let Json(req) = payload?;
    req.validate()?;

    let mut next = state.settings.current();
    if let Some(host) = req.host {
        next.host = host.trim().to_string();
    }
    if let Some(port) = req.port {
        next.port = port;
    }
    if let Some(format) = req.message_format {
        next.message_format = format;
    }
    if let Some(enabled) = req.enabled {
        next.enabled = enabled;
    }

    let saved = state.settings.update(next).await?;
    state.transport.retarget(&saved.target());

    Ok(Json(ApiResponse::success(saved)))
}
