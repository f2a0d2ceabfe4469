//! 字段目录 API 处理器

use axum::Json;

use crate::{
    dto::ApiResponse,
    platform::{PlatformFields, field_catalog},
};

/// GET /api/fields
pub async fn list_fields() -> Json<ApiResponse<Vec<PlatformFields>>> {
    Json(ApiResponse::success(field_catalog()))
}
