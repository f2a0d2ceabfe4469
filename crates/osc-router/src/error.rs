//! OSC 路由器错误类型定义
//!
//! `RouterError` 用于路由与发送链路，`ApiError` 用于控制面 HTTP 接口。

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rule_engine::RuleError;
use serde_json::json;

/// 路由与发送错误
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    #[error("无效的 OSC 端点: {0}")]
    InvalidEndpoint(String),

    #[error("OSC 编码失败: {0}")]
    Encode(String),

    #[error("OSC 解码失败: {0}")]
    Decode(String),

    #[error("无法解析目标地址: {0}")]
    AddressResolution(String),

    #[error("无效的消息格式: {0}")]
    InvalidFormat(String),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON 处理错误: {0}")]
    Json(#[from] serde_json::Error),
}

/// 路由层 Result 类型别名
pub type Result<T> = std::result::Result<T, RouterError>;

/// 控制面 API 错误
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("参数验证失败: {0}")]
    Validation(String),

    #[error("请求体无效: {0}")]
    InvalidJson(String),

    #[error("规则不存在: {0}")]
    RuleNotFound(String),

    #[error("内部错误: {0}")]
    Internal(String),
}

impl ApiError {
    /// 返回对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidJson(_) => StatusCode::BAD_REQUEST,
            Self::RuleNotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 返回错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidJson(_) => "INVALID_JSON",
            Self::RuleNotFound(_) => "RULE_NOT_FOUND",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 内部错误只返回通用提示，详细信息仅记录日志
        let message = match &self {
            Self::Internal(e) => {
                tracing::error!(error = %e, "内部错误");
                "服务内部错误，请稍后重试".to_string()
            }
            other => other.to_string(),
        };

        let body = json!({
            "success": false,
            "code": self.error_code(),
            "message": message,
            "data": serde_json::Value::Null
        });

        (status, axum::Json(body)).into_response()
    }
}

/// 从 validator 错误转换
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

/// 从 axum JSON 提取失败转换
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidJson(rejection.body_text())
    }
}

/// 从规则引擎错误转换
impl From<RuleError> for ApiError {
    fn from(err: RuleError) -> Self {
        match err {
            RuleError::RuleNotFound(id) => Self::RuleNotFound(id),
            RuleError::ValidationError(msg) => Self::Validation(msg),
            RuleError::ParseError(msg) => Self::InvalidJson(msg),
            other => Self::Internal(other.to_string()),
        }
    }
}

/// 从路由错误转换
impl From<RouterError> for ApiError {
    fn from(err: RouterError) -> Self {
        match err {
            RouterError::InvalidEndpoint(_) | RouterError::InvalidFormat(_) => {
                Self::Validation(err.to_string())
            }
            other => Self::Internal(other.to_string()),
        }
    }
}
