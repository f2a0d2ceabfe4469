//! 响应 DTO 定义
//!
//! 所有 REST API 的响应体结构

use serde::Serialize;

/// API 统一响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// 创建成功响应
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            code: "SUCCESS".to_string(),
            message: "操作成功".to_string(),
            data: Some(data),
        }
    }

    /// 创建成功响应（无数据）
    pub fn success_empty() -> ApiResponse<()> {
        ApiResponse {
            success: true,
            code: "SUCCESS".to_string(),
            message: "操作成功".to_string(),
            data: None,
        }
    }
}

/// 健康检查响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub rules_count: usize,
    pub osc_enabled: bool,
}

/// 规则重新加载结果
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReloadResponse {
    pub rules_count: usize,
}

/// 单条规则测试结果
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRuleResponse {
    pub matched: bool,
    /// 参与评估的（归一化后）消息
    pub message: serde_json::Value,
    pub evaluation_trace: Vec<String>,
}
