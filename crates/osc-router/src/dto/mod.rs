//! 数据传输对象
//!
//! 控制面 REST API 的请求与响应结构，统一使用 camelCase。

pub mod request;
pub mod response;

pub use request::{
    CommentBatch, HistoryQuery, PreviewRequest, RuleRequest, TestRuleRequest, UpdateConfigRequest,
};
pub use response::{ApiResponse, HealthResponse, ReloadResponse, TestRuleResponse};
