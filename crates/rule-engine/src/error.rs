//! 规则引擎错误类型
//!
//! 仅用于规则管理（编译、校验、持久化）。规则评估本身从不返回错误，
//! 异常条件一律降级为不匹配。

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("规则解析失败: {0}")]
    ParseError(String),

    #[error("规则校验失败: {0}")]
    ValidationError(String),

    #[error("规则未找到: {0}")]
    RuleNotFound(String),

    #[error("规则持久化失败: {0}")]
    Persistence(#[from] std::io::Error),

    #[error("JSON 序列化错误: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RuleError>;
