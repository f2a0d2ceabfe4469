//! HTTP 请求处理器
//!
//! 每个子模块对应一组控制面 API。

pub mod comments;
pub mod config;
pub mod fields;
pub mod health;
pub mod history;
pub mod rules;
