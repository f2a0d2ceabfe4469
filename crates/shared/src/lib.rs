//! 共享库
//!
//! 包含 OSC 路由器各组件共用的配置加载、错误类型与可观测性初始化代码。

pub mod config;
pub mod error;
pub mod observability;

pub use config::AppConfig;
pub use error::{Result, SharedError};
