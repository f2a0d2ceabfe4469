//! 测试辅助工具模块
//!
//! 提供控制面 API 客户端与本地 OSC 接收端。

mod api_client;
mod osc_receiver;

pub use api_client::*;
pub use osc_receiver::*;
