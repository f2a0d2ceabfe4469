//! OSC 路由器
//!
//! 接收直播平台的评论/礼物事件，经规则引擎筛选与字段投影后，
//! 以 OSC 消息发送到指定端点。
//!
//! ## 模块结构
//!
//! - `platform`: 平台事件归类与归一化、字段目录
//! - `osc`: OSC 编解码与 UDP 发送
//! - `dispatcher`: 单条消息的评估与发送流程
//! - `history`: 处理历史环形缓冲
//! - `settings`: 可在运行时修改并持久化的发送设置
//! - `dto` / `handlers` / `routes` / `state`: 控制面 HTTP 接口
//! - `error`: 错误类型定义

pub mod dispatcher;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod history;
pub mod osc;
pub mod platform;
pub mod routes;
pub mod settings;
pub mod state;

pub use dispatcher::{DispatchSummary, Dispatcher};
pub use error::{ApiError, Result, RouterError};
pub use history::{HistoryEntry, MessageHistory};
pub use osc::{MessageFormat, OscPayload, OscTransport, UdpOscTransport};
pub use platform::{CommentEnvelope, NormalizedMessage, PlatformEvent, normalize};
pub use settings::{SettingsStore, TransportSettings};
pub use state::AppState;
