//! OSC 路由服务端到端测试
//!
//! 在进程内启动完整服务（控制面路由 + 真实 UDP 发送器），
//! 由本地 UDP 接收端解码收到的 OSC 包进行断言。测试覆盖：
//! - 默认路由
//! - 规则路由、字段投影与发送顺序
//! - 单端点发送失败不影响后续发送
//! - 处理历史容量
//! - 发送设置的切换与持久化

pub mod data;
pub mod helpers;
pub mod setup;
pub mod suites;

pub use setup::TestEnvironment;
