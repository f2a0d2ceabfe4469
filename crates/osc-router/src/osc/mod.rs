//! OSC 输出
//!
//! - `codec`: OSC 1.0 单参数消息编解码
//! - `transport`: UDP 发送通道

pub mod codec;
pub mod transport;

pub use codec::{MessageFormat, OscPayload, decode_message, encode_message};
pub use transport::{OscTransport, UdpOscTransport};

#[cfg(test)]
pub use transport::MockOscTransport;
