//! OSC 发送通道
//!
//! UDP 发送是即发即弃的：成功只表示数据报已交给内核。

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use tokio::net::{UdpSocket, lookup_host};
use tracing::{debug, info, warn};

use super::codec::{self, OscPayload};
use crate::error::{Result, RouterError};

/// OSC 发送接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OscTransport: Send + Sync {
    /// 向端点发送单参数消息；端点必须以 `/` 开头
    async fn send(&self, endpoint: &str, payload: &OscPayload) -> Result<()>;

    /// 切换发送目标（`host:port`）
    fn retarget(&self, target: &str);
}

/// 基于 tokio UdpSocket 的 OSC 发送器
///
/// socket 在首次发送时按目标地址族惰性绑定；发送失败时丢弃 socket，
/// 重新绑定后重试一次。
pub struct UdpOscTransport {
    target: RwLock<String>,
    socket: Mutex<Option<Arc<UdpSocket>>>,
}

impl UdpOscTransport {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: RwLock::new(target.into()),
            socket: Mutex::new(None),
        }
    }

    /// 当前发送目标
    pub fn target(&self) -> String {
        self.target.read().clone()
    }

    async fn resolve(&self) -> Result<SocketAddr> {
        let target = self.target();
        let mut addrs = lookup_host(target.as_str())
            .await
            .map_err(|e| RouterError::AddressResolution(format!("{}: {}", target, e)))?;
        addrs.next().ok_or_else(|| RouterError::AddressResolution(target.clone()))
    }

    /// 获取与目标地址族一致的 socket，必要时重新绑定
    async fn socket_for(&self, addr: &SocketAddr) -> Result<Arc<UdpSocket>> {
        let cached = self.socket.lock().clone();
        if let Some(socket) = cached {
            if socket.local_addr()?.is_ipv4() == addr.is_ipv4() {
                return Ok(socket);
            }
        }

        let bind_addr = if addr.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let socket = Arc::new(UdpSocket::bind(bind_addr).await?);
        debug!(local = ?socket.local_addr().ok(), "OSC socket 已绑定");
        *self.socket.lock() = Some(socket.clone());
        Ok(socket)
    }

    fn reset(&self) {
        self.socket.lock().take();
    }
}

#[async_trait]
impl OscTransport for UdpOscTransport {
    async fn send(&self, endpoint: &str, payload: &OscPayload) -> Result<()> {
        let packet = codec::encode_message(endpoint, payload)?;
        let addr = self.resolve().await?;

        let socket = self.socket_for(&addr).await?;
        if let Err(e) = socket.send_to(&packet, addr).await {
            warn!(endpoint, error = %e, "OSC 发送失败，重新绑定后重试");
            self.reset();
            let socket = self.socket_for(&addr).await?;
            socket.send_to(&packet, addr).await?;
        }

        debug!(endpoint, %addr, bytes = packet.len(), "OSC 消息已发送");
        Ok(())
    }

    fn retarget(&self, target: &str) {
        let mut current = self.target.write();
        if *current != target {
            info!(from = %current, to = %target, "OSC 发送目标已切换");
            *current = target.to_string();
            drop(current);
            self.reset();
        }
    }
}
