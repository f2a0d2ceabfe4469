//! 本地 OSC 接收端
//!
//! 绑定回环地址的随机端口，解码收到的每个数据报。

use std::time::Duration;

use anyhow::{Context, Result};
use osc_router::osc::decode_message;
use serde_json::Value;
use tokio::net::UdpSocket;

/// 收到的一条 OSC 消息
#[derive(Debug, Clone)]
pub struct ReceivedMessage {
    pub address: String,
    /// 负载类型标签：`s` 或 `b`
    pub type_tag: char,
    pub body: Value,
}

pub struct OscReceiver {
    socket: UdpSocket,
}

impl OscReceiver {
    pub async fn bind() -> Result<Self> {
        let socket = UdpSocket::bind("127.0.0.1:0").await?;
        Ok(Self { socket })
    }

    pub fn port(&self) -> u16 {
        self.socket.local_addr().map(|a| a.port()).unwrap_or_default()
    }

    /// 等待下一条消息
    pub async fn recv(&self, timeout: Duration) -> Result<ReceivedMessage> {
        let mut buf = vec![0u8; 64 * 1024];
        let (len, _) = tokio::time::timeout(timeout, self.socket.recv_from(&mut buf))
            .await
            .context("等待 OSC 消息超时")??;

        let (address, payload) = decode_message(&buf[..len])?;
        Ok(ReceivedMessage {
            address,
            type_tag: payload.type_tag() as char,
            body: payload.to_json()?,
        })
    }

    /// 按到达顺序接收 `count` 条消息
    pub async fn recv_many(&self, count: usize) -> Result<Vec<ReceivedMessage>> {
        let mut messages = Vec::with_capacity(count);
        for _ in 0..count {
            messages.push(self.recv(Duration::from_secs(2)).await?);
        }
        Ok(messages)
    }

    /// 在给定时间内没有收到任何消息
    pub async fn assert_silent(&self, wait: Duration) {
        let mut buf = [0u8; 1024];
        let received = tokio::time::timeout(wait, self.socket.recv_from(&mut buf)).await;
        assert!(received.is_err(), "不应收到 OSC 消息");
    }
}
