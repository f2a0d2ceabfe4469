//! Prometheus 指标模块
//!
//! 基于 metrics crate 和 metrics-exporter-prometheus 实现指标收集与导出。
//! 指标通过独立的 HTTP 端口暴露，供 Prometheus 抓取。

use axum::{Router, routing::get};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::error::{Result, SharedError};

/// Metrics 资源守卫
pub struct MetricsHandle {
    server_handle: tokio::task::JoinHandle<()>,
}

impl MetricsHandle {
    /// 停止指标 HTTP 服务
    pub fn shutdown(self) {
        self.server_handle.abort();
    }
}

/// 初始化 Prometheus 指标导出
///
/// 启动一个独立的 HTTP 服务器在指定端口暴露 `/metrics` 与 `/health` 端点。
pub async fn init(service_name: &str, port: u16) -> Result<MetricsHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| SharedError::Metrics(e.to_string()))?;

    describe_metrics();
    metrics::counter!("service_starts_total", "service" => service_name.to_string()).increment(1);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let server_handle = start_metrics_server(addr, handle).await?;

    Ok(MetricsHandle { server_handle })
}

/// 注册指标描述，出现在 /metrics 的 HELP 注释中
pub fn describe_metrics() {
    metrics::describe_counter!(
        "messages_received_total",
        "Total number of comment messages received, by platform"
    );
    metrics::describe_counter!("rule_evaluations_total", "Total number of rule-set evaluations");
    metrics::describe_counter!("rule_matches_total", "Total number of rule matches, by rule id");
    metrics::describe_counter!("osc_sends_total", "Total number of OSC sends, by result");
    metrics::describe_histogram!(
        "rule_evaluation_duration_seconds",
        "Rule-set evaluation duration in seconds"
    );
}

/// 启动指标 HTTP 服务器
async fn start_metrics_server(
    addr: SocketAddr,
    handle: PrometheusHandle,
) -> Result<tokio::task::JoinHandle<()>> {
    let app = Router::new()
        .route("/metrics", get(move || std::future::ready(handle.render())))
        .route("/health", get(|| async { "OK" }));

    let listener = TcpListener::bind(addr).await?;
    info!("Metrics server listening on {}", addr);

    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Metrics server error: {}", e);
        }
    });

    Ok(server_handle)
}

/// 记录一次 OSC 发送结果
#[inline]
pub fn record_osc_send(success: bool) {
    let result = if success { "ok" } else { "error" };
    metrics::counter!("osc_sends_total", "result" => result).increment(1);
}

/// 记录一条收到的评论消息
#[inline]
pub fn record_message_received(platform: &str) {
    metrics::counter!("messages_received_total", "platform" => platform.to_string()).increment(1);
}
