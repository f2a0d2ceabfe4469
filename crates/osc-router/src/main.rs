//! OSC 路由器服务入口

use std::sync::Arc;

use osc_router::{
    AppState, MessageHistory, SettingsStore, TransportSettings, UdpOscTransport, routes,
};
use osc_shared::{config::AppConfig, observability};
use rule_engine::{FileRuleRepository, RuleStore};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load("osc-router")?;
    let _guard = observability::init(&config.service_name, &config.observability).await?;

    info!(
        environment = %config.environment,
        "Starting osc-router on {}",
        config.server_addr()
    );

    // 持久化的发送设置优先于配置文件
    let settings = Arc::new(
        SettingsStore::load_or(
            &config.storage.settings_path,
            TransportSettings::from_config(&config.osc),
        )
        .await,
    );
    let current = settings.current();
    info!(
        osc_target = %current.target(),
        format = %current.message_format,
        enabled = current.enabled,
        "OSC 发送设置"
    );
    let transport = Arc::new(UdpOscTransport::new(current.target()));

    let repository = Arc::new(FileRuleRepository::new(&config.storage.rules_path));
    let store = RuleStore::new(repository);
    let loaded = store.reload().await;
    info!(rules = loaded, path = %config.storage.rules_path.display(), "规则已加载");

    let history = Arc::new(MessageHistory::new(config.history.capacity));
    let state = AppState::new(store, transport, settings, history);
    let app = routes::app(state);

    let listener = TcpListener::bind(config.server_addr()).await?;
    info!("Listening on {}", config.server_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");

    Ok(())
}

/// 监听关闭信号
///
/// 收到 Ctrl+C 或 SIGTERM 后返回，触发 axum 的优雅关闭流程。
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "注册 Ctrl+C 处理器失败");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "注册 SIGTERM 处理器失败");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown..."),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown..."),
    }
}
