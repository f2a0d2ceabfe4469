//! 测试环境管理
//!
//! 每个测试独占一个临时数据目录和一个本地 OSC 接收端。

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use osc_router::{
    AppState, MessageHistory, SettingsStore, TransportSettings, UdpOscTransport, routes,
};
use rule_engine::{FileRuleRepository, RuleStore};

use crate::helpers::{ApiClient, OscReceiver};

/// 测试环境配置
#[derive(Debug, Clone)]
pub struct TestEnvConfig {
    /// 处理历史容量
    pub history_capacity: usize,
    /// OSC 负载格式：`string` 或 `binary`
    pub message_format: &'static str,
}

impl Default for TestEnvConfig {
    fn default() -> Self {
        Self {
            history_capacity: 100,
            message_format: "string",
        }
    }
}

/// 测试环境
pub struct TestEnvironment {
    pub api: ApiClient,
    pub receiver: OscReceiver,
    pub store: RuleStore,
    pub history: Arc<MessageHistory>,
    pub data_dir: PathBuf,
}

impl TestEnvironment {
    pub async fn setup() -> Result<Self> {
        Self::setup_with(TestEnvConfig::default()).await
    }

    pub async fn setup_with(config: TestEnvConfig) -> Result<Self> {
        let data_dir = unique_data_dir();
        let receiver = OscReceiver::bind().await?;

        let fallback = TransportSettings {
            host: "127.0.0.1".to_string(),
            port: receiver.port(),
            message_format: config.message_format.parse()?,
            enabled: true,
        };
        let settings = Arc::new(SettingsStore::load_or(data_dir.join("settings.json"), fallback).await);
        let transport = Arc::new(UdpOscTransport::new(settings.current().target()));

        let store = RuleStore::new(Arc::new(FileRuleRepository::new(data_dir.join("rules.json"))));
        store.reload().await;

        let history = Arc::new(MessageHistory::new(config.history_capacity));
        let state = AppState::new(store.clone(), transport, settings, history.clone());

        Ok(Self {
            api: ApiClient::new(routes::app(state)),
            receiver,
            store,
            history,
            data_dir,
        })
    }

    pub fn rules_path(&self) -> PathBuf {
        self.data_dir.join("rules.json")
    }

    pub fn settings_path(&self) -> PathBuf {
        self.data_dir.join("settings.json")
    }

    pub async fn cleanup(&self) -> Result<()> {
        if tokio::fs::try_exists(&self.data_dir).await? {
            tokio::fs::remove_dir_all(&self.data_dir).await?;
        }
        Ok(())
    }
}

fn unique_data_dir() -> PathBuf {
    use std::sync::atomic::{AtomicUsize, Ordering};
    static COUNTER: AtomicUsize = AtomicUsize::new(0);

    std::env::temp_dir().join(format!(
        "osc-router-e2e-{}-{}",
        std::process::id(),
        COUNTER.fetch_add(1, Ordering::Relaxed)
    ))
}
