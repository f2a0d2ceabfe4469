//! 运行时发送设置
//!
//! 控制面可修改 OSC 目标、消息格式与发送开关。修改会写入设置文件，
//! 下次启动时覆盖配置文件中的 `[osc]` 段。

use std::path::{Path, PathBuf};

use osc_shared::config::OscConfig;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::osc::MessageFormat;

/// OSC 发送设置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportSettings {
    pub host: String,
    pub port: u16,
    pub message_format: MessageFormat,
    pub enabled: bool,
}

impl TransportSettings {
    /// 从配置文件的 `[osc]` 段构建；未知格式回退为 string
    pub fn from_config(config: &OscConfig) -> Self {
        let message_format = config.message_format.parse().unwrap_or_else(|_| {
            warn!(format = %config.message_format, "未知的消息格式，使用 string");
            MessageFormat::String
        });

        Self {
            host: config.host.clone(),
            port: config.port,
            message_format,
            enabled: config.enabled,
        }
    }

    /// 目标地址 `host:port`
    pub fn target(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self::from_config(&OscConfig::default())
    }
}

/// 设置存储
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    current: RwLock<TransportSettings>,
}

impl SettingsStore {
    /// 读取设置文件；文件缺失或损坏时使用 `fallback`
    pub async fn load_or(path: impl Into<PathBuf>, fallback: TransportSettings) -> Self {
        let path = path.into();
        let current = match tokio::fs::read_to_string(&path).await {
            Ok(content) => match serde_json::from_str::<TransportSettings>(&content) {
                Ok(settings) => {
                    info!(path = %path.display(), "已加载持久化的发送设置");
                    settings
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "设置文件损坏，使用配置文件中的设置");
                    fallback
                }
            },
            Err(e) => {
                debug!(path = %path.display(), error = %e, "设置文件不可读，使用配置文件中的设置");
                fallback
            }
        };

        Self {
            path,
            current: RwLock::new(current),
        }
    }

    /// 不落盘的内存设置（测试使用）
    pub fn in_memory(settings: TransportSettings) -> Self {
        Self {
            path: PathBuf::new(),
            current: RwLock::new(settings),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn current(&self) -> TransportSettings {
        self.current.read().clone()
    }

    /// 先持久化，成功后再替换内存中的设置
    pub async fn update(&self, settings: TransportSettings) -> Result<TransportSettings> {
        if !self.path.as_os_str().is_empty() {
            if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await?;
            }
            let content = serde_json::to_string_pretty(&settings)?;
            let tmp_path = self.path.with_extension("json.tmp");
            tokio::fs::write(&tmp_path, content).await?;
            tokio::fs::rename(&tmp_path, &self.path).await?;
        }

        *self.current.write() = settings.clone();
        info!(
            osc_target = %settings.target(),
            format = %settings.message_format,
            enabled = settings.enabled,
            "发送设置已更新"
        );
        Ok(settings)
    }
}
