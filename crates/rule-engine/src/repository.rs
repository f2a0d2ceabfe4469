//! 规则持久化
//!
//! 规则存储只通过 `RuleRepository` 读写持久层；重新加载是显式操作，不做文件监听。

use crate::error::Result;
use crate::models::RuleDefinition;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 规则仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RuleRepository: Send + Sync {
    /// 按存储顺序读取全部规则
    async fn load(&self) -> Result<Vec<RuleDefinition>>;

    /// 整体覆盖保存规则列表
    async fn save(&self, rules: &[RuleDefinition]) -> Result<()>;
}

/// 基于 JSON 文件的规则仓储
///
/// 文件内容为规则数组；文件不存在视为空列表。
#[derive(Debug, Clone)]
pub struct FileRuleRepository {
    path: PathBuf,
}

impl FileRuleRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RuleRepository for FileRuleRepository {
    async fn load(&self) -> Result<Vec<RuleDefinition>> {
        if !tokio::fs::try_exists(&self.path).await? {
            info!(path = %self.path.display(), "规则文件不存在，使用空规则集");
            return Ok(Vec::new());
        }

        let content = tokio::fs::read_to_string(&self.path).await?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let rules: Vec<RuleDefinition> = serde_json::from_str(&content)?;
        debug!(path = %self.path.display(), count = rules.len(), "规则文件已读取");
        Ok(rules)
    }

    async fn save(&self, rules: &[RuleDefinition]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(rules)?;

        // 先写临时文件再重命名，避免写入中断留下半个文件
        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, content).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;

        debug!(path = %self.path.display(), count = rules.len(), "规则文件已保存");
        Ok(())
    }
}

/// 内存规则仓储（测试与临时运行使用）
#[derive(Debug, Default)]
pub struct InMemoryRuleRepository {
    rules: Mutex<Vec<RuleDefinition>>,
}

impl InMemoryRuleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: Vec<RuleDefinition>) -> Self {
        Self {
            rules: Mutex::new(rules),
        }
    }

    /// 当前已保存的规则
    pub fn saved(&self) -> Vec<RuleDefinition> {
        self.rules.lock().clone()
    }
}

#[async_trait]
impl RuleRepository for InMemoryRuleRepository {
    async fn load(&self) -> Result<Vec<RuleDefinition>> {
        Ok(self.rules.lock().clone())
    }

    async fn save(&self, rules: &[RuleDefinition]) -> Result<()> {
        *self.rules.lock() = rules.to_vec();
        Ok(())
    }
}
