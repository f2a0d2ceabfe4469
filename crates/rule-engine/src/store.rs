//! 规则存储管理
//!
//! 编译后的规则以有序列表保存在 `ArcSwap` 中：评估方每次取一个完整快照，
//! 变更方在写锁内构造新列表、先持久化再整体替换，评估永远不会看到半更新状态。

use crate::compiler::{CompiledRule, RuleCompiler};
use crate::error::{Result, RuleError};
use crate::models::RuleDefinition;
use crate::processor::RuleSetProcessor;
use crate::repository::RuleRepository;
use arc_swap::ArcSwap;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

/// 规则存储
#[derive(Clone)]
pub struct RuleStore {
    /// 按插入顺序排列的编译后规则
    rules: Arc<ArcSwap<Vec<CompiledRule>>>,
    /// 规则编译器
    compiler: Arc<parking_lot::Mutex<RuleCompiler>>,
    repository: Arc<dyn RuleRepository>,
    /// 串行化所有变更（含重新加载）
    write_lock: Arc<Mutex<()>>,
}

impl RuleStore {
    /// 创建空的规则存储，需调用 [`RuleStore::reload`] 从持久层加载
    pub fn new(repository: Arc<dyn RuleRepository>) -> Self {
        Self {
            rules: Arc::new(ArcSwap::from_pointee(Vec::new())),
            compiler: Arc::new(parking_lot::Mutex::new(RuleCompiler::new())),
            repository,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// 获取当前存储的规则数量
    pub fn len(&self) -> usize {
        self.rules.load().len()
    }

    /// 检查存储是否为空
    pub fn is_empty(&self) -> bool {
        self.rules.load().is_empty()
    }

    /// 从持久层重新加载全部规则
    ///
    /// 读取失败（文件损坏等）时回退为空规则集，不影响服务运行。返回加载的规则数。
    #[instrument(skip(self))]
    pub async fn reload(&self) -> usize {
        let _guard = self.write_lock.lock().await;

        let definitions = match self.repository.load().await {
            Ok(definitions) => definitions,
            Err(e) => {
                warn!(error = %e, "规则加载失败，使用空规则集");
                Vec::new()
            }
        };

        let compiled = self.compile_all(definitions);
        let count = compiled.len();
        self.rules.store(Arc::new(compiled));

        info!("规则已加载: {} 条", count);
        count
    }

    /// 当前规则快照
    pub fn snapshot(&self) -> Arc<Vec<CompiledRule>> {
        self.rules.load_full()
    }

    /// 基于当前快照创建规则集处理器
    pub fn processor(&self) -> RuleSetProcessor {
        RuleSetProcessor::new(self.snapshot())
    }

    /// 获取所有规则定义（按存储顺序）
    pub fn list(&self) -> Vec<RuleDefinition> {
        self.rules
            .load()
            .iter()
            .map(|r| r.definition.clone())
            .collect()
    }

    /// 获取规则
    pub fn get(&self, rule_id: &str) -> Option<RuleDefinition> {
        self.rules
            .load()
            .iter()
            .find(|r| r.id() == rule_id)
            .map(|r| r.definition.clone())
    }

    /// 检查规则是否存在
    pub fn contains(&self, rule_id: &str) -> bool {
        self.rules.load().iter().any(|r| r.id() == rule_id)
    }

    /// 新增规则（追加到末尾）
    ///
    /// 未指定 ID 时按当前毫秒时间戳生成 `rule_<millis>`。
    #[instrument(skip(self, definition), fields(rule_name = %definition.name))]
    pub async fn add(&self, mut definition: RuleDefinition) -> Result<RuleDefinition> {
        RuleCompiler::validate(&definition)?;

        let _guard = self.write_lock.lock().await;
        let current = self.rules.load_full();

        if definition.id.is_empty() {
            definition.id = Self::generate_id(&current);
        } else if current.iter().any(|r| r.id() == definition.id) {
            return Err(RuleError::ValidationError(format!(
                "规则 ID 已存在: {}",
                definition.id
            )));
        }

        let now = Utc::now();
        definition.created_at = Some(now);
        definition.updated_at = Some(now);

        let mut next: Vec<CompiledRule> = current.as_ref().clone();
        next.push(self.compiler.lock().compile(definition.clone()));
        self.persist_and_swap(next).await?;

        info!(rule_id = %definition.id, "规则已新增");
        Ok(definition)
    }

    /// 更新规则（保持原有位置与创建时间）
    #[instrument(skip(self, definition))]
    pub async fn update(&self, rule_id: &str, mut definition: RuleDefinition) -> Result<RuleDefinition> {
        RuleCompiler::validate(&definition)?;

        let _guard = self.write_lock.lock().await;
        let current = self.rules.load_full();

        let Some(index) = current.iter().position(|r| r.id() == rule_id) else {
            warn!("更新不存在的规则: {}", rule_id);
            return Err(RuleError::RuleNotFound(rule_id.to_string()));
        };

        definition.id = rule_id.to_string();
        definition.created_at = current[index].definition.created_at;
        definition.updated_at = Some(Utc::now());

        let mut next: Vec<CompiledRule> = current.as_ref().clone();
        next[index] = self.compiler.lock().compile(definition.clone());
        self.persist_and_swap(next).await?;

        info!(rule_id = %rule_id, "规则已更新");
        Ok(definition)
    }

    /// 删除规则
    #[instrument(skip(self))]
    pub async fn delete(&self, rule_id: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let current = self.rules.load_full();

        if !current.iter().any(|r| r.id() == rule_id) {
            warn!("删除不存在的规则: {}", rule_id);
            return Err(RuleError::RuleNotFound(rule_id.to_string()));
        }

        let next: Vec<CompiledRule> = current
            .iter()
            .filter(|r| r.id() != rule_id)
            .cloned()
            .collect();
        self.persist_and_swap(next).await?;

        info!("规则已删除: {}", rule_id);
        Ok(())
    }

    /// 获取规则统计信息
    pub fn stats(&self) -> RuleStoreStats {
        let rules = self.rules.load();
        RuleStoreStats {
            rules_count: rules.len(),
            enabled_count: rules.iter().filter(|r| r.enabled()).count(),
            blocking_count: rules.iter().filter(|r| r.blocks_default()).count(),
            total_fields: rules.iter().map(|r| r.referenced_fields.len()).sum(),
        }
    }

    fn compile_all(&self, definitions: Vec<RuleDefinition>) -> Vec<CompiledRule> {
        let mut compiler = self.compiler.lock();
        definitions
            .into_iter()
            .map(|definition| compiler.compile(definition))
            .collect()
    }

    /// 先写持久层，成功后才替换内存快照；保存失败时内存状态保持不变
    async fn persist_and_swap(&self, next: Vec<CompiledRule>) -> Result<()> {
        let definitions: Vec<RuleDefinition> =
            next.iter().map(|r| r.definition.clone()).collect();
        self.repository.save(&definitions).await?;
        self.rules.store(Arc::new(next));
        Ok(())
    }

    fn generate_id(current: &[CompiledRule]) -> String {
        let mut millis = Utc::now().timestamp_millis();
        loop {
            let candidate = format!("rule_{}", millis);
            if !current.iter().any(|r| r.id() == candidate) {
                return candidate;
            }
            millis += 1;
        }
    }
}

/// 规则存储统计信息
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleStoreStats {
    /// 规则总数
    pub rules_count: usize,
    /// 启用的规则数
    pub enabled_count: usize,
    /// 会阻止默认路由的规则数
    pub blocking_count: usize,
    /// 所有规则引用的字段总数
    pub total_fields: usize,
}
