//! 规则集处理器
//!
//! 按存储顺序评估全部规则，收集匹配规则及其动作，并推导是否继续默认路由。
//! 不提前退出：每条规则都可能贡献独立动作，blockDefault 需要看到全部匹配。

use crate::compiler::CompiledRule;
use crate::executor::RuleExecutor;
use crate::models::RuleSetResult;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// 规则集处理器，持有一次评估所用的规则快照
pub struct RuleSetProcessor {
    rules: Arc<Vec<CompiledRule>>,
    executor: RuleExecutor,
}

impl RuleSetProcessor {
    pub fn new(rules: Arc<Vec<CompiledRule>>) -> Self {
        Self {
            rules,
            executor: RuleExecutor::new(),
        }
    }

    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    /// 评估一条消息
    pub fn process(&self, message: &Value) -> RuleSetResult {
        let start = Instant::now();
        let mut matched_rules = Vec::new();
        let mut actions = Vec::new();

        for rule in self.rules.iter() {
            if self.executor.evaluate(rule, message) {
                metrics::counter!("rule_matches_total", "rule_id" => rule.id().to_string())
                    .increment(1);
                actions.extend(rule.definition.actions.iter().cloned());
                matched_rules.push(rule.definition.clone());
            }
        }

        let should_process =
            matched_rules.is_empty() || matched_rules.iter().any(|r| !r.block_default);

        metrics::counter!("rule_evaluations_total").increment(1);
        metrics::histogram!("rule_evaluation_duration_seconds")
            .record(start.elapsed().as_secs_f64());
        debug!(
            rules = self.rules.len(),
            matched = matched_rules.len(),
            actions = actions.len(),
            should_process,
            "规则集评估完成"
        );

        RuleSetResult {
            matched_rules,
            actions,
            should_process,
        }
    }
}
