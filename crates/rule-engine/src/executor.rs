//! 规则执行器
//!
//! 在编译后的匹配器上评估一条消息。评估是纯函数，可选记录评估追踪。

use crate::compiler::{CompiledCondition, CompiledGroup, CompiledRule, RuleMatcher};
use crate::detector::SourceDetector;
use crate::evaluator::ConditionEvaluator;
use crate::models::EvaluationResult;
use crate::operators::LogicalOperator;
use crate::path;
use serde_json::Value;

/// 规则执行器
#[derive(Debug, Default)]
pub struct RuleExecutor {
    /// 是否记录详细评估追踪
    trace_enabled: bool,
}

impl RuleExecutor {
    pub fn new() -> Self {
        Self {
            trace_enabled: false,
        }
    }

    /// 启用评估追踪
    pub fn with_trace(mut self) -> Self {
        self.trace_enabled = true;
        self
    }

    /// 评估规则是否匹配
    pub fn evaluate(&self, rule: &CompiledRule, message: &Value) -> bool {
        self.run(rule, message, &mut Vec::new())
    }

    /// 评估规则并返回带追踪的结果
    pub fn execute(&self, rule: &CompiledRule, message: &Value) -> EvaluationResult {
        let mut result = EvaluationResult::new(rule.id().to_string(), rule.name().to_string());
        let mut trace = Vec::new();

        result.matched = self.run(rule, message, &mut trace);
        result.evaluation_trace = trace;
        result
    }

    fn run(&self, rule: &CompiledRule, message: &Value, trace: &mut Vec<String>) -> bool {
        // 禁用的规则永不匹配，即使没有任何条件
        if !rule.enabled() {
            self.note(trace, || "rule: 已禁用".to_string());
            return false;
        }

        match &rule.matcher {
            RuleMatcher::Grouped { groups, logic } => {
                self.note(trace, || format!("rule: {} 个条件组 ({})", groups.len(), logic));
                self.combine(*logic, groups.iter().enumerate(), |(i, group)| {
                    self.evaluate_group(group, message, trace, &format!("groups[{}]", i))
                })
            }
            RuleMatcher::Legacy { conditions, logic } => {
                if conditions.is_empty() {
                    self.note(trace, || "rule: 无条件，视为匹配".to_string());
                    return true;
                }
                self.note(trace, || format!("rule: {} 个条件 ({})", conditions.len(), logic));
                self.combine(*logic, conditions.iter().enumerate(), |(i, cond)| {
                    self.evaluate_condition(cond, message, trace, &format!("conditions[{}]", i))
                })
            }
        }
    }

    /// 评估条件组：先匹配来源和消息类型，再组合组内条件
    pub fn group_matches(&self, group: &CompiledGroup, message: &Value) -> bool {
        self.evaluate_group(group, message, &mut Vec::new(), "group")
    }

    fn evaluate_group(
        &self,
        group: &CompiledGroup,
        message: &Value,
        trace: &mut Vec<String>,
        path: &str,
    ) -> bool {
        if let Some(source) = &group.source {
            let detected = SourceDetector::detect(message);
            if detected.as_str() != source.as_str() {
                self.note(trace, || {
                    format!("{}: 来源 {} != {}，跳过条件", path, detected, source)
                });
                return false;
            }
        }

        if let Some(message_type) = &group.message_type {
            if !SourceDetector::matches_message_type(message, message_type) {
                self.note(trace, || format!("{}: 消息类型 {} 不匹配", path, message_type));
                return false;
            }
        }

        if group.conditions.is_empty() {
            self.note(trace, || format!("{}: 选择器匹配，无条件", path));
            return true;
        }

        let matched = self.combine(group.logic, group.conditions.iter().enumerate(), |(i, cond)| {
            self.evaluate_condition(cond, message, trace, &format!("{}.conditions[{}]", path, i))
        });
        self.note(trace, || {
            format!("{}: {} => {}", path, group.logic, Self::verdict(matched))
        });
        matched
    }

    fn evaluate_condition(
        &self,
        compiled: &CompiledCondition,
        message: &Value,
        trace: &mut Vec<String>,
        path: &str,
    ) -> bool {
        let cond = &compiled.condition;
        let matched = ConditionEvaluator::apply(
            cond.operator,
            cond.data_type,
            path::get(message, &cond.field),
            &cond.value,
            compiled.pattern.as_ref(),
        );

        self.note(trace, || {
            format!(
                "{}: {} {} {} => {}",
                path,
                cond.field,
                cond.operator,
                cond.value,
                Self::verdict(matched)
            )
        });
        matched
    }

    /// 按逻辑操作符组合子结果（短路求值；评估无副作用，结果与全量求值一致）
    fn combine<I, F>(&self, logic: LogicalOperator, mut items: I, eval: F) -> bool
    where
        I: Iterator,
        F: FnMut(I::Item) -> bool,
    {
        match logic {
            LogicalOperator::Or => items.any(eval),
            _ => items.all(eval),
        }
    }

    fn note<F: FnOnce() -> String>(&self, trace: &mut Vec<String>, line: F) {
        if self.trace_enabled {
            trace.push(line());
        }
    }

    fn verdict(matched: bool) -> &'static str {
        if matched { "MATCHED" } else { "NOT_MATCHED" }
    }
}
