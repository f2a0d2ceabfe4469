//! 规则编译器
//!
//! 将 `RuleDefinition` 一次性解析为带标签的匹配器：条件组格式或旧的平铺条件格式，
//! 同时确定默认组合方式并预编译正则，评估时不再做形态判断。

use crate::error::{Result, RuleError};
use crate::evaluator::ConditionEvaluator;
use crate::models::{ActionType, Condition, ConditionGroup, RuleDefinition};
use crate::operators::{LogicalOperator, Operator};
use fancy_regex::Regex;
use std::collections::BTreeSet;
use tracing::warn;

/// 编译后的条件
#[derive(Debug, Clone)]
pub struct CompiledCondition {
    pub condition: Condition,
    /// regex 操作符的预编译模式；模式无效时为 `None`
    pub pattern: Option<Regex>,
}

/// 编译后的条件组
#[derive(Debug, Clone)]
pub struct CompiledGroup {
    pub source: Option<String>,
    pub message_type: Option<String>,
    pub conditions: Vec<CompiledCondition>,
    pub logic: LogicalOperator,
}

/// 规则匹配器
#[derive(Debug, Clone)]
pub enum RuleMatcher {
    /// 条件组格式，组间默认 OR
    Grouped {
        groups: Vec<CompiledGroup>,
        logic: LogicalOperator,
    },
    /// 旧格式平铺条件，默认 AND
    Legacy {
        conditions: Vec<CompiledCondition>,
        logic: LogicalOperator,
    },
}

/// 编译后的规则
#[derive(Debug, Clone)]
pub struct CompiledRule {
    /// 原始规则
    pub definition: RuleDefinition,
    pub matcher: RuleMatcher,
    /// 规则中引用的字段路径
    pub referenced_fields: BTreeSet<String>,
    /// 编译版本号
    pub compile_version: u64,
}

impl CompiledRule {
    pub fn id(&self) -> &str {
        &self.definition.id
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn enabled(&self) -> bool {
        self.definition.enabled
    }

    pub fn blocks_default(&self) -> bool {
        self.definition.block_default
    }
}

/// 规则编译器
#[derive(Debug, Default)]
pub struct RuleCompiler {
    compile_version: u64,
}

impl RuleCompiler {
    pub fn new() -> Self {
        Self { compile_version: 0 }
    }

    /// 从 JSON 字符串编译规则
    pub fn compile_from_json(&mut self, json: &str) -> Result<CompiledRule> {
        let definition: RuleDefinition = serde_json::from_str(json)?;
        Ok(self.compile(definition))
    }

    /// 编译规则
    ///
    /// 编译不会拒绝规则：无效正则仅记录警告，对应条件永远不匹配。
    pub fn compile(&mut self, definition: RuleDefinition) -> CompiledRule {
        let matcher = if definition.condition_groups.is_empty() {
            RuleMatcher::Legacy {
                conditions: self.compile_conditions(&definition.id, &definition.conditions),
                logic: Self::or_if_declared(definition.condition_logic),
            }
        } else {
            RuleMatcher::Grouped {
                groups: definition
                    .condition_groups
                    .iter()
                    .map(|group| self.compile_group(&definition.id, group))
                    .collect(),
                logic: Self::and_if_declared(definition.group_logic),
            }
        };

        let referenced_fields = Self::extract_fields(&definition);
        self.compile_version += 1;

        CompiledRule {
            definition,
            matcher,
            referenced_fields,
            compile_version: self.compile_version,
        }
    }

    /// 校验规则结构（控制面新增/更新规则时调用）
    pub fn validate(definition: &RuleDefinition) -> Result<()> {
        if definition.name.trim().is_empty() {
            return Err(RuleError::ValidationError("规则名称不能为空".to_string()));
        }

        for (i, action) in definition.actions.iter().enumerate() {
            if action.action_type != ActionType::RouteToEndpoint {
                return Err(RuleError::ValidationError(format!(
                    "动作 actions[{}] 的类型不受支持",
                    i
                )));
            }
            if !action.endpoint.starts_with('/') {
                return Err(RuleError::ValidationError(format!(
                    "动作 actions[{}] 的端点 '{}' 必须以 / 开头",
                    i, action.endpoint
                )));
            }
        }

        let all_conditions = definition
            .conditions
            .iter()
            .chain(definition.condition_groups.iter().flat_map(|g| g.conditions.iter()));

        for cond in all_conditions {
            if cond.field.trim().is_empty() {
                return Err(RuleError::ValidationError("条件字段不能为空".to_string()));
            }
        }

        Ok(())
    }

    fn compile_group(&self, rule_id: &str, group: &ConditionGroup) -> CompiledGroup {
        CompiledGroup {
            source: group.source.clone().filter(|s| !s.is_empty()),
            message_type: group.message_type.clone().filter(|s| !s.is_empty()),
            conditions: self.compile_conditions(rule_id, &group.conditions),
            logic: Self::or_if_declared(group.condition_logic),
        }
    }

    fn compile_conditions(&self, rule_id: &str, conditions: &[Condition]) -> Vec<CompiledCondition> {
        conditions
            .iter()
            .map(|condition| {
                let pattern = match condition.operator {
                    Operator::Regex => {
                        let pattern =
                            ConditionEvaluator::build_pattern(&condition.value, condition.data_type);
                        if pattern.is_none() {
                            warn!(
                                rule_id = %rule_id,
                                field = %condition.field,
                                "规则包含无效的正则表达式，该条件永远不匹配"
                            );
                        }
                        pattern
                    }
                    _ => None,
                };

                CompiledCondition {
                    condition: condition.clone(),
                    pattern,
                }
            })
            .collect()
    }

    /// 条件组合：只有显式声明 OR 时才是 OR
    fn or_if_declared(logic: Option<LogicalOperator>) -> LogicalOperator {
        match logic {
            Some(LogicalOperator::Or) => LogicalOperator::Or,
            _ => LogicalOperator::And,
        }
    }

    /// 组间组合：只有显式声明 AND 时才是 AND
    fn and_if_declared(logic: Option<LogicalOperator>) -> LogicalOperator {
        match logic {
            Some(LogicalOperator::And) => LogicalOperator::And,
            _ => LogicalOperator::Or,
        }
    }

    fn extract_fields(definition: &RuleDefinition) -> BTreeSet<String> {
        definition
            .conditions
            .iter()
            .chain(definition.condition_groups.iter().flat_map(|g| g.conditions.iter()))
            .map(|c| c.field.clone())
            .collect()
    }
}
