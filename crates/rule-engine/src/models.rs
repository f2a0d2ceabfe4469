//! 规则引擎领域模型
//!
//! `RuleDefinition` 是持久化与控制面 API 使用的规则形态，兼容两种写法：
//! 新格式 `conditionGroups` + `groupLogic`，旧格式 `conditions` + `conditionLogic`。
//! 评估前由 [`crate::compiler::RuleCompiler`] 统一解析为带标签的匹配器。

use crate::operators::{DataType, LogicalOperator, Operator};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

fn default_true() -> bool {
    true
}

/// 规则定义
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleDefinition {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// 新格式：条件组
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub condition_groups: Vec<ConditionGroup>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_logic: Option<LogicalOperator>,

    /// 旧格式：平铺条件
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_logic: Option<LogicalOperator>,

    #[serde(default)]
    pub actions: Vec<Action>,
    /// 匹配后是否阻止默认路由
    #[serde(default)]
    pub block_default: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl RuleDefinition {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            enabled: true,
            condition_groups: Vec::new(),
            group_logic: None,
            conditions: Vec::new(),
            condition_logic: None,
            actions: Vec::new(),
            block_default: false,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_groups(mut self, logic: Option<LogicalOperator>, groups: Vec<ConditionGroup>) -> Self {
        self.group_logic = logic;
        self.condition_groups = groups;
        self
    }

    pub fn with_conditions(
        mut self,
        logic: Option<LogicalOperator>,
        conditions: Vec<Condition>,
    ) -> Self {
        self.condition_logic = logic;
        self.conditions = conditions;
        self
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn blocking_default(mut self) -> Self {
        self.block_default = true;
        self
    }
}

/// 条件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub field: String,
    pub operator: Operator,
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub data_type: DataType,
}

impl Condition {
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
            data_type: DataType::String,
        }
    }

    pub fn typed(mut self, data_type: DataType) -> Self {
        self.data_type = data_type;
        self
    }
}

/// 条件组：平台/消息类型选择器 + 一组条件
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionGroup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_type: Option<String>,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_logic: Option<LogicalOperator>,
}

impl ConditionGroup {
    pub fn new(conditions: Vec<Condition>) -> Self {
        Self {
            conditions,
            ..Default::default()
        }
    }

    pub fn for_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn for_message_type(mut self, message_type: impl Into<String>) -> Self {
        self.message_type = Some(message_type.into());
        self
    }

    pub fn with_logic(mut self, logic: LogicalOperator) -> Self {
        self.condition_logic = Some(logic);
        self
    }
}

/// 动作类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    RouteToEndpoint,
    #[serde(other)]
    Unsupported,
}

/// 规则动作：把（投影后的）消息发送到指定 OSC 端点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub action_type: ActionType,
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

impl Action {
    pub fn route_to(endpoint: impl Into<String>) -> Self {
        Self {
            action_type: ActionType::RouteToEndpoint,
            endpoint: endpoint.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, path: impl Into<String>) -> Self {
        self.fields.push(FieldSpec::new(path));
        self
    }
}

/// 字段选择
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub path: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl FieldSpec {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            enabled: true,
        }
    }
}

/// 规则集评估结果
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSetResult {
    pub matched_rules: Vec<RuleDefinition>,
    pub actions: Vec<Action>,
    pub should_process: bool,
}

impl RuleSetResult {
    pub fn matched_rule_ids(&self) -> Vec<String> {
        self.matched_rules.iter().map(|r| r.id.clone()).collect()
    }
}

/// 单条规则的评估结果（带追踪信息，供控制面测试接口使用）
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    pub matched: bool,
    pub rule_id: String,
    pub rule_name: String,
    pub evaluation_trace: Vec<String>,
}

impl EvaluationResult {
    pub fn new(rule_id: String, rule_name: String) -> Self {
        Self {
            matched: false,
            rule_id,
            rule_name,
            evaluation_trace: Vec::new(),
        }
    }
}
