//! 请求 DTO 定义

use rule_engine::{Action, Condition, ConditionGroup, LogicalOperator, RuleDefinition};
use serde::Deserialize;
use serde_json::Value;
use validator::{Validate, ValidationError};

use crate::osc::MessageFormat;
use crate::platform::CommentEnvelope;

/// 动作端点必须是以 `/` 开头的 OSC 地址
fn validate_actions(actions: &[Action]) -> Result<(), ValidationError> {
    if actions.iter().any(|a| !a.endpoint.starts_with('/')) {
        let mut err = ValidationError::new("endpoint");
        err.message = Some("动作端点必须以 / 开头".into());
        return Err(err);
    }
    Ok(())
}

/// 目标主机去掉首尾空白后不能为空
fn validate_host(host: &str) -> Result<(), ValidationError> {
    if host.trim().is_empty() {
        let mut err = ValidationError::new("host");
        err.message = Some("目标主机不能为空".into());
        return Err(err);
    }
    Ok(())
}

/// 新建/更新规则请求
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RuleRequest {
    /// 新建时可省略，由服务端生成
    #[serde(default)]
    pub id: Option<String>,
    #[validate(length(min = 1, max = 100, message = "规则名称长度必须在1-100个字符之间"))]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub condition_groups: Vec<ConditionGroup>,
    #[serde(default)]
    pub group_logic: Option<LogicalOperator>,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub condition_logic: Option<LogicalOperator>,
    #[serde(default)]
    #[validate(custom(function = "validate_actions"))]
    pub actions: Vec<Action>,
    #[serde(default)]
    pub block_default: bool,
}

impl RuleRequest {
    pub fn into_definition(self) -> RuleDefinition {
        let mut definition = RuleDefinition::new(self.id.unwrap_or_default(), self.name);
        definition.description = self.description;
        definition.enabled = self.enabled.unwrap_or(true);
        definition.condition_groups = self.condition_groups;
        definition.group_logic = self.group_logic;
        definition.conditions = self.conditions;
        definition.condition_logic = self.condition_logic;
        definition.actions = self.actions;
        definition.block_default = self.block_default;
        definition
    }
}

/// 单条规则测试请求
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRuleRequest {
    pub rule: RuleDefinition,
    /// 原始信封或已归一化的消息
    pub message: Value,
}

/// 规则集预览请求
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewRequest {
    pub message: Value,
}

/// 发送设置更新请求（字段均可选，缺省保持原值）
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateConfigRequest {
    #[validate(
        length(max = 255, message = "目标主机长度不能超过255个字符"),
        custom(function = "validate_host")
    )]
    pub host: Option<String>,
    #[validate(range(min = 1, max = 65535, message = "端口必须在1-65535之间"))]
    pub port: Option<u16>,
    pub message_format: Option<MessageFormat>,
    pub enabled: Option<bool>,
}

/// 评论批量推送请求：直接为数组，或包在 `comments` 字段中
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CommentBatch {
    List(Vec<CommentEnvelope>),
    Wrapped { comments: Vec<CommentEnvelope> },
}

impl CommentBatch {
    pub fn into_envelopes(self) -> Vec<CommentEnvelope> {
        match self {
            Self::List(envelopes) | Self::Wrapped { comments: envelopes } => envelopes,
        }
    }
}

/// 历史查询参数
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}
