//! 条件评估器
//!
//! 先按 `dataType` 转换字段值与规则值，再应用操作符。
//! 评估永不失败：字段缺失、正则无效、操作符未知都只会得到 false。

use crate::coerce::Coerced;
use crate::models::Condition;
use crate::operators::{DataType, Operator};
use crate::path;
use fancy_regex::{Regex, RegexBuilder};
use serde_json::Value;
use std::cmp::Ordering;
use tracing::debug;

/// 条件评估器
pub struct ConditionEvaluator;

impl ConditionEvaluator {
    /// 评估单个条件
    ///
    /// 正则条件会临时编译模式；批量评估请使用编译后的规则。
    pub fn evaluate(condition: &Condition, message: &Value) -> bool {
        let pattern = match condition.operator {
            Operator::Regex => Self::build_pattern(&condition.value, condition.data_type),
            _ => None,
        };

        Self::apply(
            condition.operator,
            condition.data_type,
            path::get(message, &condition.field),
            &condition.value,
            pattern.as_ref(),
        )
    }

    /// 对已读取的字段值应用操作符
    ///
    /// # Arguments
    /// * `message_value` - 从消息中读取的字段值，`None` 表示字段不存在
    /// * `rule_value` - 规则中定义的比较值
    /// * `pattern` - regex 操作符使用的预编译模式，无效模式传 `None`
    pub fn apply(
        operator: Operator,
        data_type: DataType,
        message_value: Option<&Value>,
        rule_value: &Value,
        pattern: Option<&Regex>,
    ) -> bool {
        let actual = Coerced::from_value(message_value, data_type);
        let expected = Coerced::from_value(Some(rule_value), data_type);

        match operator {
            Operator::Equals => actual.strict_equals(&expected),
            Operator::NotEquals => !actual.strict_equals(&expected),
            Operator::GreaterThan => {
                matches!(actual.compare(&expected), Some(Ordering::Greater))
            }
            Operator::GreaterThanOrEqual => matches!(
                actual.compare(&expected),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Operator::LessThan => matches!(actual.compare(&expected), Some(Ordering::Less)),
            Operator::LessThanOrEqual => matches!(
                actual.compare(&expected),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Operator::Contains => Self::lowered(&actual).contains(&Self::lowered(&expected)),
            Operator::NotContains => !Self::lowered(&actual).contains(&Self::lowered(&expected)),
            Operator::StartsWith => Self::lowered(&actual).starts_with(&Self::lowered(&expected)),
            Operator::EndsWith => Self::lowered(&actual).ends_with(&Self::lowered(&expected)),
            Operator::Regex => pattern.is_some_and(|re| Self::regex_matches(re, &actual.to_js_string())),
            Operator::Unknown => false,
        }
    }

    /// 编译大小写不敏感的正则模式，无效模式返回 `None`
    ///
    /// 支持 JavaScript 写法中的前后断言与反向引用。
    pub fn build_pattern(value: &Value, data_type: DataType) -> Option<Regex> {
        let source = Coerced::from_value(Some(value), data_type).to_js_string();

        match RegexBuilder::new(&source).case_insensitive(true).build() {
            Ok(regex) => Some(regex),
            Err(e) => {
                debug!(pattern = %source, error = %e, "无效的正则表达式，条件视为不匹配");
                None
            }
        }
    }

    /// 回溯超限等运行期错误视为不匹配
    fn regex_matches(pattern: &Regex, text: &str) -> bool {
        pattern.is_match(text).unwrap_or_else(|e| {
            debug!(pattern = %pattern.as_str(), error = %e, "正则匹配失败，条件视为不匹配");
            false
        })
    }

    fn lowered(value: &Coerced<'_>) -> String {
        value.to_js_string().to_lowercase()
    }
}
