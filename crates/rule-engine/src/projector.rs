//! 字段投影
//!
//! 按字段选择生成消息的精简副本。路径语义与条件评估一致（见 [`crate::path`]）。

use crate::models::FieldSpec;
use crate::path;
use serde_json::{Map, Value};
use std::borrow::Cow;

/// 字段投影器
pub struct FieldProjector;

impl FieldProjector {
    /// 投影消息
    ///
    /// 字段选择为空时原样返回整条消息（借用，不复制）；
    /// 否则只写入启用且在消息中存在的路径，缺失路径整体省略。
    pub fn project<'a>(message: &'a Value, fields: &[FieldSpec]) -> Cow<'a, Value> {
        if fields.is_empty() {
            return Cow::Borrowed(message);
        }

        let mut output = Map::new();
        for spec in fields.iter().filter(|f| f.enabled) {
            if let Some(value) = path::get(message, &spec.path) {
                path::set(&mut output, &spec.path, value.clone());
            }
        }

        Cow::Owned(Value::Object(output))
    }
}
