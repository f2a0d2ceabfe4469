//! 点号路径读写
//!
//! 条件评估读取字段和字段投影写入字段共用同一套路径语义：
//! 按 `.` 切分，逐段下钻；对象按键访问，数组按数字下标访问。

use serde_json::{Map, Value};

/// 按点号路径读取字段（如 `"author.name"` 或 `"badges.0.label"`）
///
/// 任一段缺失或当前值不可索引时返回 `None`。
pub fn get<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = record;

    for part in path.split('.') {
        match current {
            Value::Object(map) => {
                current = map.get(part)?;
            }
            Value::Array(arr) => {
                let index: usize = part.parse().ok()?;
                current = arr.get(index)?;
            }
            _ => return None,
        }
    }

    Some(current)
}

/// 按点号路径写入字段，按需创建中间对象
///
/// 中间节点已存在且不是对象时放弃写入，返回 false。
pub fn set(target: &mut Map<String, Value>, path: &str, value: Value) -> bool {
    let mut parts = path.split('.').peekable();
    let mut current = target;

    while let Some(part) = parts.next() {
        if parts.peek().is_none() {
            current.insert(part.to_string(), value);
            return true;
        }

        let entry = current
            .entry(part.to_string())
            .or_insert_with(|| Value::Object(Map::new()));

        match entry {
            Value::Object(map) => current = map,
            _ => return false,
        }
    }

    false
}
