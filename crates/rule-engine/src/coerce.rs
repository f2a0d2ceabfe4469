//! 条件值类型转换
//!
//! 规则由浏览器端控制面编写，比较语义与 JavaScript 保持一致：
//! 数字按 `parseFloat` 解析（失败为 0），布尔按真值性转换，
//! 字符串按 `String(x)` 表示。字段缺失（`None`）同样参与转换，
//! 因此 "字段不存在" 与 "字段为 0/false" 在 number/boolean 类型下无法区分。

use regex::Regex;
use serde_json::Value;
use std::cmp::Ordering;
use std::sync::LazyLock;

use crate::operators::DataType;

static FLOAT_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:Infinity|(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)")
        .expect("float prefix pattern is valid")
});

static DECIMAL_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:Infinity|(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)$")
        .expect("decimal literal pattern is valid")
});

/// 按数据类型转换后的值
#[derive(Debug, Clone, PartialEq)]
pub enum Coerced<'a> {
    Number(f64),
    Boolean(bool),
    /// 未转换的原始值，`None` 表示字段不存在
    Raw(Option<&'a Value>),
}

impl<'a> Coerced<'a> {
    pub fn from_value(value: Option<&'a Value>, data_type: DataType) -> Self {
        match data_type {
            DataType::Number => Self::Number(to_number(value)),
            DataType::Boolean => Self::Boolean(to_boolean(value)),
            DataType::String | DataType::Other => Self::Raw(value),
        }
    }

    /// 严格相等（`===`）
    pub fn strict_equals(&self, other: &Coerced<'_>) -> bool {
        match (self, other) {
            (Self::Number(a), Coerced::Number(b)) => a == b,
            (Self::Boolean(a), Coerced::Boolean(b)) => a == b,
            (Self::Raw(a), Coerced::Raw(b)) => raw_strict_equals(*a, *b),
            _ => false,
        }
    }

    /// 关系比较（`<` / `>`），无法比较时返回 `None`
    ///
    /// 两个字符串按 UTF-16 码元逐个比较，与 JavaScript 一致。
    pub fn compare(&self, other: &Coerced<'_>) -> Option<Ordering> {
        if let (Self::Raw(Some(Value::String(a))), Coerced::Raw(Some(Value::String(b)))) =
            (self, other)
        {
            return Some(a.encode_utf16().cmp(b.encode_utf16()));
        }

        self.as_js_number().partial_cmp(&other.as_js_number())
    }

    /// `String(x)` 表示
    pub fn to_js_string(&self) -> String {
        match self {
            Self::Number(n) => format_number(*n),
            Self::Boolean(b) => b.to_string(),
            Self::Raw(v) => to_js_string(*v),
        }
    }

    fn as_js_number(&self) -> f64 {
        match self {
            Self::Number(n) => *n,
            Self::Boolean(b) => f64::from(u8::from(*b)),
            Self::Raw(v) => js_number(*v),
        }
    }
}

fn raw_strict_equals(a: Option<&Value>, b: Option<&Value>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(Value::Null), Some(Value::Null)) => true,
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x == y,
        (Some(Value::Number(x)), Some(Value::Number(y))) => x.as_f64() == y.as_f64(),
        (Some(Value::String(x)), Some(Value::String(y))) => x == y,
        // 对象/数组按引用比较，来自消息与规则的值永不相同
        _ => false,
    }
}

/// `parseFloat(String(x))`，NaN 归零
pub fn to_number(value: Option<&Value>) -> f64 {
    if let Some(Value::Number(n)) = value {
        return n.as_f64().unwrap_or(0.0);
    }

    let parsed = parse_float(&to_js_string(value));
    if parsed.is_nan() { 0.0 } else { parsed }
}

/// JavaScript 真值性
pub fn to_boolean(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// `String(x)`
pub fn to_js_string(value: Option<&Value>) -> String {
    match value {
        None => "undefined".to_string(),
        Some(Value::Null) => "null".to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => match n.as_f64() {
            Some(f) if n.is_f64() => format_number(f),
            _ => n.to_string(),
        },
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => to_js_string(Some(other)),
            })
            .collect::<Vec<_>>()
            .join(","),
        Some(Value::Object(_)) => "[object Object]".to_string(),
    }
}

/// `parseFloat`：跳过前导空白，解析最长的数字前缀
pub fn parse_float(input: &str) -> f64 {
    let trimmed = input.trim_start();
    match FLOAT_PREFIX.find(trimmed) {
        Some(m) => parse_literal(m.as_str()),
        None => f64::NAN,
    }
}

/// `Number(x)`，用于非字符串之间的关系比较
fn js_number(value: Option<&Value>) -> f64 {
    match value {
        None => f64::NAN,
        Some(Value::Null) => 0.0,
        Some(Value::Bool(b)) => f64::from(u8::from(*b)),
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(s)) => string_to_number(s),
        // 数组/对象先转字符串再转数字：[] -> 0，[5] -> 5，其余为 NaN
        Some(Value::Array(_)) | Some(Value::Object(_)) => string_to_number(&to_js_string(value)),
    }
}

fn string_to_number(s: &str) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        return u64::from_str_radix(hex, 16).map_or(f64::NAN, |n| n as f64);
    }

    if DECIMAL_LITERAL.is_match(trimmed) {
        parse_literal(trimmed)
    } else {
        f64::NAN
    }
}

fn parse_literal(literal: &str) -> f64 {
    match literal {
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        other => other.parse().unwrap_or(f64::NAN),
    }
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{}", n as i128)
    } else {
        format!("{}", n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_to_number_parse_float_semantics() {
        assert_eq!(to_number(Some(&json!(25))), 25.0);
        assert_eq!(to_number(Some(&json!("12.5"))), 12.5);
        assert_eq!(to_number(Some(&json!("  42px"))), 42.0);
        assert_eq!(to_number(Some(&json!("abc"))), 0.0);
        assert_eq!(to_number(Some(&json!(true))), 0.0);
        assert_eq!(to_number(Some(&json!(null))), 0.0);
        assert_eq!(to_number(None), 0.0);
        assert_eq!(to_number(Some(&json!([3, 4]))), 3.0);
        assert_eq!(to_number(Some(&json!("-1e3"))), -1000.0);
    }

    #[test]
    fn test_to_boolean_truthiness() {
        assert!(!to_boolean(None));
        assert!(!to_boolean(Some(&json!(null))));
        assert!(!to_boolean(Some(&json!(0))));
        assert!(!to_boolean(Some(&json!(""))));
        assert!(!to_boolean(Some(&json!(false))));
        assert!(to_boolean(Some(&json!("false"))));
        assert!(to_boolean(Some(&json!([]))));
        assert!(to_boolean(Some(&json!({}))));
        assert!(to_boolean(Some(&json!(-1))));
    }

    #[test]
    fn test_to_js_string() {
        assert_eq!(to_js_string(None), "undefined");
        assert_eq!(to_js_string(Some(&json!(null))), "null");
        assert_eq!(to_js_string(Some(&json!(5.0))), "5");
        assert_eq!(to_js_string(Some(&json!(0.5))), "0.5");
        assert_eq!(to_js_string(Some(&json!(["a", 1, null]))), "a,1,");
        assert_eq!(to_js_string(Some(&json!({"k": 1}))), "[object Object]");
    }

    #[test]
    fn test_strict_equals() {
        let five = json!(5);
        let five_str = json!("5");
        let five_float = json!(5.0);

        assert!(!Coerced::Raw(Some(&five)).strict_equals(&Coerced::Raw(Some(&five_str))));
        assert!(Coerced::Raw(Some(&five)).strict_equals(&Coerced::Raw(Some(&five_float))));
        assert!(Coerced::Raw(None).strict_equals(&Coerced::Raw(None)));
        assert!(!Coerced::Number(1.0).strict_equals(&Coerced::Boolean(true)));
    }

    #[test]
    fn test_relational_compare() {
        let a = json!("apple");
        let b = json!("banana");
        assert_eq!(
            Coerced::Raw(Some(&a)).compare(&Coerced::Raw(Some(&b))),
            Some(Ordering::Less)
        );

        // 字符串与数字比较时先转数字
        let ten = json!("10");
        let nine = json!(9);
        assert_eq!(
            Coerced::Raw(Some(&ten)).compare(&Coerced::Raw(Some(&nine))),
            Some(Ordering::Greater)
        );

        // NaN 参与比较永远为 false
        let word = json!("abc");
        assert_eq!(Coerced::Raw(Some(&word)).compare(&Coerced::Raw(Some(&nine))), None);
        assert_eq!(Coerced::Raw(None).compare(&Coerced::Raw(Some(&nine))), None);
    }

    #[test]
    fn test_string_compare_uses_utf16_code_units() {
        // U+1F600 的高代理项 0xD83D 小于 U+FF5E，UTF-8 字节序则相反
        let emoji = json!("😀");
        let tilde = json!("\u{FF5E}");
        assert_eq!(
            Coerced::Raw(Some(&emoji)).compare(&Coerced::Raw(Some(&tilde))),
            Some(Ordering::Less)
        );
    }

    #[test]
    fn test_compare_with_shorter_lived_operand() {
        let message_value = json!(30);
        let left = Coerced::from_value(Some(&message_value), DataType::Number);

        let verdict = {
            let rule_value = json!("20");
            let right = Coerced::from_value(Some(&rule_value), DataType::Number);
            (left.compare(&right), left.strict_equals(&right))
        };
        assert_eq!(verdict, (Some(Ordering::Greater), false));
    }
}
