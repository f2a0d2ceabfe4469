//! 消息来源与消息类型识别
//!
//! 来源识别的优先级：
//! 1. `type` 前缀（`youtube*` / `bilibili*` / `niconico*` 或恰为 `niconama`）
//! 2. `service` 字段（转小写）
//! 3. 结构特征：`userLevel`/`guardLevel` 判定为 bilibili，`isMember` 判定为 youtube
//! 4. 以上都不满足则为 `unknown`

use serde_json::Value;
use std::fmt;

/// 识别出的消息来源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    YouTube,
    Bilibili,
    Niconico,
    /// 由 `service` 字段给出的其它平台（已转小写）
    Service(String),
    Unknown,
}

impl Source {
    pub fn as_str(&self) -> &str {
        match self {
            Self::YouTube => "youtube",
            Self::Bilibili => "bilibili",
            Self::Niconico => "niconico",
            Self::Service(name) => name,
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 来源/消息类型识别器
pub struct SourceDetector;

impl SourceDetector {
    /// 识别消息来源
    pub fn detect(message: &Value) -> Source {
        if let Some(message_type) = message.get("type").and_then(Value::as_str) {
            if message_type.starts_with("youtube") {
                return Source::YouTube;
            }
            if message_type.starts_with("bilibili") {
                return Source::Bilibili;
            }
            if message_type.starts_with("niconico") || message_type == "niconama" {
                return Source::Niconico;
            }
        }

        if let Some(service) = message
            .get("service")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
        {
            return match service.to_lowercase().as_str() {
                "youtube" => Source::YouTube,
                "bilibili" => Source::Bilibili,
                "niconico" => Source::Niconico,
                other => Source::Service(other.to_string()),
            };
        }

        let has = |field: &str| message.get(field).is_some();

        if has("userLevel") || has("guardLevel") {
            Source::Bilibili
        } else if has("isMember") {
            Source::YouTube
        } else {
            Source::Unknown
        }
    }

    /// 判断消息是否属于指定的消息类型
    ///
    /// `gift`/`superchat` 要求 `hasGift === true`，`comment` 要求 `hasGift !== true`，
    /// 其它类型名不做限制。
    pub fn matches_message_type(message: &Value, message_type: &str) -> bool {
        let has_gift = message.get("hasGift") == Some(&Value::Bool(true));

        match message_type {
            "gift" | "superchat" => has_gift,
            "comment" => !has_gift,
            _ => true,
        }
    }
}
