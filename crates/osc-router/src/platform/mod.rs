//! 平台事件归一化
//!
//! 评论工具推送的原始事件为 `{ service, data }` 信封。这里先把信封归类为
//! 封闭的 [`PlatformEvent`] 变体，再由单一的归一化函数生成规则引擎消费的消息。

mod fields;

pub use fields::{PlatformFields, field_catalog};

use chrono::Utc;
use rule_engine::coerce;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 原始事件信封
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentEnvelope {
    pub service: String,
    #[serde(default)]
    pub data: Value,
}

impl CommentEnvelope {
    pub fn new(service: impl Into<String>, data: Value) -> Self {
        Self {
            service: service.into(),
            data,
        }
    }

    /// 判断任意 JSON 值是否为信封：`service` 为字符串且 `data` 为对象
    pub fn from_value(value: &Value) -> Option<Self> {
        let service = value.get("service")?.as_str()?;
        let data = value.get("data").filter(|d| d.is_object())?;
        Some(Self::new(service, data.clone()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YouTubeKind {
    Comment,
    SuperChat,
    Membership,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BilibiliKind {
    Comment,
    Gift,
    SuperChat,
    Guard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TwitchKind {
    Comment,
    Cheer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NiconicoKind {
    Comment,
    Gift,
}

/// 按平台与消息种类区分的事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformEvent {
    YouTube(YouTubeKind),
    Bilibili(BilibiliKind),
    Twitch(TwitchKind),
    Niconico(NiconicoKind),
    Other { service: String },
}

impl PlatformEvent {
    /// 根据 service 与结构特征归类
    pub fn classify(envelope: &CommentEnvelope) -> Self {
        let data = &envelope.data;
        let service = envelope.service.trim().to_lowercase();

        match service.as_str() {
            "youtube" => {
                if truthy(data.get("isMembership")) {
                    Self::YouTube(YouTubeKind::Membership)
                } else if is_true(data.get("hasGift")) || is_paid(data) {
                    Self::YouTube(YouTubeKind::SuperChat)
                } else {
                    Self::YouTube(YouTubeKind::Comment)
                }
            }
            "bilibili" => {
                if present(data.get("giftName")) {
                    Self::Bilibili(BilibiliKind::Gift)
                } else if is_paid(data) {
                    Self::Bilibili(BilibiliKind::SuperChat)
                } else if is_true(data.get("hasGift")) {
                    if number(data.get("guardLevel")) > 0.0 {
                        Self::Bilibili(BilibiliKind::Guard)
                    } else {
                        Self::Bilibili(BilibiliKind::Gift)
                    }
                } else {
                    Self::Bilibili(BilibiliKind::Comment)
                }
            }
            "twitch" => {
                if number(data.get("bits")) > 0.0 {
                    Self::Twitch(TwitchKind::Cheer)
                } else {
                    Self::Twitch(TwitchKind::Comment)
                }
            }
            "niconama" | "niconico" => {
                if is_true(data.get("hasGift")) || present(data.get("giftName")) {
                    Self::Niconico(NiconicoKind::Gift)
                } else {
                    Self::Niconico(NiconicoKind::Comment)
                }
            }
            _ => Self::Other { service },
        }
    }

    /// 平台标识
    pub fn platform(&self) -> &str {
        match self {
            Self::YouTube(_) => "youtube",
            Self::Bilibili(_) => "bilibili",
            Self::Twitch(_) => "twitch",
            Self::Niconico(_) => "niconico",
            Self::Other { service } => service,
        }
    }

    /// 消息种类（`type` 中平台前缀之后的部分）
    pub fn kind(&self) -> &'static str {
        match self {
            Self::YouTube(YouTubeKind::Comment)
            | Self::Bilibili(BilibiliKind::Comment)
            | Self::Twitch(TwitchKind::Comment)
            | Self::Niconico(NiconicoKind::Comment)
            | Self::Other { .. } => "comment",
            Self::YouTube(YouTubeKind::SuperChat) => "super",
            Self::YouTube(YouTubeKind::Membership) => "membership",
            Self::Bilibili(BilibiliKind::Gift) | Self::Niconico(NiconicoKind::Gift) => "gift",
            Self::Bilibili(BilibiliKind::SuperChat) => "superchat",
            Self::Bilibili(BilibiliKind::Guard) => "guard",
            Self::Twitch(TwitchKind::Cheer) => "cheer",
        }
    }

    /// 消息 `type` 标签，如 `youtube-super`
    pub fn type_tag(&self) -> String {
        format!("{}-{}", self.platform(), self.kind())
    }

    /// 默认路由端点，如 `/onecomme/youtube/super`
    pub fn default_endpoint(&self) -> String {
        format!("/onecomme/{}/{}", self.platform(), self.kind())
    }

    /// 该种类是否属于付费事件
    pub fn is_paid(&self) -> bool {
        matches!(
            self,
            Self::YouTube(YouTubeKind::SuperChat)
                | Self::Bilibili(BilibiliKind::Gift | BilibiliKind::SuperChat | BilibiliKind::Guard)
                | Self::Twitch(TwitchKind::Cheer)
                | Self::Niconico(NiconicoKind::Gift)
        )
    }
}

/// 归一化结果
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedMessage {
    pub event: PlatformEvent,
    pub message: Value,
}

impl NormalizedMessage {
    pub fn default_endpoint(&self) -> String {
        self.event.default_endpoint()
    }
}

/// 归一化信封
pub fn normalize(envelope: &CommentEnvelope) -> NormalizedMessage {
    let event = PlatformEvent::classify(envelope);
    let data = &envelope.data;
    let mut out = Map::new();

    // 公共字段
    out.insert("type".into(), Value::String(event.type_tag()));
    out.insert("service".into(), Value::String(event.platform().to_string()));
    out.insert("id".into(), string_of(data.get("id")));
    out.insert("userId".into(), string_of(data.get("userId")));
    out.insert(
        "name".into(),
        string_of(data.get("displayName").filter(|v| present(Some(v))).or(data.get("name"))),
    );
    out.insert("comment".into(), string_of(data.get("comment")));
    out.insert(
        "timestamp".into(),
        data.get("timestamp")
            .filter(|v| present(Some(v)))
            .cloned()
            .unwrap_or_else(|| Value::from(Utc::now().timestamp_millis())),
    );
    let has_gift = data
        .get("hasGift")
        .and_then(Value::as_bool)
        .unwrap_or_else(|| event.is_paid());
    out.insert("hasGift".into(), Value::Bool(has_gift));
    out.insert("profileImage".into(), string_of(data.get("profileImage")));
    out.insert("isOwner".into(), Value::Bool(truthy(data.get("isOwner"))));
    out.insert("isModerator".into(), Value::Bool(truthy(data.get("isModerator"))));

    // 平台字段
    match &event {
        PlatformEvent::YouTube(_) => {
            out.insert("isMember".into(), Value::Bool(truthy(data.get("isMember"))));
            copy(&mut out, data, "price", "price");
            copy_first(&mut out, data, &["currency", "unit"], "currency");
            copy(&mut out, data, "paidText", "paidText");
        }
        PlatformEvent::Bilibili(_) => {
            copy_or(&mut out, data, "userLevel", Value::from(0));
            copy_or(&mut out, data, "guardLevel", Value::from(0));
            copy(&mut out, data, "medalName", "medalName");
            copy(&mut out, data, "medalLevel", "medalLevel");
            copy(&mut out, data, "giftName", "giftName");
            copy(&mut out, data, "giftCount", "giftCount");
            copy(&mut out, data, "price", "price");
            copy(&mut out, data, "paidText", "paidText");
        }
        PlatformEvent::Twitch(_) => {
            copy_or(&mut out, data, "bits", Value::from(0));
            out.insert("isMember".into(), Value::Bool(truthy(data.get("isMember"))));
        }
        PlatformEvent::Niconico(_) => {
            out.insert("premium".into(), Value::Bool(truthy(data.get("premium"))));
            copy(&mut out, data, "giftName", "giftName");
            copy(&mut out, data, "price", "price");
        }
        PlatformEvent::Other { .. } => {}
    }

    NormalizedMessage {
        event,
        message: Value::Object(out),
    }
}

/// 信封先归一化；已是消息的值原样返回
pub fn normalize_value(value: Value) -> Value {
    match CommentEnvelope::from_value(&value) {
        Some(envelope) => normalize(&envelope).message,
        None => value,
    }
}

// ========== 辅助函数 ==========

fn present(value: Option<&Value>) -> bool {
    !matches!(value, None | Some(Value::Null))
        && !matches!(value, Some(Value::String(s)) if s.is_empty())
}

fn is_true(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::Bool(true)))
}

fn truthy(value: Option<&Value>) -> bool {
    coerce::to_boolean(value)
}

fn number(value: Option<&Value>) -> f64 {
    coerce::to_number(value)
}

fn is_paid(data: &Value) -> bool {
    present(data.get("paidText")) || present(data.get("price"))
}

fn string_of(value: Option<&Value>) -> Value {
    match value {
        Some(Value::String(s)) => Value::String(s.clone()),
        Some(Value::Null) | None => Value::String(String::new()),
        Some(other) => Value::String(coerce::to_js_string(Some(other))),
    }
}

fn copy(out: &mut Map<String, Value>, data: &Value, from: &str, to: &str) {
    if let Some(value) = data.get(from).filter(|v| !v.is_null()) {
        out.insert(to.to_string(), value.clone());
    }
}

fn copy_first(out: &mut Map<String, Value>, data: &Value, candidates: &[&str], to: &str) {
    if let Some(value) = candidates
        .iter()
        .filter_map(|key| data.get(*key))
        .find(|v| !v.is_null())
    {
        out.insert(to.to_string(), value.clone());
    }
}

fn copy_or(out: &mut Map<String, Value>, data: &Value, key: &str, fallback: Value) {
    let value = data.get(key).filter(|v| !v.is_null()).cloned().unwrap_or(fallback);
    out.insert(key.to_string(), value);
}
