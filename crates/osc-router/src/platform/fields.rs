//! 可用字段目录
//!
//! 列出归一化后每个平台可能出现的字段，供控制面编辑规则条件与字段投影时选择。

use serde::Serialize;

/// 所有平台共有的字段
const COMMON_FIELDS: &[&str] = &[
    "type",
    "service",
    "id",
    "userId",
    "name",
    "comment",
    "timestamp",
    "hasGift",
    "profileImage",
    "isOwner",
    "isModerator",
];

const YOUTUBE_FIELDS: &[&str] = &["isMember", "price", "currency", "paidText"];

const BILIBILI_FIELDS: &[&str] = &[
    "userLevel",
    "guardLevel",
    "medalName",
    "medalLevel",
    "giftName",
    "giftCount",
    "price",
    "paidText",
];

const TWITCH_FIELDS: &[&str] = &["bits", "isMember"];

const NICONICO_FIELDS: &[&str] = &["premium", "giftName", "price"];

/// 单个平台的字段列表
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformFields {
    pub platform: &'static str,
    pub message_types: Vec<&'static str>,
    pub fields: Vec<&'static str>,
}

impl PlatformFields {
    fn new(platform: &'static str, message_types: &[&'static str], extra: &[&'static str]) -> Self {
        Self {
            platform,
            message_types: message_types.to_vec(),
            fields: COMMON_FIELDS.iter().chain(extra).copied().collect(),
        }
    }
}

/// 字段目录（平台顺序固定）
pub fn field_catalog() -> Vec<PlatformFields> {
    vec![
        PlatformFields::new(
            "youtube",
            &["youtube-comment", "youtube-super", "youtube-membership"],
            YOUTUBE_FIELDS,
        ),
        PlatformFields::new(
            "bilibili",
            &[
                "bilibili-comment",
                "bilibili-gift",
                "bilibili-superchat",
                "bilibili-guard",
            ],
            BILIBILI_FIELDS,
        ),
        PlatformFields::new("twitch", &["twitch-comment", "twitch-cheer"], TWITCH_FIELDS),
        PlatformFields::new(
            "niconico",
            &["niconico-comment", "niconico-gift"],
            NICONICO_FIELDS,
        ),
    ]
}
