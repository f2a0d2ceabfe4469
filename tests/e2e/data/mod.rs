//! 测试数据
//!
//! 各平台的评论信封与常用规则。

use serde_json::{Value, json};

/// 评论信封样例
pub struct TestEnvelopes;

impl TestEnvelopes {
    pub fn youtube_comment(name: &str, comment: &str) -> Value {
        json!({
            "service": "youtube",
            "data": {"id": format!("yt-{}", name), "displayName": name, "comment": comment}
        })
    }

    pub fn youtube_superchat(name: &str, price: i64) -> Value {
        json!({
            "service": "youtube",
            "data": {
                "id": format!("sc-{}", name),
                "displayName": name,
                "comment": "スパチャ",
                "price": price,
                "currency": "JPY",
                "paidText": format!("¥{}", price)
            }
        })
    }

    pub fn bilibili_guard(name: &str, guard_level: i64) -> Value {
        json!({
            "service": "bilibili",
            "data": {"name": name, "comment": "上舰", "hasGift": true, "guardLevel": guard_level}
        })
    }

    pub fn twitch_cheer(name: &str, bits: i64) -> Value {
        json!({
            "service": "twitch",
            "data": {"displayName": name, "comment": "cheer", "bits": bits}
        })
    }
}

/// 规则样例
pub struct TestRules;

impl TestRules {
    /// YouTube 高额 SuperChat 投影到头像端点，并阻止默认路由
    pub fn big_superchat(min_price: i64) -> Value {
        json!({
            "name": "高额 SuperChat",
            "conditionGroups": [{
                "source": "youtube",
                "messageType": "superchat",
                "conditions": [
                    {"field": "price", "operator": "greater_than_or_equal", "value": min_price, "dataType": "number"}
                ]
            }],
            "actions": [{
                "type": "route_to_endpoint",
                "endpoint": "/avatar/superchat",
                "fields": [
                    {"path": "name", "enabled": true},
                    {"path": "price", "enabled": true},
                    {"path": "comment", "enabled": false}
                ]
            }],
            "blockDefault": true
        })
    }

    /// 评论关键字路由，不阻止默认路由
    pub fn keyword(keyword: &str, endpoint: &str) -> Value {
        json!({
            "name": format!("关键字 {}", keyword),
            "conditions": [
                {"field": "comment", "operator": "contains", "value": keyword}
            ],
            "actions": [{"type": "route_to_endpoint", "endpoint": endpoint, "fields": []}]
        })
    }
}
