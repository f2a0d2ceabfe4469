//! 处理历史测试套件

use crate::data::*;
use crate::setup::{TestEnvConfig, TestEnvironment};
use serde_json::json;
use std::time::Duration;

#[cfg(test)]
mod history_tests {
    use super::*;

    #[tokio::test]
    async fn test_history_keeps_newest_entries() {
        let env = TestEnvironment::setup_with(TestEnvConfig {
            history_capacity: 3,
            ..Default::default()
        })
        .await
        .unwrap();

        let comments: Vec<_> = (0..5)
            .map(|i| TestEnvelopes::youtube_comment(&format!("user{}", i), "hello"))
            .collect();
        env.api.push_comments(&comments).await.unwrap();
        env.receiver.recv_many(5).await.unwrap();

        let entries = env.api.history(None).await.unwrap();
        let names: Vec<_> = entries
            .iter()
            .map(|e| e["message"]["name"].as_str().unwrap_or_default().to_string())
            .collect();
        assert_eq!(names, vec!["user4", "user3", "user2"]);

        let latest = env.api.history(Some(1)).await.unwrap();
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0]["message"]["name"], "user4");

        env.cleanup().await.unwrap();
    }

    #[tokio::test]
    async fn test_blocked_message_is_recorded_with_matches() {
        let env = TestEnvironment::setup().await.unwrap();
        let rule_id = env.api.create_rule(&TestRules::big_superchat(100)).await.unwrap();

        env.api
            .push_comments(&[TestEnvelopes::youtube_superchat("bob", 500)])
            .await
            .unwrap();

        let entries = env.api.history(None).await.unwrap();
        assert_eq!(entries[0]["shouldProcess"], false);
        assert_eq!(entries[0]["matchedRuleIds"], json!([rule_id]));
        assert_eq!(entries[0]["sentEndpoints"], json!(["/avatar/superchat"]));

        env.cleanup().await.unwrap();
    }

    #[tokio::test]
    async fn test_disabled_sending_records_without_sending() {
        let env = TestEnvironment::setup().await.unwrap();
        env.api.update_config(&json!({"enabled": false})).await.unwrap();

        env.api
            .push_comments(&[TestEnvelopes::youtube_comment("alice", "quiet")])
            .await
            .unwrap();

        env.receiver.assert_silent(Duration::from_millis(200)).await;
        let entries = env.api.history(None).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["sentEndpoints"], json!([]));
        assert_eq!(env.history.len(), 1);

        env.cleanup().await.unwrap();
    }
}
