//! 规则路由测试套件
//!
//! 测试规则命中后的端点路由、字段投影、发送顺序与默认路由阻止。

use crate::data::*;
use crate::setup::TestEnvironment;
use serde_json::json;
use std::time::Duration;

#[cfg(test)]
mod rule_routing_tests {
    use super::*;

    #[tokio::test]
    async fn test_projection_and_block_default() {
        let env = TestEnvironment::setup().await.unwrap();
        env.api.create_rule(&TestRules::big_superchat(1000)).await.unwrap();

        let summaries = env
            .api
            .push_comments(&[TestEnvelopes::youtube_superchat("bob", 5000)])
            .await
            .unwrap();
        assert_eq!(summaries[0]["shouldProcess"], false);

        let received = env.receiver.recv_many(1).await.unwrap();
        assert_eq!(received[0].address, "/avatar/superchat");
        // 未启用的 comment 字段不出现在投影中
        assert_eq!(received[0].body, json!({"name": "bob", "price": 5000}));

        env.receiver.assert_silent(Duration::from_millis(200)).await;
        env.cleanup().await.unwrap();
    }

    #[tokio::test]
    async fn test_below_threshold_falls_back_to_default() {
        let env = TestEnvironment::setup().await.unwrap();
        env.api.create_rule(&TestRules::big_superchat(1000)).await.unwrap();

        env.api
            .push_comments(&[TestEnvelopes::youtube_superchat("bob", 999)])
            .await
            .unwrap();

        let received = env.receiver.recv_many(1).await.unwrap();
        assert_eq!(received[0].address, "/onecomme/youtube/super");
        assert_eq!(received[0].body["paidText"], "¥999");

        env.cleanup().await.unwrap();
    }

    #[tokio::test]
    async fn test_rule_sends_precede_default_in_store_order() {
        let env = TestEnvironment::setup().await.unwrap();
        env.api
            .create_rule(&TestRules::keyword("草", "/fx/laugh"))
            .await
            .unwrap();
        env.api
            .create_rule(&TestRules::keyword("草草", "/fx/big-laugh"))
            .await
            .unwrap();

        env.api
            .push_comments(&[TestEnvelopes::youtube_comment("alice", "草草草")])
            .await
            .unwrap();

        let received = env.receiver.recv_many(3).await.unwrap();
        let addresses: Vec<_> = received.iter().map(|m| m.address.as_str()).collect();
        assert_eq!(
            addresses,
            vec!["/fx/laugh", "/fx/big-laugh", "/onecomme/youtube/comment"]
        );
        // 空字段选择发送完整消息
        assert_eq!(received[0].body, received[2].body);

        env.cleanup().await.unwrap();
    }

    #[tokio::test]
    async fn test_messages_are_sent_in_arrival_order() {
        let env = TestEnvironment::setup().await.unwrap();
        env.api
            .create_rule(&TestRules::keyword("!", "/fx/exclaim"))
            .await
            .unwrap();

        env.api
            .push_comments(&[
                TestEnvelopes::youtube_comment("a", "first!"),
                TestEnvelopes::youtube_comment("b", "second"),
                TestEnvelopes::youtube_comment("c", "third!"),
            ])
            .await
            .unwrap();

        let received = env.receiver.recv_many(5).await.unwrap();
        let trail: Vec<_> = received
            .iter()
            .map(|m| format!("{}:{}", m.address, m.body["name"].as_str().unwrap_or_default()))
            .collect();
        assert_eq!(
            trail,
            vec![
                "/fx/exclaim:a",
                "/onecomme/youtube/comment:a",
                "/onecomme/youtube/comment:b",
                "/fx/exclaim:c",
                "/onecomme/youtube/comment:c",
            ]
        );

        env.cleanup().await.unwrap();
    }

    #[tokio::test]
    async fn test_disabled_rule_is_ignored() {
        let env = TestEnvironment::setup().await.unwrap();
        let mut rule = TestRules::big_superchat(1);
        rule["enabled"] = json!(false);
        env.api.create_rule(&rule).await.unwrap();

        env.api
            .push_comments(&[TestEnvelopes::youtube_superchat("bob", 5000)])
            .await
            .unwrap();

        let received = env.receiver.recv_many(1).await.unwrap();
        assert_eq!(received[0].address, "/onecomme/youtube/super");

        env.cleanup().await.unwrap();
    }
}
