//! 默认路由测试套件
//!
//! 无规则命中时，完整的归一化消息发送到 `/onecomme/{平台}/{种类}`。

use crate::data::*;
use crate::setup::TestEnvironment;

#[cfg(test)]
mod default_routing_tests {
    use super::*;

    #[tokio::test]
    async fn test_plain_comment_goes_to_default_endpoint() {
        let env = TestEnvironment::setup().await.unwrap();

        let summaries = env
            .api
            .push_comments(&[TestEnvelopes::youtube_comment("alice", "こんにちは")])
            .await
            .unwrap();
        assert_eq!(summaries[0]["sentEndpoints"][0], "/onecomme/youtube/comment");

        let received = env.receiver.recv_many(1).await.unwrap();
        assert_eq!(received[0].address, "/onecomme/youtube/comment");
        assert_eq!(received[0].type_tag, 's');
        assert_eq!(received[0].body["type"], "youtube-comment");
        assert_eq!(received[0].body["name"], "alice");
        assert_eq!(received[0].body["comment"], "こんにちは");
        assert_eq!(received[0].body["hasGift"], false);

        env.cleanup().await.unwrap();
    }

    #[tokio::test]
    async fn test_paid_events_use_their_kind() {
        let env = TestEnvironment::setup().await.unwrap();

        env.api
            .push_comments(&[
                TestEnvelopes::youtube_superchat("bob", 500),
                TestEnvelopes::bilibili_guard("小明", 3),
                TestEnvelopes::twitch_cheer("carol", 100),
            ])
            .await
            .unwrap();

        let received = env.receiver.recv_many(3).await.unwrap();
        let addresses: Vec<_> = received.iter().map(|m| m.address.as_str()).collect();
        assert_eq!(
            addresses,
            vec!["/onecomme/youtube/super", "/onecomme/bilibili/guard", "/onecomme/twitch/cheer"]
        );

        assert_eq!(received[0].body["price"], 500);
        assert_eq!(received[0].body["hasGift"], true);
        assert_eq!(received[1].body["guardLevel"], 3);
        assert_eq!(received[2].body["bits"], 100);

        env.cleanup().await.unwrap();
    }

    #[tokio::test]
    async fn test_unknown_service_is_routed_by_name() {
        let env = TestEnvironment::setup().await.unwrap();

        env.api
            .push_comments(&[serde_json::json!({
                "service": "Mildom",
                "data": {"name": "dave", "comment": "hi"}
            })])
            .await
            .unwrap();

        let received = env.receiver.recv_many(1).await.unwrap();
        assert_eq!(received[0].address, "/onecomme/mildom/comment");
        assert_eq!(received[0].body["type"], "mildom-comment");

        env.cleanup().await.unwrap();
    }
}
