//! 发送失败隔离测试套件
//!
//! 单个端点发送失败只记录日志，同一消息的后续发送和后续消息照常进行。

use std::sync::Arc;

use async_trait::async_trait;
use osc_router::{
    Dispatcher, MessageHistory, OscPayload, OscTransport, RouterError, SettingsStore,
    TransportSettings, platform::CommentEnvelope,
};
use parking_lot::Mutex;
use rule_engine::{Action, Condition, InMemoryRuleRepository, Operator, RuleDefinition, RuleStore};

use crate::data::*;

/// 对指定端点总是失败的发送器，记录所有尝试
struct FlakyTransport {
    failing_endpoint: &'static str,
    attempts: Mutex<Vec<String>>,
}

impl FlakyTransport {
    fn new(failing_endpoint: &'static str) -> Self {
        Self {
            failing_endpoint,
            attempts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl OscTransport for FlakyTransport {
    async fn send(&self, endpoint: &str, _payload: &OscPayload) -> Result<(), RouterError> {
        self.attempts.lock().push(endpoint.to_string());
        if endpoint == self.failing_endpoint {
            return Err(RouterError::Io(std::io::Error::other("network unreachable")));
        }
        Ok(())
    }

    fn retarget(&self, _target: &str) {}
}

async fn dispatcher_with(rules: Vec<RuleDefinition>, transport: Arc<FlakyTransport>) -> (Dispatcher, Arc<MessageHistory>) {
    let store = RuleStore::new(Arc::new(InMemoryRuleRepository::with_rules(rules)));
    store.reload().await;

    let history = Arc::new(MessageHistory::new(10));
    let dispatcher = Dispatcher::new(
        store,
        transport,
        Arc::new(SettingsStore::in_memory(TransportSettings::default())),
        history.clone(),
    );
    (dispatcher, history)
}

fn envelope(value: serde_json::Value) -> CommentEnvelope {
    CommentEnvelope::from_value(&value).unwrap()
}

#[cfg(test)]
mod failure_isolation_tests {
    use super::*;

    #[tokio::test]
    async fn test_failed_rule_endpoint_does_not_stop_default() {
        let transport = Arc::new(FlakyTransport::new("/broken"));
        let rule = RuleDefinition::new("r1", "broken route")
            .with_conditions(None, vec![Condition::new("comment", Operator::Contains, "hi")])
            .with_action(Action::route_to("/broken"))
            .with_action(Action::route_to("/working"));
        let (dispatcher, history) = dispatcher_with(vec![rule], transport.clone()).await;

        let summary = dispatcher
            .dispatch(&envelope(TestEnvelopes::youtube_comment("alice", "hi there")))
            .await;

        assert_eq!(
            *transport.attempts.lock(),
            vec!["/broken", "/working", "/onecomme/youtube/comment"]
        );
        assert_eq!(summary.failed_endpoints, vec!["/broken"]);
        assert_eq!(summary.sent_endpoints, vec!["/working", "/onecomme/youtube/comment"]);

        let entries = history.list(None);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].sent_endpoints.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_default_does_not_stop_next_message() {
        let transport = Arc::new(FlakyTransport::new("/onecomme/youtube/comment"));
        let (dispatcher, history) = dispatcher_with(Vec::new(), transport.clone()).await;

        let summaries = dispatcher
            .dispatch_batch(&[
                envelope(TestEnvelopes::youtube_comment("alice", "one")),
                envelope(TestEnvelopes::twitch_cheer("bob", 50)),
            ])
            .await;

        assert_eq!(summaries[0].failed_endpoints, vec!["/onecomme/youtube/comment"]);
        assert_eq!(summaries[1].sent_endpoints, vec!["/onecomme/twitch/cheer"]);
        assert_eq!(history.len(), 2);
    }
}
