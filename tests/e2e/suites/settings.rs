//! 发送设置与持久化测试套件
//!
//! 测试目标切换、负载格式切换，以及规则与设置的文件持久化。

use crate::data::*;
use crate::helpers::OscReceiver;
use crate::setup::{TestEnvConfig, TestEnvironment};
use osc_router::{SettingsStore, TransportSettings};
use serde_json::json;
use std::time::Duration;

#[cfg(test)]
mod settings_tests {
    use super::*;

    #[tokio::test]
    async fn test_retarget_to_new_receiver() {
        let env = TestEnvironment::setup().await.unwrap();
        let second = OscReceiver::bind().await.unwrap();

        let saved = env
            .api
            .update_config(&json!({"port": second.port()}))
            .await
            .unwrap();
        assert_eq!(saved["host"], "127.0.0.1");

        env.api
            .push_comments(&[TestEnvelopes::youtube_comment("alice", "moved")])
            .await
            .unwrap();

        let received = second.recv_many(1).await.unwrap();
        assert_eq!(received[0].body["comment"], "moved");
        env.receiver.assert_silent(Duration::from_millis(200)).await;

        // 设置已落盘，重新启动时优先于配置文件
        let reloaded = SettingsStore::load_or(env.settings_path(), TransportSettings::default()).await;
        assert_eq!(reloaded.current().port, second.port());

        env.cleanup().await.unwrap();
    }

    #[tokio::test]
    async fn test_binary_format_sends_blob() {
        let env = TestEnvironment::setup_with(TestEnvConfig {
            message_format: "binary",
            ..Default::default()
        })
        .await
        .unwrap();

        env.api
            .push_comments(&[TestEnvelopes::twitch_cheer("carol", 300)])
            .await
            .unwrap();

        let received = env.receiver.recv_many(1).await.unwrap();
        assert_eq!(received[0].type_tag, 'b');
        assert_eq!(received[0].body["bits"], 300);

        env.api
            .update_config(&json!({"messageFormat": "string"}))
            .await
            .unwrap();
        env.api
            .push_comments(&[TestEnvelopes::twitch_cheer("carol", 10)])
            .await
            .unwrap();
        assert_eq!(env.receiver.recv_many(1).await.unwrap()[0].type_tag, 's');

        env.cleanup().await.unwrap();
    }

    #[tokio::test]
    async fn test_rules_survive_restart_and_explicit_reload() {
        let env = TestEnvironment::setup().await.unwrap();
        env.api.create_rule(&TestRules::big_superchat(100)).await.unwrap();

        let persisted = tokio::fs::read_to_string(env.rules_path()).await.unwrap();
        let rules: serde_json::Value = serde_json::from_str(&persisted).unwrap();
        assert_eq!(rules.as_array().unwrap().len(), 1);

        // 外部修改规则文件，显式重新加载后生效
        let mut edited = rules.clone();
        edited
            .as_array_mut()
            .unwrap()
            .push(json!({"id": "external", "name": "外部规则", "actions": []}));
        tokio::fs::write(env.rules_path(), serde_json::to_string(&edited).unwrap())
            .await
            .unwrap();

        assert_eq!(env.store.len(), 1);
        assert_eq!(env.api.reload_rules().await.unwrap(), 2);
        let listed = env.api.list_rules().await.unwrap();
        assert_eq!(listed[1]["id"], "external");

        env.cleanup().await.unwrap();
    }
}
