//! 消息分发
//!
//! 每条消息依次经过：归一化、规则集评估、按动作发送投影消息、
//! 需要时发送默认路由，最后写入处理历史。发送失败只记录日志，不中断后续发送。

use std::sync::Arc;

use chrono::Utc;
use osc_shared::observability::metrics::{record_message_received, record_osc_send};
use rule_engine::{ActionType, FieldProjector, RuleSetResult, RuleStore};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, error, instrument, warn};

use crate::history::{HistoryEntry, MessageHistory};
use crate::osc::{OscPayload, OscTransport};
use crate::platform::{self, CommentEnvelope, NormalizedMessage};
use crate::settings::{SettingsStore, TransportSettings};

/// 日志中负载预览的最大字符数
const PAYLOAD_PREVIEW_CHARS: usize = 100;

/// 单条消息的分发结果
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchSummary {
    pub message_type: String,
    pub matched_rule_ids: Vec<String>,
    pub sent_endpoints: Vec<String>,
    pub failed_endpoints: Vec<String>,
    pub default_endpoint: String,
    pub should_process: bool,
}

enum SendOutcome {
    Sent,
    Failed,
    Disabled,
}

/// 消息分发器
pub struct Dispatcher {
    store: RuleStore,
    transport: Arc<dyn OscTransport>,
    settings: Arc<SettingsStore>,
    history: Arc<MessageHistory>,
    // 消息逐条处理，前一条的全部发送完成后才开始下一条
    sequence: Mutex<()>,
}

impl Dispatcher {
    pub fn new(
        store: RuleStore,
        transport: Arc<dyn OscTransport>,
        settings: Arc<SettingsStore>,
        history: Arc<MessageHistory>,
    ) -> Self {
        Self {
            store,
            transport,
            settings,
            history,
            sequence: Mutex::new(()),
        }
    }

    /// 分发一个原始信封
    #[instrument(skip(self, envelope), fields(service = %envelope.service))]
    pub async fn dispatch(&self, envelope: &CommentEnvelope) -> DispatchSummary {
        let normalized = platform::normalize(envelope);
        self.dispatch_normalized(normalized).await
    }

    /// 按顺序分发一批信封
    pub async fn dispatch_batch(&self, envelopes: &[CommentEnvelope]) -> Vec<DispatchSummary> {
        let mut summaries = Vec::with_capacity(envelopes.len());
        for envelope in envelopes {
            summaries.push(self.dispatch(envelope).await);
        }
        summaries
    }

    /// 只做规则评估，不发送也不记录历史
    pub fn preview(&self, message: &Value) -> RuleSetResult {
        self.store.processor().process(message)
    }

    async fn dispatch_normalized(&self, normalized: NormalizedMessage) -> DispatchSummary {
        let _turn = self.sequence.lock().await;

        let NormalizedMessage { event, message } = normalized;
        record_message_received(event.platform());

        let result = self.store.processor().process(&message);
        let settings = self.settings.current();
        let default_endpoint = event.default_endpoint();

        let mut sent = Vec::new();
        let mut failed = Vec::new();

        for action in &result.actions {
            if action.action_type != ActionType::RouteToEndpoint {
                debug!(endpoint = %action.endpoint, "跳过不支持的动作类型");
                continue;
            }
            if !action.endpoint.starts_with('/') {
                warn!(endpoint = %action.endpoint, "动作端点必须以 / 开头，已跳过");
                continue;
            }

            let projected = FieldProjector::project(&message, &action.fields);
            match self.send(&settings, &action.endpoint, &projected).await {
                SendOutcome::Sent => sent.push(action.endpoint.clone()),
                SendOutcome::Failed => failed.push(action.endpoint.clone()),
                SendOutcome::Disabled => {}
            }
        }

        if result.should_process {
            match self.send(&settings, &default_endpoint, &message).await {
                SendOutcome::Sent => sent.push(default_endpoint.clone()),
                SendOutcome::Failed => failed.push(default_endpoint.clone()),
                SendOutcome::Disabled => {}
            }
        }

        let matched_rule_ids = result.matched_rule_ids();
        let message_type = message
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        self.history.record(HistoryEntry {
            received_at: Utc::now(),
            message,
            matched_rule_ids: matched_rule_ids.clone(),
            sent_endpoints: sent.clone(),
            should_process: result.should_process,
        });

        debug!(
            message_type = %message_type,
            matched = matched_rule_ids.len(),
            sent = sent.len(),
            failed = failed.len(),
            "消息分发完成"
        );

        DispatchSummary {
            message_type,
            matched_rule_ids,
            sent_endpoints: sent,
            failed_endpoints: failed,
            default_endpoint,
            should_process: result.should_process,
        }
    }

    async fn send(&self, settings: &TransportSettings, endpoint: &str, value: &Value) -> SendOutcome {
        if !settings.enabled {
            return SendOutcome::Disabled;
        }

        let payload = match OscPayload::from_json(value, settings.message_format) {
            Ok(payload) => payload,
            Err(e) => {
                error!(endpoint, error = %e, "消息编码失败");
                record_osc_send(false);
                return SendOutcome::Failed;
            }
        };

        match self.transport.send(endpoint, &payload).await {
            Ok(()) => {
                record_osc_send(true);
                SendOutcome::Sent
            }
            Err(e) => {
                error!(
                    endpoint,
                    payload = %payload.preview(PAYLOAD_PREVIEW_CHARS),
                    error = %e,
                    "OSC 发送失败"
                );
                record_osc_send(false);
                SendOutcome::Failed
            }
        }
    }
}
