//! 应用状态定义
//!
//! 包含 Axum 路由共享的应用状态

use std::sync::Arc;

use rule_engine::RuleStore;

use crate::dispatcher::Dispatcher;
use crate::history::MessageHistory;
use crate::osc::OscTransport;
use crate::settings::SettingsStore;

/// Axum 应用共享状态
///
/// 各组件均通过 Arc 在 handler 间共享
#[derive(Clone)]
pub struct AppState {
    pub store: RuleStore,
    pub dispatcher: Arc<Dispatcher>,
    pub settings: Arc<SettingsStore>,
    pub history: Arc<MessageHistory>,
    pub transport: Arc<dyn OscTransport>,
}

impl AppState {
    /// 组装应用状态，分发器与 handler 共享同一组组件
    pub fn new(
        store: RuleStore,
        transport: Arc<dyn OscTransport>,
        settings: Arc<SettingsStore>,
        history: Arc<MessageHistory>,
    ) -> Self {
        let dispatcher = Arc::new(Dispatcher::new(
            store.clone(),
            transport.clone(),
            settings.clone(),
            history.clone(),
        ));

        Self {
            store,
            dispatcher,
            settings,
            history,
            transport,
        }
    }
}
