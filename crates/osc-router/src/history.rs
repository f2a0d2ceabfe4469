//! 处理历史
//!
//! 固定容量的环形缓冲，只保存在内存中。

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;

/// 单条处理记录
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub received_at: DateTime<Utc>,
    pub message: Value,
    pub matched_rule_ids: Vec<String>,
    pub sent_endpoints: Vec<String>,
    pub should_process: bool,
}

/// 消息处理历史
#[derive(Debug)]
pub struct MessageHistory {
    capacity: usize,
    entries: Mutex<VecDeque<HistoryEntry>>,
}

impl MessageHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// 追加记录，超出容量时淘汰最旧的一条
    pub fn record(&self, entry: HistoryEntry) {
        if self.capacity == 0 {
            return;
        }
        let mut entries = self.entries.lock();
        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// 最新的在前；`limit` 为空时返回全部
    pub fn list(&self, limit: Option<usize>) -> Vec<HistoryEntry> {
        let entries = self.entries.lock();
        let take = limit.unwrap_or(entries.len());
        entries.iter().rev().take(take).cloned().collect()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl Default for MessageHistory {
    fn default() -> Self {
        Self::new(100)
    }
}
