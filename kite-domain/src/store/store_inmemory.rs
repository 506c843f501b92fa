//! 内存版消息存储（InMemoryKiteStore）
//!
//! 以 `DashMap` 按消息 ID 保存消息，支持切换为失败模式以模拟存储故障，
//! 并记录保存调用次数。仅用于测试、示例与本地开发。
//!
use crate::protocol::MessageEntity;
use crate::store::KiteStore;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

#[derive(Default)]
pub struct InMemoryKiteStore {
    entries: DashMap<String, MessageEntity>,
    save_calls: AtomicUsize,
    failing: AtomicBool,
}

impl InMemoryKiteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 切换失败模式：开启后所有保存均返回失败
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Release);
    }

    pub fn query(&self, message_id: &str) -> Option<MessageEntity> {
        self.entries.get(message_id).map(|e| e.value().clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 累计保存调用次数（含失败）
    pub fn save_calls(&self) -> usize {
        self.save_calls.load(Ordering::Acquire)
    }
}

#[async_trait]
impl KiteStore for InMemoryKiteStore {
    async fn save(&self, entity: &MessageEntity) -> bool {
        self.save_calls.fetch_add(1, Ordering::AcqRel);
        if self.failing.load(Ordering::Acquire) {
            tracing::warn!(message_id = entity.message_id(), "in-memory store rejected save");
            return false;
        }
        self.entries
            .insert(entity.message_id().to_string(), entity.clone());
        true
    }
}
