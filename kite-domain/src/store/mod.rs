//! 持久化存储（store）
//!
//! 定义消息存储引擎的最小协议。持久化的落盘格式、耐久级别与一致性
//! 均属于存储引擎自身，本层只关心一次保存是否成功。
//!
#[cfg(feature = "inmemory")]
mod store_inmemory;

use crate::protocol::MessageEntity;
use async_trait::async_trait;
use std::sync::Arc;

#[cfg(feature = "inmemory")]
pub use store_inmemory::InMemoryKiteStore;

#[async_trait]
pub trait KiteStore: Send + Sync {
    /// 持久化一条消息，返回是否成功；超时等异常由存储引擎自行转换为失败
    async fn save(&self, entity: &MessageEntity) -> bool;
}

#[async_trait]
impl<T> KiteStore for Arc<T>
where
    T: KiteStore + ?Sized,
{
    async fn save(&self, entity: &MessageEntity) -> bool {
        (**self).save(entity).await
    }
}
