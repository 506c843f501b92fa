//! 转发器（Forwarder）协议
//!
//! 流水线阶段通过组合该能力把出站事件交给下一阶段，
//! 从调用方视角为“发出即忘”。
//!
use super::PipelineEvent;
use crate::error::KiteResult as Result;
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait Forwarder: Send + Sync {
    async fn forward(&self, event: PipelineEvent) -> Result<()>;
}

#[async_trait]
impl<T> Forwarder for Arc<T>
where
    T: Forwarder + ?Sized,
{
    async fn forward(&self, event: PipelineEvent) -> Result<()> {
        (**self).forward(event).await
    }
}
