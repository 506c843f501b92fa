//! 内存版转发器（ChannelForwarder）
//!
//! 基于 `tokio::sync::mpsc` 的无界通道实现 `Forwarder`：
//! - `forward`：把事件送入通道；
//! - `channel`：同时返回 `'static` 生命周期的出站事件流，便于在 `tokio::spawn` 中消费；
//! - 典型用途：测试环境、示例与本地开发。
//!
//! 注意：接收端被丢弃后转发将返回 `KiteError::Forward`。

use crate::error::{KiteError, KiteResult as Result};
use crate::pipeline::{Forwarder, PipelineEvent};
use async_trait::async_trait;
use futures_core::stream::BoxStream;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

/// 简单的通道转发器
#[derive(Clone)]
pub struct ChannelForwarder {
    tx: mpsc::UnboundedSender<PipelineEvent>,
}

impl ChannelForwarder {
    /// 创建转发器及其出站事件流
    pub fn channel() -> (Self, BoxStream<'static, PipelineEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, Box::pin(UnboundedReceiverStream::new(rx)))
    }
}

#[async_trait]
impl Forwarder for ChannelForwarder {
    async fn forward(&self, event: PipelineEvent) -> Result<()> {
        self.tx
            .send(event)
            .map_err(|e| KiteError::forward(format!("receiver dropped: {}", e.0.kind())))
    }
}
