//! 流水线处理阶段（PipelineHandler）
//!
//! 定义单个阶段的名称、可处理的事件类别与处理逻辑。
//!
use super::PipelineEvent;
use crate::error::KiteResult as Result;
use async_trait::async_trait;

#[async_trait]
pub trait PipelineHandler: Send + Sync {
    /// 阶段名称（用于日志与审计）
    fn name(&self) -> &str;

    /// 是否处理该类别的事件
    fn accepts(&self, event: &PipelineEvent) -> bool;

    /// 处理事件；仅当事件形态不符时返回错误
    async fn process(&self, event: PipelineEvent) -> Result<()>;
}
