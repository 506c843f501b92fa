//! Kite 消息代理领域层基础库（kite-domain）
//!
//! 提供消息代理流水线各阶段共享的模型与协作者协议：
//! - 消息实体与消息头（`protocol::MessageEntity`、`protocol::Header`）
//! - 出站控制报文（`protocol::Packet`）：存储结果 ACK、事务状态 ACK
//! - 流水线事件（`pipeline::PipelineEvent`）与转发能力（`pipeline::Forwarder`）
//! - 持久化存储协议（`store::KiteStore`）
//! - 流量统计计数器（`stat::FlowRecorder`、`stat::FlowStat`）
//!
//! 本 crate 只定义协议与最小必要的错误类型，不绑定具体的存储引擎与网络传输，
//! 启用 `inmemory` 特性时附带内存版实现，便于测试与本地开发。
//!
//! 典型用法：
//! 1. 由上游阶段构造 `PersistentEvent` 并包装为 `PipelineEvent::Persistent`；
//! 2. 流水线阶段实现 `PipelineHandler`，处理后通过 `Forwarder` 把出站事件交给下游；
//! 3. 存储、转发与统计均以 trait 对象注入，便于替换为真实基础设施。
//!
pub mod error;
pub mod pipeline;
pub mod protocol;
pub mod stat;
pub mod store;
