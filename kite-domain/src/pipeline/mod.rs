//! 流水线（pipeline）
//!
//! 提供流水线阶段之间交换的事件形态与最小协作能力：
//! - `PipelineEvent`：阶段间流转的事件（带判别的和类型）；
//! - `Forwarder`：把出站事件交给下一阶段；
//! - `PipelineHandler`：单个处理阶段的协议；
//! - `ChannelForwarder`：基于 tokio mpsc 的内存版转发器（`inmemory` 特性）。
//!
//! 该模块不包含调度框架本身，阶段通过组合 `Forwarder` 获得转发能力。
//!
pub mod event;
pub mod forwarder;
#[cfg(feature = "inmemory")]
pub mod forwarder_inmemory;
pub mod handler;

pub use event::{
    DeliverPreEvent, PersistentEvent, PipelineEvent, RemoteAddr, RemoteClient, RemotingEvent,
};
pub use forwarder::Forwarder;
#[cfg(feature = "inmemory")]
pub use forwarder_inmemory::ChannelForwarder;
pub use handler::PipelineHandler;
