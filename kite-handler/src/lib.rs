//! 持久化投递阶段（kite-handler）
//!
//! 消息代理流水线中决定“是否持久化、是否回执、是否投递”的阶段：
//! - `topic`：主题准入过滤，有序主题集合上的二分查找；
//! - `ack`：构造存储结果 ACK 与事务状态 ACK；
//! - `dispatcher`：固定容量的投递槽位池，非阻塞获取，取不到时在调用方上下文同步执行；
//! - `persistent`：按（主题是否受理，fly，commit）分类消息并编排 持久化 → 回执 → 投递；
//! - `config`：阶段配置与校验。
//!
pub mod ack;
pub mod config;
pub mod dispatcher;
pub mod persistent;
pub mod topic;

pub use config::PersistentHandlerConfig;
pub use dispatcher::{DeliveryDispatcher, DispatchMode};
pub use persistent::PersistentHandler;
pub use topic::TopicFilter;
