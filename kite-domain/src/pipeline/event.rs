//! 流水线事件
//!
//! 以和类型表达各阶段之间交换的事件，入口处按判别值匹配，
//! 不依赖运行时类型探测。
//!
use crate::protocol::{Header, MessageEntity, Packet};
use std::fmt;
use std::sync::Arc;

/// 远端连接：本层只用其地址回写 ACK，不读写连接状态
pub trait RemoteClient: fmt::Debug + Send + Sync {
    fn remote_addr(&self) -> &str;
}

/// 仅携带地址的远端连接
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteAddr(String);

impl RemoteAddr {
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }
}

impl RemoteClient for RemoteAddr {
    fn remote_addr(&self) -> &str {
        &self.0
    }
}

/// 待持久化事件：由上游解包客户端消息后产生
#[derive(Debug, Clone)]
pub struct PersistentEvent {
    entity: Option<MessageEntity>,
    opaque: i32,
    remote_client: Arc<dyn RemoteClient>,
}

impl PersistentEvent {
    pub fn new(
        entity: Option<MessageEntity>,
        opaque: i32,
        remote_client: Arc<dyn RemoteClient>,
    ) -> Self {
        Self {
            entity,
            opaque,
            remote_client,
        }
    }

    pub fn entity(&self) -> Option<&MessageEntity> {
        self.entity.as_ref()
    }

    pub fn opaque(&self) -> i32 {
        self.opaque
    }

    pub fn remote_client(&self) -> &Arc<dyn RemoteClient> {
        &self.remote_client
    }

    /// 拆分为各组成部分，便于阶段内按所有权转移实体
    pub fn into_parts(self) -> (Option<MessageEntity>, i32, Arc<dyn RemoteClient>) {
        (self.entity, self.opaque, self.remote_client)
    }
}

/// 出站网络事件：报文 + 目标地址
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemotingEvent {
    packet: Packet,
    targets: Vec<String>,
}

impl RemotingEvent {
    pub fn new(packet: Packet, targets: Vec<String>) -> Self {
        Self { packet, targets }
    }

    pub fn packet(&self) -> &Packet {
        &self.packet
    }

    pub fn targets(&self) -> &[String] {
        &self.targets
    }
}

/// 投递准备事件：交给下游投递子系统
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliverPreEvent {
    message_id: String,
    header: Header,
    entity: MessageEntity,
}

impl DeliverPreEvent {
    pub fn new(message_id: impl Into<String>, header: Header, entity: MessageEntity) -> Self {
        Self {
            message_id: message_id.into(),
            header,
            entity,
        }
    }

    /// 由消息实体构造
    pub fn from_entity(entity: MessageEntity) -> Self {
        let header = entity.header().clone();
        Self::new(header.message_id().to_string(), header, entity)
    }

    pub fn message_id(&self) -> &str {
        &self.message_id
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn entity(&self) -> &MessageEntity {
        &self.entity
    }
}

/// 流水线事件
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    Persistent(PersistentEvent),
    Remoting(RemotingEvent),
    DeliverPre(DeliverPreEvent),
}

impl PipelineEvent {
    /// 事件类别名，用于日志与错误信息
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineEvent::Persistent(_) => "persistent",
            PipelineEvent::Remoting(_) => "remoting",
            PipelineEvent::DeliverPre(_) => "deliver_pre",
        }
    }

    pub fn as_remoting(&self) -> Option<&RemotingEvent> {
        match self {
            PipelineEvent::Remoting(ev) => Some(ev),
            _ => None,
        }
    }

    pub fn as_deliver_pre(&self) -> Option<&DeliverPreEvent> {
        match self {
            PipelineEvent::DeliverPre(ev) => Some(ev),
            _ => None,
        }
    }
}

impl From<PersistentEvent> for PipelineEvent {
    fn from(value: PersistentEvent) -> Self {
        PipelineEvent::Persistent(value)
    }
}

impl From<RemotingEvent> for PipelineEvent {
    fn from(value: RemotingEvent) -> Self {
        PipelineEvent::Remoting(value)
    }
}

impl From<DeliverPreEvent> for PipelineEvent {
    fn from(value: DeliverPreEvent) -> Self {
        PipelineEvent::DeliverPre(value)
    }
}
