//! 消息实体与消息头
//!
use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 默认最大投递次数
pub const DEFAULT_DELIVER_LIMIT: i32 = 100;

/// 生成 32 位十六进制的消息 ID
pub fn generate_message_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// 消息头：描述消息的路由与投递语义
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
pub struct Header {
    /// 消息唯一标识
    #[builder(into, default = generate_message_id())]
    message_id: String,
    /// 消息主题
    #[builder(into)]
    topic: String,
    /// 消息类型（主题下的细分类型）
    #[builder(into, default)]
    message_type: String,
    /// 发送方分组
    #[builder(into, default)]
    group_id: String,
    /// 创建时间
    #[builder(default = Utc::now())]
    create_time: DateTime<Utc>,
    /// 过期时间，为空表示不过期
    expired_time: Option<DateTime<Utc>>,
    /// 最大投递次数
    #[builder(default = DEFAULT_DELIVER_LIMIT)]
    deliver_limit: i32,
    /// fly 模式：不持久化，尽力投递
    #[builder(default)]
    fly: bool,
    /// 是否已提交；未提交的消息属于进行中的事务
    #[builder(default)]
    commit: bool,
}

impl Header {
    pub fn message_id(&self) -> &str {
        &self.message_id
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn message_type(&self) -> &str {
        &self.message_type
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn create_time(&self) -> DateTime<Utc> {
        self.create_time
    }

    pub fn expired_time(&self) -> Option<DateTime<Utc>> {
        self.expired_time
    }

    pub fn deliver_limit(&self) -> i32 {
        self.deliver_limit
    }

    pub fn fly(&self) -> bool {
        self.fly
    }

    pub fn commit(&self) -> bool {
        self.commit
    }
}

/// 消息体：本层不做解析
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageBody {
    Text(String),
    Bytes(Vec<u8>),
}

impl MessageBody {
    pub fn len(&self) -> usize {
        match self {
            MessageBody::Text(s) => s.len(),
            MessageBody::Bytes(b) => b.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<String> for MessageBody {
    fn from(value: String) -> Self {
        MessageBody::Text(value)
    }
}

impl From<&str> for MessageBody {
    fn from(value: &str) -> Self {
        MessageBody::Text(value.to_string())
    }
}

impl From<Vec<u8>> for MessageBody {
    fn from(value: Vec<u8>) -> Self {
        MessageBody::Bytes(value)
    }
}

/// 消息实体：流水线处理的基本单元
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEntity {
    header: Header,
    body: MessageBody,
}

impl MessageEntity {
    pub fn new(header: Header, body: impl Into<MessageBody>) -> Self {
        Self {
            header,
            body: body.into(),
        }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn body(&self) -> &MessageBody {
        &self.body
    }

    pub fn message_id(&self) -> &str {
        self.header.message_id()
    }

    pub fn topic(&self) -> &str {
        self.header.topic()
    }
}
