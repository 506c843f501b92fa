//! 控制报文（Packet）
//!
//! 出站控制消息的逻辑形态：`opaque` 关联请求与响应，`cmd_type` 标识命令，
//! `payload` 为强类型载荷。字节编码由传输层负责。
//!
use super::Header;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};

static OPAQUE_SEQ: AtomicU32 = AtomicU32::new(0);

/// 分配新的请求 opaque，保持非负
fn next_opaque() -> i32 {
    (OPAQUE_SEQ.fetch_add(1, Ordering::Relaxed) & i32::MAX as u32) as i32
}

/// 命令类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum CommandType {
    Heartbeat = 0x01,
    ConnMeta = 0x02,
    ConnAuth = 0x03,
    MessageStoreAck = 0x04,
    DeliverAck = 0x05,
    TxAck = 0x06,
    BytesMessage = 0x11,
    StringMessage = 0x12,
}

impl CommandType {
    pub const fn code(self) -> u8 {
        self as u8
    }
}

/// 事务状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum TxStatus {
    /// 状态未知，由服务端稍后回查
    Unknown = 0,
    Commit = 1,
    Rollback = 2,
}

/// 存储结果 ACK
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreAck {
    message_id: String,
    status: bool,
    feedback: String,
}

impl StoreAck {
    pub fn new(message_id: impl Into<String>, status: bool, feedback: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
            status,
            feedback: feedback.into(),
        }
    }

    pub fn message_id(&self) -> &str {
        &self.message_id
    }

    pub fn status(&self) -> bool {
        self.status
    }

    pub fn feedback(&self) -> &str {
        &self.feedback
    }
}

/// 事务状态 ACK
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxAck {
    header: Header,
    status: TxStatus,
    feedback: String,
}

impl TxAck {
    pub fn new(header: Header, status: TxStatus, feedback: impl Into<String>) -> Self {
        Self {
            header,
            status,
            feedback: feedback.into(),
        }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn status(&self) -> TxStatus {
        self.status
    }

    pub fn feedback(&self) -> &str {
        &self.feedback
    }
}

/// 报文载荷
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PacketPayload {
    StoreAck(StoreAck),
    TxAck(TxAck),
}

impl PacketPayload {
    pub fn cmd_type(&self) -> CommandType {
        match self {
            PacketPayload::StoreAck(_) => CommandType::MessageStoreAck,
            PacketPayload::TxAck(_) => CommandType::TxAck,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Packet {
    opaque: i32,
    cmd_type: CommandType,
    response: bool,
    payload: PacketPayload,
}

impl Packet {
    /// 响应报文：沿用请求方的 opaque
    pub fn response(opaque: i32, payload: PacketPayload) -> Self {
        Self {
            opaque,
            cmd_type: payload.cmd_type(),
            response: true,
            payload,
        }
    }

    /// 请求报文：分配新的 opaque
    pub fn request(payload: PacketPayload) -> Self {
        Self {
            opaque: next_opaque(),
            cmd_type: payload.cmd_type(),
            response: false,
            payload,
        }
    }

    pub fn opaque(&self) -> i32 {
        self.opaque
    }

    pub fn cmd_type(&self) -> CommandType {
        self.cmd_type
    }

    pub fn is_response(&self) -> bool {
        self.response
    }

    pub fn payload(&self) -> &PacketPayload {
        &self.payload
    }

    pub fn as_store_ack(&self) -> Option<&StoreAck> {
        match &self.payload {
            PacketPayload::StoreAck(ack) => Some(ack),
            _ => None,
        }
    }

    pub fn as_tx_ack(&self) -> Option<&TxAck> {
        match &self.payload {
            PacketPayload::TxAck(ack) => Some(ack),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_keeps_opaque_and_cmd() {
        let packet = Packet::response(
            42,
            PacketPayload::StoreAck(StoreAck::new("m-1", true, "")),
        );
        assert_eq!(packet.opaque(), 42);
        assert!(packet.is_response());
        assert_eq!(packet.cmd_type(), CommandType::MessageStoreAck);
        assert_eq!(packet.cmd_type().code(), 0x04);
        assert_eq!(packet.as_store_ack().map(|a| a.message_id()), Some("m-1"));
        assert!(packet.as_tx_ack().is_none());
    }

    #[test]
    fn request_allocates_fresh_opaque() {
        let header = Header::builder().topic("orders").build();
        let p1 = Packet::request(PacketPayload::TxAck(TxAck::new(
            header.clone(),
            TxStatus::Unknown,
            "Server Check",
        )));
        let p2 = Packet::request(PacketPayload::TxAck(TxAck::new(
            header,
            TxStatus::Unknown,
            "Server Check",
        )));
        assert!(!p1.is_response());
        assert_eq!(p1.cmd_type(), CommandType::TxAck);
        assert_ne!(p1.opaque(), p2.opaque());
        assert!(p1.opaque() >= 0 && p2.opaque() >= 0);
    }

    #[test]
    fn tx_status_codes() {
        assert_eq!(TxStatus::Unknown as i32, 0);
        assert_eq!(TxStatus::Commit as i32, 1);
        assert_eq!(TxStatus::Rollback as i32, 2);
    }
}
