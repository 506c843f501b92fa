//! 回执构造
//!
//! 纯函数，只分配输出报文，不产生其他副作用。
//!
use kite_domain::protocol::{Header, Packet, PacketPayload, StoreAck, TxAck, TxStatus};

/// 主题未被本实例受理
pub const FEEDBACK_UNSUPPORTED_TOPIC: &str = "UnSupport Topic Message!";
/// fly 且已提交的消息无需持久化
pub const FEEDBACK_FLY_NO_NEED_SAVE: &str = "FLY NO NEED SAVE";
/// fly 消息必须为已提交状态
pub const FEEDBACK_FLY_MUST_BE_COMMITTED: &str = "FLY MUST BE COMMITTED !";
/// 事务回查原因
pub const TX_CHECK_REASON: &str = "Server Check";

/// 存储结果 ACK：响应报文，沿用请求 opaque
pub fn build_store_ack(opaque: i32, message_id: &str, succeeded: bool, feedback: &str) -> Packet {
    Packet::response(
        opaque,
        PacketPayload::StoreAck(StoreAck::new(message_id, succeeded, feedback)),
    )
}

/// 事务状态 ACK：告知发送方事务状态未知，由服务端稍后回查
pub fn build_tx_ack(header: Header) -> Packet {
    Packet::request(PacketPayload::TxAck(TxAck::new(
        header,
        TxStatus::Unknown,
        TX_CHECK_REASON,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kite_domain::protocol::CommandType;

    #[test]
    fn store_ack_carries_result() {
        let packet = build_store_ack(9, "m-1", false, FEEDBACK_UNSUPPORTED_TOPIC);
        assert_eq!(packet.opaque(), 9);
        assert!(packet.is_response());
        assert_eq!(packet.cmd_type(), CommandType::MessageStoreAck);

        let ack = packet.as_store_ack().unwrap();
        assert_eq!(ack.message_id(), "m-1");
        assert!(!ack.status());
        assert_eq!(ack.feedback(), "UnSupport Topic Message!");
    }

    #[test]
    fn store_ack_success_with_empty_feedback() {
        let packet = build_store_ack(1, "m-2", true, "");
        let ack = packet.as_store_ack().unwrap();
        assert!(ack.status());
        assert!(ack.feedback().is_empty());
    }

    #[test]
    fn tx_ack_is_unknown_server_check() {
        let header = Header::builder().message_id("m-3").topic("orders").build();
        let packet = build_tx_ack(header.clone());
        assert!(!packet.is_response());
        assert_eq!(packet.cmd_type(), CommandType::TxAck);

        let ack = packet.as_tx_ack().unwrap();
        assert_eq!(ack.header(), &header);
        assert_eq!(ack.status(), TxStatus::Unknown);
        assert_eq!(ack.feedback(), "Server Check");
    }
}
