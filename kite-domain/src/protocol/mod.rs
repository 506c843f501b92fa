//! 协议模型（protocol）
//!
//! 定义消息代理内部流转的逻辑数据形态：
//! - `MessageEntity`/`Header`：入站消息及其元信息；
//! - `Packet`：发往客户端的控制报文（存储结果 ACK、事务状态 ACK 等）。
//!
//! 这里只描述逻辑载荷，字节级编码由传输层负责。
//!
mod header;
mod packet;

pub use header::{Header, MessageBody, MessageEntity, generate_message_id};
pub use packet::{CommandType, Packet, PacketPayload, StoreAck, TxAck, TxStatus};
