//! 领域层统一错误定义
//!
//! 聚焦事件类型校验、配置校验、转发与存储等最小必要集合，
//! 便于各流水线阶段统一转换为 `KiteError`。
//!
use thiserror::Error;

/// 统一错误类型（基础库最小必要集）
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum KiteError {
    // --- 流水线 ---
    #[error("invalid event type: expected={expected}, found={found}")]
    InvalidEventType {
        expected: &'static str,
        found: &'static str,
    },
    #[error("forward error: {reason}")]
    Forward { reason: String },

    // --- 配置 ---
    #[error("invalid config: {reason}")]
    InvalidConfig { reason: String },

    // --- 序列化 ---
    #[error("serialization error: {source}")]
    Serde {
        #[from]
        source: serde_json::Error,
    },
}

impl KiteError {
    pub fn forward(reason: impl Into<String>) -> Self {
        Self::Forward {
            reason: reason.into(),
        }
    }

    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}

/// 统一 Result 类型别名
pub type KiteResult<T> = Result<T, KiteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let err = KiteError::InvalidEventType {
            expected: "persistent",
            found: "remoting",
        };
        assert_eq!(
            err.to_string(),
            "invalid event type: expected=persistent, found=remoting"
        );

        let err = KiteError::invalid_config("max_deliver_worker must be positive");
        assert_eq!(
            err.to_string(),
            "invalid config: max_deliver_worker must be positive"
        );
    }

    #[test]
    fn serde_error_converts() {
        let raw = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: KiteError = raw.into();
        assert!(matches!(err, KiteError::Serde { .. }));
    }
}
