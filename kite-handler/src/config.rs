//! 阶段配置
//!
//! 构造时确定，运行期不可变。支持 builder 构造与 JSON 加载，两者都经 `validate` 校验。
//!
use crate::dispatcher::DeliveryDispatcher;
use bon::Builder;
use kite_domain::error::{KiteError, KiteResult};
use serde::{Deserialize, Serialize};

pub const DEFAULT_NAME: &str = "kite_persistent";
pub const DEFAULT_MAX_DELIVER_WORKER: usize = 8000;

fn default_name() -> String {
    DEFAULT_NAME.to_string()
}

fn default_max_deliver_worker() -> usize {
    DEFAULT_MAX_DELIVER_WORKER
}

/// 持久化投递阶段配置
#[derive(Builder, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistentHandlerConfig {
    /// 阶段名称
    #[builder(into, default = default_name())]
    #[serde(default = "default_name")]
    pub name: String,
    /// 本实例受理的主题
    #[builder(default)]
    #[serde(default)]
    pub topics: Vec<String>,
    /// 投递槽位池容量
    #[builder(default = DEFAULT_MAX_DELIVER_WORKER)]
    #[serde(default = "default_max_deliver_worker")]
    pub max_deliver_worker: usize,
}

impl Default for PersistentHandlerConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl PersistentHandlerConfig {
    /// 从 JSON 文本加载并校验
    pub fn from_json_str(raw: &str) -> KiteResult<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> KiteResult<()> {
        if self.name.trim().is_empty() {
            return Err(KiteError::invalid_config("name must not be empty"));
        }
        if self.max_deliver_worker == 0 {
            return Err(KiteError::invalid_config(
                "max_deliver_worker must be positive",
            ));
        }
        if self.max_deliver_worker > DeliveryDispatcher::MAX_CAPACITY {
            return Err(KiteError::invalid_config(format!(
                "max_deliver_worker exceeds {}",
                DeliveryDispatcher::MAX_CAPACITY
            )));
        }
        if self.topics.iter().any(|t| t.is_empty()) {
            return Err(KiteError::invalid_config("topic name must not be empty"));
        }
        Ok(())
    }
}
