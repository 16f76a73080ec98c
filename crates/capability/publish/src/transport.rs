use crate::error::TransportError;
use async_trait::async_trait;

/// 发布服务质量等级。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Qos {
    AtMostOnce,
    #[default]
    AtLeastOnce,
}

impl Qos {
    /// 0 以外的取值一律按至少一次处理。
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => Qos::AtMostOnce,
            _ => Qos::AtLeastOnce,
        }
    }
}

/// 消息 broker 连接抽象。
///
/// 实现方不需要自行串行化调用，`PublishChannel` 保证同一时刻只有一个操作在途。
#[async_trait]
pub trait BrokerTransport: Send + Sync {
    async fn connect(&self) -> Result<(), TransportError>;
    async fn publish(&self, topic: &str, payload: Vec<u8>, qos: Qos) -> Result<(), TransportError>;
    async fn disconnect(&self) -> Result<(), TransportError>;
}
