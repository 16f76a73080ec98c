//! # 发布通道能力模块
//!
//! 集群内所有发射器共享的唯一出站连接：
//!
//! ```text
//! Emitter ──publish(topic, Reading)──▶ PublishChannel ──▶ BrokerTransport ──▶ broker
//!                                         │
//!                                         ├── RetryPolicy (connect: 5 次指数退避)
//!                                         └── RetryPolicy (publish: 3 次固定 1s)
//! ```
//!
//! - [`retry`]：可复用的重试策略（最大次数、延迟函数、可重试分类）
//! - [`transport`]：`BrokerTransport` 接口与 QoS
//! - [`mqtt`]：基于 rumqttc 的传输实现（支持客户端证书 TLS）
//! - [`credentials`]：TLS 证书材料解析
//! - [`channel`]：串行化访问传输层的 `PublishChannel`

pub mod channel;
pub mod credentials;
pub mod error;
pub mod mqtt;
pub mod retry;
pub mod transport;

pub use channel::{PublishChannel, PublishReceipt};
pub use credentials::{
    ChainCredentialProvider, ClientIdentity, CredentialProvider, FileCredentialProvider,
    StaticCredentialProvider, TlsMaterial, resolve_root_ca,
};
pub use error::{CredentialError, PublishError, TransportError};
pub use mqtt::{MqttTransport, MqttTransportConfig};
pub use retry::{Attempted, Backoff, RetryError, RetryPolicy, Retryable};
pub use transport::{BrokerTransport, Qos};
