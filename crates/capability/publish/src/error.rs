//! 发布链路错误类型定义

use crate::retry::{RetryError, Retryable};
use domain::ReadingError;

/// 传输层错误
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    /// 建连失败（网络不可达、连接中断等）
    #[error("connect error: {0}")]
    Connect(String),

    /// broker 拒绝连接（认证失败等）
    #[error("connection refused: {0}")]
    Refused(String),

    /// TLS 握手或证书错误
    #[error("tls error: {0}")]
    Tls(String),

    /// 尚未建立连接或已断开
    #[error("not connected")]
    NotConnected,

    /// 发布请求失败
    #[error("publish error: {0}")]
    Publish(String),

    /// 操作超时
    #[error("timeout: {0}")]
    Timeout(String),
}

impl Retryable for TransportError {
    fn is_retryable(&self) -> bool {
        matches!(
            self,
            TransportError::Connect(_) | TransportError::Publish(_) | TransportError::Timeout(_)
        )
    }
}

/// 发布通道错误
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("encode error: {0}")]
    Encode(#[from] ReadingError),
    #[error("channel closed")]
    Closed,
    #[error(transparent)]
    Transport(#[from] RetryError<TransportError>),
}

/// 证书材料解析错误
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("credentials not found: {0}")]
    NotFound(String),
    #[error("incomplete credentials from {0}: certificate and private key must both be present")]
    Incomplete(&'static str),
    #[error("io error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
