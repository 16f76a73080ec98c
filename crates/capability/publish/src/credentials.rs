//! TLS 证书材料解析。
//!
//! 客户端证书与私钥由 [`CredentialProvider`] 链按顺序解析，第一个给出结果的来源生效；
//! 根证书从候选路径列表中取第一个存在的文件。

use crate::error::CredentialError;
use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 证书目录下的默认文件名。
pub const CERTIFICATE_FILE: &str = "certificate.pem.crt";
pub const PRIVATE_KEY_FILE: &str = "private.pem.key";

/// 客户端证书与私钥（PEM 字节）。
#[derive(Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    pub certificate: Vec<u8>,
    pub private_key: Vec<u8>,
}

impl fmt::Debug for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientIdentity")
            .field("certificate_len", &self.certificate.len())
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// 双向 TLS 所需的全部材料。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsMaterial {
    pub root_ca: Vec<u8>,
    pub identity: ClientIdentity,
}

/// 客户端身份来源。
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// 来源不可用时返回 `Ok(None)`，交给链上的下一个来源。
    async fn client_identity(&self) -> Result<Option<ClientIdentity>, CredentialError>;
}

/// 由调用方直接给出的 PEM 文本（通常来自环境变量）。
#[derive(Debug, Clone, Default)]
pub struct StaticCredentialProvider {
    certificate_pem: Option<String>,
    private_key_pem: Option<String>,
}

impl StaticCredentialProvider {
    pub fn new(certificate_pem: Option<String>, private_key_pem: Option<String>) -> Self {
        Self {
            certificate_pem,
            private_key_pem,
        }
    }
}

#[async_trait]
impl CredentialProvider for StaticCredentialProvider {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn client_identity(&self) -> Result<Option<ClientIdentity>, CredentialError> {
        match (&self.certificate_pem, &self.private_key_pem) {
            (Some(certificate), Some(private_key)) => Ok(Some(ClientIdentity {
                certificate: certificate.as_bytes().to_vec(),
                private_key: private_key.as_bytes().to_vec(),
            })),
            (None, None) => Ok(None),
            _ => Err(CredentialError::Incomplete(self.name())),
        }
    }
}

/// 证书目录下的 `certificate.pem.crt` 与 `private.pem.key`。
#[derive(Debug, Clone)]
pub struct FileCredentialProvider {
    dir: PathBuf,
}

impl FileCredentialProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl CredentialProvider for FileCredentialProvider {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn client_identity(&self) -> Result<Option<ClientIdentity>, CredentialError> {
        let certificate = read_if_exists(&self.dir.join(CERTIFICATE_FILE)).await?;
        let private_key = read_if_exists(&self.dir.join(PRIVATE_KEY_FILE)).await?;
        match (certificate, private_key) {
            (Some(certificate), Some(private_key)) => Ok(Some(ClientIdentity {
                certificate,
                private_key,
            })),
            (None, None) => Ok(None),
            _ => Err(CredentialError::Incomplete(self.name())),
        }
    }
}

/// 按顺序尝试多个来源。
#[derive(Default)]
pub struct ChainCredentialProvider {
    providers: Vec<Box<dyn CredentialProvider>>,
}

impl ChainCredentialProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, provider: impl CredentialProvider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    /// 链上没有任何来源给出身份时返回 `NotFound`。
    pub async fn resolve(&self) -> Result<ClientIdentity, CredentialError> {
        for provider in &self.providers {
            if let Some(identity) = provider.client_identity().await? {
                info!(target: "ems.publish", source = provider.name(), "client_identity_resolved");
                return Ok(identity);
            }
            debug!(target: "ems.publish", source = provider.name(), "client_identity_unavailable");
        }
        let sources: Vec<&str> = self.providers.iter().map(|p| p.name()).collect();
        Err(CredentialError::NotFound(format!(
            "client certificate (tried: {})",
            sources.join(", ")
        )))
    }
}

/// 读取第一个存在的根证书文件。
pub async fn resolve_root_ca(candidates: &[PathBuf]) -> Result<Vec<u8>, CredentialError> {
    for path in candidates {
        if let Some(bytes) = read_if_exists(path).await? {
            info!(target: "ems.publish", path = %path.display(), "root_ca_resolved");
            return Ok(bytes);
        }
    }
    let tried: Vec<String> = candidates
        .iter()
        .map(|path| path.display().to_string())
        .collect();
    Err(CredentialError::NotFound(format!(
        "root CA (tried: {})",
        tried.join(", ")
    )))
}

async fn read_if_exists(path: &Path) -> Result<Option<Vec<u8>>, CredentialError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(CredentialError::Io {
            path: path.display().to_string(),
            source,
        }),
    }
}
