//! 应用运行配置加载。

use std::env;
use std::path::PathBuf;

/// 配置加载错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env: {0}")]
    Missing(String),
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
}

/// 集群发布器配置。
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    pub iot_endpoint: String,
    pub iot_port: u16,
    pub client_id: String,
    pub tls_enabled: bool,
    /// 根证书候选路径，按顺序取第一个存在的文件。
    pub root_ca_paths: Vec<PathBuf>,
    pub cert_dir: PathBuf,
    pub certificate_pem: Option<String>,
    pub private_key_pem: Option<String>,
    pub mqtt_username: Option<String>,
    pub mqtt_password: Option<String>,
    pub publish_qos: u8,
    pub unit_count: u32,
    pub stagger_ms: u64,
}

impl SimulatorConfig {
    /// 从环境变量读取配置。
    pub fn from_env() -> Result<Self, ConfigError> {
        let iot_endpoint = read_optional("EMS_IOT_ENDPOINT")
            .ok_or_else(|| ConfigError::Missing("EMS_IOT_ENDPOINT".to_string()))?;
        let tls_enabled = read_bool_with_default("EMS_IOT_TLS", true);
        let iot_port =
            read_u16_with_default("EMS_IOT_PORT", if tls_enabled { 8883 } else { 1883 })?;
        let client_id =
            env::var("EMS_IOT_CLIENT_ID").unwrap_or_else(|_| "ems-simulated-device".to_string());
        let mut root_ca_paths = Vec::new();
        if let Some(path) = read_optional("EMS_IOT_ROOT_CA_PATH") {
            root_ca_paths.push(PathBuf::from(path));
        }
        root_ca_paths.push(PathBuf::from("./AmazonRootCA1.pem"));
        root_ca_paths.push(PathBuf::from("./certs/AmazonRootCA1.pem"));
        let cert_dir = PathBuf::from(
            env::var("EMS_IOT_CERT_DIR").unwrap_or_else(|_| "./certs".to_string()),
        );
        let certificate_pem = read_optional("EMS_IOT_CERTIFICATE_PEM");
        let private_key_pem = read_optional("EMS_IOT_PRIVATE_KEY_PEM");
        let mqtt_username = read_optional("EMS_MQTT_USERNAME");
        let mqtt_password = read_optional("EMS_MQTT_PASSWORD");
        let publish_qos = read_u8_with_default("EMS_PUBLISH_QOS", 1)?;
        if publish_qos > 1 {
            return Err(ConfigError::Invalid(
                "EMS_PUBLISH_QOS".to_string(),
                publish_qos.to_string(),
            ));
        }
        let unit_count = read_u32_with_default("EMS_UNIT_COUNT", 4)?;
        let stagger_ms = read_u64_with_default("EMS_STAGGER_MS", 200)?;

        Ok(Self {
            iot_endpoint,
            iot_port,
            client_id,
            tls_enabled,
            root_ca_paths,
            cert_dir,
            certificate_pem,
            private_key_pem,
            mqtt_username,
            mqtt_password,
            publish_qos,
            unit_count,
            stagger_ms,
        })
    }
}

/// 读数查询 API 配置。
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub http_addr: String,
    pub database_url: String,
    pub query_page_size: u32,
}

impl ApiConfig {
    /// 从环境变量读取配置。
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("EMS_DATABASE_URL")
            .map_err(|_| ConfigError::Missing("EMS_DATABASE_URL".to_string()))?;
        let http_addr = env::var("EMS_HTTP_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let query_page_size = read_u32_with_default("EMS_QUERY_PAGE_SIZE", 500)?;
        if query_page_size == 0 {
            return Err(ConfigError::Invalid(
                "EMS_QUERY_PAGE_SIZE".to_string(),
                "0".to_string(),
            ));
        }
        Ok(Self {
            http_addr,
            database_url,
            query_page_size,
        })
    }
}

fn read_u16_with_default(key: &str, default: u16) -> Result<u16, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u16>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_u8_with_default(key: &str, default: u8) -> Result<u8, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u8>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_u32_with_default(key: &str, default: u32) -> Result<u32, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u32>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_u64_with_default(key: &str, default: u64) -> Result<u64, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u64>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_optional(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.is_empty() => Some(value),
        _ => None,
    }
}

fn read_bool_with_default(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(value) => matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "on"),
        Err(_) => default,
    }
}
