/// 读数模型错误。
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReadingError {
    #[error("unknown sensor type: {0}")]
    UnknownSensorType(String),
    #[error("payload does not match {sensor_type} schema: {detail}")]
    SchemaMismatch {
        sensor_type: &'static str,
        detail: String,
    },
    #[error("invalid metric value for {0}")]
    InvalidMetric(String),
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
    #[error("invalid topic: {0}")]
    InvalidTopic(String),
    #[error("codec error: {0}")]
    Codec(String),
}
