//! 读数线格式：每条读数一条扁平 JSON 记录。

use crate::error::ReadingError;
use crate::reading::{Payload, Reading};
use crate::sensor::SensorType;
use crate::time::{format_sort_key, parse_sort_key};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 扁平线格式记录，指标字段与公共字段并列。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireRecord {
    pub device_id: String,
    pub sensor_type: SensorType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    pub edge_time_stamp: String,
    /// 过期时间（epoch 秒）。
    pub ttl: i64,
    #[serde(flatten)]
    pub metrics: BTreeMap<String, f64>,
}

impl From<&Reading> for WireRecord {
    fn from(reading: &Reading) -> Self {
        Self {
            device_id: reading.device_id().to_string(),
            sensor_type: reading.sensor_type(),
            unit_id: reading.unit_id(),
            room: reading.room().map(str::to_string),
            edge_time_stamp: format_sort_key(&reading.timestamp()),
            ttl: reading.ttl().timestamp(),
            metrics: reading.payload().to_map(),
        }
    }
}

impl TryFrom<WireRecord> for Reading {
    type Error = ReadingError;

    fn try_from(record: WireRecord) -> Result<Self, Self::Error> {
        let timestamp = parse_sort_key(&record.edge_time_stamp)?;
        let ttl = DateTime::<Utc>::from_timestamp(record.ttl, 0)
            .ok_or_else(|| ReadingError::InvalidTimestamp(record.ttl.to_string()))?;
        let payload = Payload::for_sensor(record.sensor_type, record.metrics)?;
        Ok(Reading::restore(
            record.device_id,
            record.sensor_type,
            record.unit_id,
            record.room,
            timestamp,
            ttl,
            payload,
        ))
    }
}

/// 编码为发布载荷。
pub fn encode_reading(reading: &Reading) -> Result<Vec<u8>, ReadingError> {
    serde_json::to_vec(&WireRecord::from(reading))
        .map_err(|err| ReadingError::Codec(err.to_string()))
}

/// 从发布载荷解码。
pub fn decode_reading(payload: &[u8]) -> Result<Reading, ReadingError> {
    let record: WireRecord =
        serde_json::from_slice(payload).map_err(|err| ReadingError::Codec(err.to_string()))?;
    Reading::try_from(record)
}
