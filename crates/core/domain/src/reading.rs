//! 传感器读数。

use crate::error::ReadingError;
use crate::sensor::SensorType;
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;

/// 读数保留天数（存储层据此自动过期）。
pub const READING_TTL_DAYS: i64 = 30;

/// 指标载荷：键集合由传感器类型决定，全部键同时存在。
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    metrics: BTreeMap<String, f64>,
}

impl Payload {
    /// 按 schema 校验并构造载荷；缺键、多键或非有限值均拒绝。
    pub fn for_sensor<I, K>(sensor_type: SensorType, metrics: I) -> Result<Self, ReadingError>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        let mut map = BTreeMap::new();
        for (key, value) in metrics {
            let key = key.into();
            if !sensor_type.is_metric_key(&key) {
                return Err(ReadingError::SchemaMismatch {
                    sensor_type: sensor_type.as_str(),
                    detail: format!("unexpected metric {key}"),
                });
            }
            if !value.is_finite() {
                return Err(ReadingError::InvalidMetric(key));
            }
            map.insert(key, value);
        }
        if let Some(missing) = sensor_type
            .metric_keys()
            .iter()
            .find(|key| !map.contains_key(**key))
        {
            return Err(ReadingError::SchemaMismatch {
                sensor_type: sensor_type.as_str(),
                detail: format!("missing metric {missing}"),
            });
        }
        Ok(Self { metrics: map })
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.metrics.get(key).copied()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.metrics.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.metrics.iter().map(|(key, value)| (key.as_str(), *value))
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    pub(crate) fn to_map(&self) -> BTreeMap<String, f64> {
        self.metrics.clone()
    }
}

/// 单次传感器观测。构造后不可变，移交给发布通道后由其独占。
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    device_id: String,
    sensor_type: SensorType,
    unit_id: Option<u32>,
    room: Option<String>,
    timestamp: DateTime<Utc>,
    ttl: DateTime<Utc>,
    payload: Payload,
}

impl Reading {
    /// 构造读数，`ttl` 固定为 `timestamp + 30 天`。
    pub fn new<I, K>(
        device_id: impl Into<String>,
        sensor_type: SensorType,
        timestamp: DateTime<Utc>,
        metrics: I,
    ) -> Result<Self, ReadingError>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        let payload = Payload::for_sensor(sensor_type, metrics)?;
        Ok(Self {
            device_id: device_id.into(),
            sensor_type,
            unit_id: None,
            room: None,
            timestamp,
            ttl: timestamp + Duration::days(READING_TTL_DAYS),
            payload,
        })
    }

    /// 由已持久化的字段还原（保留存储中的 ttl）。
    pub(crate) fn restore(
        device_id: String,
        sensor_type: SensorType,
        unit_id: Option<u32>,
        room: Option<String>,
        timestamp: DateTime<Utc>,
        ttl: DateTime<Utc>,
        payload: Payload,
    ) -> Self {
        Self {
            device_id,
            sensor_type,
            unit_id,
            room,
            timestamp,
            ttl,
            payload,
        }
    }

    pub fn with_unit(mut self, unit_id: u32) -> Self {
        self.unit_id = Some(unit_id);
        self
    }

    pub fn with_room(mut self, room: impl Into<String>) -> Self {
        self.room = Some(room.into());
        self
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn sensor_type(&self) -> SensorType {
        self.sensor_type
    }

    pub fn unit_id(&self) -> Option<u32> {
        self.unit_id
    }

    pub fn room(&self) -> Option<&str> {
        self.room.as_deref()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn ttl(&self) -> DateTime<Utc> {
        self.ttl
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()
    }

    #[test]
    fn reading_ttl_is_thirty_days_after_timestamp() {
        let reading = Reading::new(
            "building_main_panel",
            SensorType::Building,
            ts(),
            [("total_energy_kwh", 1500.0), ("demand_kw", 80.0)],
        )
        .expect("reading");
        assert_eq!(reading.ttl() - reading.timestamp(), Duration::days(30));
        assert_eq!(reading.payload().len(), 2);
    }

    #[test]
    fn partial_payload_is_rejected() {
        let err = Reading::new(
            "unit_1_hvac",
            SensorType::Hvac,
            ts(),
            [("hvac_power_kw", 1.2)],
        )
        .expect_err("missing key");
        assert!(matches!(err, ReadingError::SchemaMismatch { .. }));
    }

    #[test]
    fn foreign_metric_is_rejected() {
        let err = Reading::new(
            "common_lighting",
            SensorType::Lighting,
            ts(),
            [("lighting_energy_kwh", 2.0), ("humidity", 40.0)],
        )
        .expect_err("extra key");
        assert!(matches!(err, ReadingError::SchemaMismatch { .. }));
    }

    #[test]
    fn non_finite_metric_is_rejected() {
        let err = Reading::new(
            "common_lighting",
            SensorType::Lighting,
            ts(),
            [("lighting_energy_kwh", f64::NAN)],
        )
        .expect_err("nan");
        assert_eq!(
            err,
            ReadingError::InvalidMetric("lighting_energy_kwh".to_string())
        );
    }
}
