//! 调用方提供的读数查询过滤条件。

use crate::sensor::SensorType;
use chrono::NaiveDate;

/// 查询过滤条件，所有字段可选；时间范围按天闭区间解释。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryFilter {
    pub device_id: Option<String>,
    pub sensor_type: Option<SensorType>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl QueryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn device(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = Some(device_id.into());
        self
    }

    pub fn sensor(mut self, sensor_type: SensorType) -> Self {
        self.sensor_type = Some(sensor_type);
        self
    }

    pub fn between(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    pub fn since(mut self, start: NaiveDate) -> Self {
        self.start = Some(start);
        self
    }

    pub fn until(mut self, end: NaiveDate) -> Self {
        self.end = Some(end);
        self
    }

    /// 空字符串的 device_id 视为未设置。
    pub fn device_id(&self) -> Option<&str> {
        self.device_id
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}
