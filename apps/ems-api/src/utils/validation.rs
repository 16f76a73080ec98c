//! 输入验证辅助函数
//!
//! - normalize_optional：去除首尾空格，空串视为未提供
//! - parse_sensor_type / parse_date：失败返回 bad_request_error 响应

use crate::utils::response::bad_request_error;
use axum::response::Response;
use chrono::NaiveDate;
use domain::SensorType;

/// 可选字段去除空格，空串视为未提供
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub fn parse_sensor_type(value: &str) -> Result<SensorType, Response> {
    value
        .parse::<SensorType>()
        .map_err(|_| bad_request_error(format!("unknown sensorType {value}")))
}

/// 日期格式 YYYY-MM-DD
pub fn parse_date(value: &str, field: &str) -> Result<NaiveDate, Response> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| bad_request_error(format!("{field} must be YYYY-MM-DD")))
}
