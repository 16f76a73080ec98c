//! 稳定的 DTO 与 API 响应契约。

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 标准 API 响应封装。
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

/// 失败响应的错误体。
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError {
                code: code.into(),
                message: message.into(),
            }),
        }
    }
}

/// 读数查询参数（`GET /api/readings`）。
///
/// 日期格式为 `YYYY-MM-DD`，按天闭区间解释。
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingsQuery {
    #[serde(alias = "device_id")]
    pub device_id: Option<String>,
    #[serde(alias = "sensor_type")]
    pub sensor_type: Option<String>,
    #[serde(alias = "startDate", alias = "start_date")]
    pub start: Option<String>,
    #[serde(alias = "endDate", alias = "end_date")]
    pub end: Option<String>,
}

/// 单条读数返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingDto {
    pub device_id: String,
    pub sensor_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    pub edge_time_stamp: String,
    pub ttl: i64,
    pub payload: BTreeMap<String, f64>,
}

/// 读数查询返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingsResponse {
    /// 实际使用的访问策略：`device_index` / `partition_key` / `scan`。
    pub strategy: String,
    pub count: usize,
    pub items: Vec<ReadingDto>,
}

/// 查询侧计数指标快照。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshotDto {
    pub queries_device_index: u64,
    pub queries_partition: u64,
    pub queries_scan: u64,
    pub query_failures: u64,
    pub pages_fetched: u64,
}
