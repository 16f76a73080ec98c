//! HTTP 响应辅助函数和 DTO 转换
//!
//! - 错误响应：bad_request_error, storage_error
//! - DTO 转换：reading_to_dto
//!
//! 所有错误返回统一的 ApiResponse 格式。

use api_contract::{ApiResponse, ReadingDto};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use domain::{Reading, format_sort_key};
use ems_storage::StorageError;
use tracing::error;

/// 错误请求响应
pub fn bad_request_error(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::<()>::error("INVALID.REQUEST", message.into())),
    )
        .into_response()
}

/// 存储错误响应
pub fn storage_error(err: StorageError) -> Response {
    let message = err.to_string();
    error!(target: "ems.api", error = %message, "storage_error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::<()>::error("INTERNAL.ERROR", message)),
    )
        .into_response()
}

/// Reading 转 ReadingDto
pub fn reading_to_dto(reading: &Reading) -> ReadingDto {
    ReadingDto {
        device_id: reading.device_id().to_string(),
        sensor_type: reading.sensor_type().as_str().to_string(),
        unit_id: reading.unit_id(),
        room: reading.room().map(str::to_string),
        edge_time_stamp: format_sort_key(&reading.timestamp()),
        ttl: reading.ttl().timestamp(),
        payload: reading
            .payload()
            .iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect(),
    }
}
