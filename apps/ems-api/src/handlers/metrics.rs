//! 进程计数指标快照。
//!
//! - GET /metrics

use api_contract::{ApiResponse, MetricsSnapshotDto};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use ems_telemetry::metrics;

pub async fn get_metrics() -> Response {
    let snapshot = metrics().snapshot();
    (
        StatusCode::OK,
        Json(ApiResponse::success(MetricsSnapshotDto {
            queries_device_index: snapshot.queries_device_index,
            queries_partition: snapshot.queries_partition,
            queries_scan: snapshot.queries_scan,
            query_failures: snapshot.query_failures,
            pages_fetched: snapshot.pages_fetched,
        })),
    )
        .into_response()
}
