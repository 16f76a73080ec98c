//! 读数查询 handlers
//!
//! - GET /readings?deviceId=&sensorType=&start=YYYY-MM-DD&end=YYYY-MM-DD

use crate::AppState;
use crate::utils::response::{bad_request_error, reading_to_dto, storage_error};
use crate::utils::validation::{normalize_optional, parse_date, parse_sensor_type};
use api_contract::{ApiResponse, ReadingDto, ReadingsQuery, ReadingsResponse};
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use domain::QueryFilter;
use ems_query::QueryError;

pub async fn list_readings(
    State(state): State<AppState>,
    Query(query): Query<ReadingsQuery>,
) -> Response {
    let filter = match readings_filter(query) {
        Ok(filter) => filter,
        Err(response) => return response,
    };
    match state.planner.query_with_strategy(&filter).await {
        Ok(outcome) => {
            let items: Vec<ReadingDto> = outcome.readings.iter().map(reading_to_dto).collect();
            (
                StatusCode::OK,
                Json(ApiResponse::success(ReadingsResponse {
                    strategy: outcome.strategy.name().to_string(),
                    count: items.len(),
                    items,
                })),
            )
                .into_response()
        }
        Err(QueryError::InvalidRange { .. }) => bad_request_error("start must be <= end"),
        Err(QueryError::Storage(err)) => storage_error(err),
    }
}

fn readings_filter(query: ReadingsQuery) -> Result<QueryFilter, Response> {
    let device_id = normalize_optional(query.device_id);
    let sensor_type = match normalize_optional(query.sensor_type) {
        Some(value) => Some(parse_sensor_type(&value)?),
        None => None,
    };
    let start = match normalize_optional(query.start) {
        Some(value) => Some(parse_date(&value, "start")?),
        None => None,
    };
    let end = match normalize_optional(query.end) {
        Some(value) => Some(parse_date(&value, "end")?),
        None => None,
    };
    Ok(QueryFilter {
        device_id,
        sensor_type,
        start,
        end,
    })
}
