use api_contract::{ReadingDto, ReadingsQuery, ReadingsResponse};
use serde_json::Value;
use std::collections::BTreeMap;

#[test]
fn readings_query_accepts_camel_case() {
    let payload = r#"{"deviceId":"unit_2_hvac","sensorType":"hvac","start":"2025-03-01","end":"2025-03-02"}"#;
    let query: ReadingsQuery = serde_json::from_str(payload).expect("parse");
    assert_eq!(query.device_id.as_deref(), Some("unit_2_hvac"));
    assert_eq!(query.sensor_type.as_deref(), Some("hvac"));
    assert_eq!(query.start.as_deref(), Some("2025-03-01"));
    assert_eq!(query.end.as_deref(), Some("2025-03-02"));
}

#[test]
fn readings_query_accepts_snake_case_and_date_aliases() {
    let payload = r#"{"device_id":"unit_1_panel","startDate":"2025-03-01"}"#;
    let query: ReadingsQuery = serde_json::from_str(payload).expect("parse");
    assert_eq!(query.device_id.as_deref(), Some("unit_1_panel"));
    assert_eq!(query.start.as_deref(), Some("2025-03-01"));
    assert!(query.sensor_type.is_none());
    assert!(query.end.is_none());
}

#[test]
fn readings_response_is_camel_case() {
    let mut payload = BTreeMap::new();
    payload.insert("temperature_f".to_string(), 71.5);
    let response = ReadingsResponse {
        strategy: "device_index".to_string(),
        count: 1,
        items: vec![ReadingDto {
            device_id: "unit_1_space_temp_kitchen".to_string(),
            sensor_type: "space_temperature".to_string(),
            unit_id: Some(1),
            room: Some("kitchen".to_string()),
            edge_time_stamp: "2025-03-01T12:00:00.000000Z".to_string(),
            ttl: 1_743_422_400,
            payload,
        }],
    };
    let value = serde_json::to_value(response).expect("serialize");
    let item: &Value = &value["items"][0];
    assert_eq!(value["strategy"], "device_index");
    assert_eq!(item["deviceId"], "unit_1_space_temp_kitchen");
    assert_eq!(item["edgeTimeStamp"], "2025-03-01T12:00:00.000000Z");
    assert_eq!(item["payload"]["temperature_f"], 71.5);
    assert!(item.get("device_id").is_none());
}

#[test]
fn building_level_reading_omits_unit_and_room() {
    let dto = ReadingDto {
        device_id: "building_main_panel".to_string(),
        sensor_type: "building".to_string(),
        unit_id: None,
        room: None,
        edge_time_stamp: "2025-03-01T12:00:00.000000Z".to_string(),
        ttl: 0,
        payload: BTreeMap::new(),
    };
    let value = serde_json::to_value(dto).expect("serialize");
    assert!(value.get("unitId").is_none());
    assert!(value.get("room").is_none());
}
