use chrono::{Duration, TimeZone, Utc};
use domain::{Reading, ReadingError, SensorType, WireRecord, decode_reading, encode_reading};

fn sample_reading() -> Reading {
    let ts = Utc.with_ymd_and_hms(2024, 5, 1, 8, 15, 30).unwrap();
    Reading::new(
        "unit_2_space_temp_kitchen",
        SensorType::SpaceTemperature,
        ts,
        [("temperature_f", 70.25)],
    )
    .expect("reading")
    .with_unit(2)
    .with_room("kitchen")
}

#[test]
fn wire_record_is_flat_json() {
    let payload = encode_reading(&sample_reading()).expect("encode");
    let value: serde_json::Value = serde_json::from_slice(&payload).expect("json");
    assert_eq!(value["device_id"], "unit_2_space_temp_kitchen");
    assert_eq!(value["sensor_type"], "space_temperature");
    assert_eq!(value["unit_id"], 2);
    assert_eq!(value["room"], "kitchen");
    assert_eq!(value["edge_time_stamp"], "2024-05-01T08:15:30.000000Z");
    assert_eq!(value["temperature_f"], 70.25);
    let expected_ttl = (Utc.with_ymd_and_hms(2024, 5, 1, 8, 15, 30).unwrap() + Duration::days(30))
        .timestamp();
    assert_eq!(value["ttl"], expected_ttl);
}

#[test]
fn building_record_omits_unit_and_room() {
    let ts = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
    let reading = Reading::new(
        "building_main_panel",
        SensorType::Building,
        ts,
        [("total_energy_kwh", 1200.5), ("demand_kw", 90.0)],
    )
    .expect("reading");
    let record = WireRecord::from(&reading);
    let value = serde_json::to_value(&record).expect("json");
    assert!(value.get("unit_id").is_none());
    assert!(value.get("room").is_none());
}

#[test]
fn decode_restores_reading() {
    let reading = sample_reading();
    let decoded = decode_reading(&encode_reading(&reading).expect("encode")).expect("decode");
    assert_eq!(decoded, reading);
}

#[test]
fn decode_accepts_integer_metrics() {
    let payload = br#"{"device_id":"unit_1_hvac","sensor_type":"hvac","unit_id":1,
        "edge_time_stamp":"2024-05-01T08:00:00.000000Z","ttl":1717142400,
        "hvac_runtime_minutes":42,"hvac_power_kw":1.5}"#;
    let reading = decode_reading(payload).expect("decode");
    assert_eq!(reading.payload().get("hvac_runtime_minutes"), Some(42.0));
    assert_eq!(reading.unit_id(), Some(1));
}

#[test]
fn decode_rejects_partial_payload() {
    let payload = br#"{"device_id":"unit_1_hvac","sensor_type":"hvac",
        "edge_time_stamp":"2024-05-01T08:00:00.000000Z","ttl":1717142400,
        "hvac_power_kw":1.5}"#;
    let err = decode_reading(payload).expect_err("partial");
    assert!(matches!(err, ReadingError::SchemaMismatch { .. }));
}
