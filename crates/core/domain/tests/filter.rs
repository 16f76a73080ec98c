use chrono::NaiveDate;
use domain::{QueryFilter, SensorType};

#[test]
fn filter_builder_sets_fields() {
    let start = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
    let filter = QueryFilter::new()
        .device("unit_2_hvac")
        .sensor(SensorType::Hvac)
        .between(start, end);
    assert_eq!(filter.device_id(), Some("unit_2_hvac"));
    assert_eq!(filter.sensor_type, Some(SensorType::Hvac));
    assert_eq!(filter.start, Some(start));
    assert_eq!(filter.end, Some(end));
}

#[test]
fn blank_device_id_counts_as_absent() {
    let filter = QueryFilter::new().device("   ");
    assert!(filter.device_id().is_none());
}
