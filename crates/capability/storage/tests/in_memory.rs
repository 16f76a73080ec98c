use chrono::{DateTime, TimeZone, Utc};
use domain::{Reading, SensorType, day_end_key, day_start_key};
use ems_storage::{
    ContinuationToken, DEFAULT_PAGE_SIZE, InMemoryReadingStore, ReadingStore, ScanFilter,
    SortKeyRange,
};

fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, day, hour, 0, 0).unwrap()
}

fn hvac(unit: u32, ts: DateTime<Utc>) -> Reading {
    Reading::new(
        format!("unit_{unit}_hvac"),
        SensorType::Hvac,
        ts,
        [("hvac_runtime_minutes", 30.0), ("hvac_power_kw", 1.5)],
    )
    .expect("reading")
    .with_unit(unit)
}

fn lighting(ts: DateTime<Utc>) -> Reading {
    Reading::new(
        "common_lighting",
        SensorType::Lighting,
        ts,
        [("lighting_energy_kwh", 2.5)],
    )
    .expect("reading")
}

fn seeded_store(page_size: usize) -> InMemoryReadingStore {
    let store = InMemoryReadingStore::with_page_size(page_size);
    store
        .insert_many([
            hvac(2, at(3, 10)),
            lighting(at(1, 8)),
            hvac(1, at(1, 9)),
            hvac(2, at(1, 12)),
            hvac(2, at(2, 6)),
            lighting(at(2, 9)),
        ])
        .expect("seed");
    store
}

#[tokio::test]
async fn partition_query_orders_by_sort_key() {
    let store = seeded_store(10);
    let page = store
        .query_partition(SensorType::Hvac, None, None)
        .await
        .expect("page");

    assert!(page.next.is_none());
    let stamps: Vec<_> = page.items.iter().map(|r| r.timestamp()).collect();
    assert_eq!(stamps, vec![at(1, 9), at(1, 12), at(2, 6), at(3, 10)]);
}

#[tokio::test]
async fn device_index_respects_closed_day_range() {
    let store = seeded_store(10);
    let range = SortKeyRange::new(
        Some(day_start_key(at(1, 0).date_naive())),
        Some(day_end_key(at(2, 0).date_naive())),
    );
    let page = store
        .query_device_index("unit_2_hvac", Some(&range), None)
        .await
        .expect("page");

    let stamps: Vec<_> = page.items.iter().map(|r| r.timestamp()).collect();
    assert_eq!(stamps, vec![at(1, 12), at(2, 6)]);
}

#[tokio::test]
async fn half_open_range_keeps_everything_after_start() {
    let store = seeded_store(10);
    let range = SortKeyRange::new(Some(day_start_key(at(2, 0).date_naive())), None);
    let page = store
        .query_partition(SensorType::Lighting, Some(&range), None)
        .await
        .expect("page");

    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].timestamp(), at(2, 9));
}

#[tokio::test]
async fn pages_chain_through_continuation_tokens() {
    let store = seeded_store(2);
    let first = store
        .query_partition(SensorType::Hvac, None, None)
        .await
        .expect("first");
    assert_eq!(first.items.len(), 2);
    let second = store
        .query_partition(SensorType::Hvac, None, first.next.clone())
        .await
        .expect("second");
    assert_eq!(second.items.len(), 2);
    assert!(second.next.is_none());
    assert_eq!(second.items[1].timestamp(), at(3, 10));
}

#[tokio::test]
async fn scan_applies_conjunctive_filter() {
    let store = seeded_store(10);
    let filter = ScanFilter {
        device_id: Some("unit_2_hvac".to_string()),
        sensor_type: Some(SensorType::Hvac),
        range: None,
    };
    let page = store.scan(&filter, None).await.expect("page");
    assert_eq!(page.items.len(), 3);
    assert!(page.items.iter().all(|r| r.device_id() == "unit_2_hvac"));

    let everything = store.scan(&ScanFilter::default(), None).await.expect("page");
    assert_eq!(everything.items.len(), store.len());
    // 扫描保持存储顺序
    assert_eq!(everything.items[0].timestamp(), at(3, 10));
}

#[tokio::test]
async fn no_match_is_an_empty_final_page() {
    let store = seeded_store(10);
    let page = store
        .query_device_index("unit_9_hvac", None, None)
        .await
        .expect("page");
    assert!(page.items.is_empty());
    assert!(page.next.is_none());
}

#[tokio::test]
async fn garbage_token_is_a_storage_error() {
    let store = seeded_store(10);
    let err = store
        .scan(&ScanFilter::default(), Some(ContinuationToken::new("not-a-token")))
        .await
        .expect_err("invalid token");
    assert!(err.to_string().contains("invalid continuation token"));
}

#[tokio::test]
async fn default_store_pages_at_default_size() {
    let store = InMemoryReadingStore::new();
    let base = at(1, 0);
    store
        .insert_many((0..=DEFAULT_PAGE_SIZE as i64).map(|offset| {
            lighting(base + chrono::Duration::seconds(offset))
        }))
        .expect("insert");

    let first = store
        .query_partition(SensorType::Lighting, None, None)
        .await
        .expect("first page");
    assert_eq!(first.items.len(), DEFAULT_PAGE_SIZE);
    let token = first.next.expect("continuation");

    let second = store
        .query_partition(SensorType::Lighting, None, Some(token))
        .await
        .expect("second page");
    assert_eq!(second.items.len(), 1);
    assert!(second.next.is_none());
}
