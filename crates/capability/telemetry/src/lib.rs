//! 追踪、请求 ID 生成与进程级计数指标。

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::{EnvFilter, fmt};

/// 请求级追踪标识。
#[derive(Debug, Clone)]
pub struct RequestIds {
    pub request_id: String,
    pub trace_id: String,
}

/// 指标快照。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub readings_generated: u64,
    pub publish_success: u64,
    pub publish_failure: u64,
    pub publish_retries: u64,
    pub tick_failures: u64,
    pub queries_device_index: u64,
    pub queries_partition: u64,
    pub queries_scan: u64,
    pub query_failures: u64,
    pub pages_fetched: u64,
}

/// 进程级计数指标。
pub struct TelemetryMetrics {
    readings_generated: AtomicU64,
    publish_success: AtomicU64,
    publish_failure: AtomicU64,
    publish_retries: AtomicU64,
    tick_failures: AtomicU64,
    queries_device_index: AtomicU64,
    queries_partition: AtomicU64,
    queries_scan: AtomicU64,
    query_failures: AtomicU64,
    pages_fetched: AtomicU64,
}

impl TelemetryMetrics {
    pub fn new() -> Self {
        Self {
            readings_generated: AtomicU64::new(0),
            publish_success: AtomicU64::new(0),
            publish_failure: AtomicU64::new(0),
            publish_retries: AtomicU64::new(0),
            tick_failures: AtomicU64::new(0),
            queries_device_index: AtomicU64::new(0),
            queries_partition: AtomicU64::new(0),
            queries_scan: AtomicU64::new(0),
            query_failures: AtomicU64::new(0),
            pages_fetched: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            readings_generated: self.readings_generated.load(Ordering::Relaxed),
            publish_success: self.publish_success.load(Ordering::Relaxed),
            publish_failure: self.publish_failure.load(Ordering::Relaxed),
            publish_retries: self.publish_retries.load(Ordering::Relaxed),
            tick_failures: self.tick_failures.load(Ordering::Relaxed),
            queries_device_index: self.queries_device_index.load(Ordering::Relaxed),
            queries_partition: self.queries_partition.load(Ordering::Relaxed),
            queries_scan: self.queries_scan.load(Ordering::Relaxed),
            query_failures: self.query_failures.load(Ordering::Relaxed),
            pages_fetched: self.pages_fetched.load(Ordering::Relaxed),
        }
    }
}

impl Default for TelemetryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

static METRICS: OnceLock<TelemetryMetrics> = OnceLock::new();

/// 获取全局指标实例。
pub fn metrics() -> &'static TelemetryMetrics {
    METRICS.get_or_init(TelemetryMetrics::new)
}

/// 初始化 tracing（默认 info）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// 生成新的 request_id 与 trace_id。
pub fn new_request_ids() -> RequestIds {
    RequestIds {
        request_id: uuid::Uuid::new_v4().to_string(),
        trace_id: uuid::Uuid::new_v4().to_string(),
    }
}

/// 记录生成的读数。
pub fn record_reading_generated() {
    metrics().readings_generated.fetch_add(1, Ordering::Relaxed);
}

/// 记录发布成功（含重试后成功）。
pub fn record_publish_success() {
    metrics().publish_success.fetch_add(1, Ordering::Relaxed);
}

/// 记录重试耗尽后的发布失败。
pub fn record_publish_failure() {
    metrics().publish_failure.fetch_add(1, Ordering::Relaxed);
}

/// 记录发布重试次数（不含首次尝试）。
pub fn record_publish_retry() {
    metrics().publish_retries.fetch_add(1, Ordering::Relaxed);
}

/// 记录失败的发射周期（生成或发布失败）。
pub fn record_tick_failure() {
    metrics().tick_failures.fetch_add(1, Ordering::Relaxed);
}

/// 记录设备索引查询。
pub fn record_query_device_index() {
    metrics().queries_device_index.fetch_add(1, Ordering::Relaxed);
}

/// 记录分区键查询。
pub fn record_query_partition() {
    metrics().queries_partition.fetch_add(1, Ordering::Relaxed);
}

/// 记录全表扫描查询。
pub fn record_query_scan() {
    metrics().queries_scan.fetch_add(1, Ordering::Relaxed);
}

/// 记录存储层查询失败。
pub fn record_query_failure() {
    metrics().query_failures.fetch_add(1, Ordering::Relaxed);
}

/// 记录拉取的结果页数。
pub fn record_page_fetched() {
    metrics().pages_fetched.fetch_add(1, Ordering::Relaxed);
}
