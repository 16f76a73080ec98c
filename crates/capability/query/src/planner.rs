//! 访问策略选择与执行。

use crate::error::QueryError;
use crate::merger::merge_pages;
use domain::{QueryFilter, Reading, SensorType, day_end_key, day_start_key};
use ems_storage::{ReadingStore, ScanFilter, SortKeyRange};
use ems_telemetry::{
    record_query_device_index, record_query_failure, record_query_partition, record_query_scan,
};
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// 一次查询选中的存储访问路径。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessStrategy {
    DeviceIndex {
        device_id: String,
        range: Option<SortKeyRange>,
    },
    PartitionKey {
        sensor_type: SensorType,
        range: Option<SortKeyRange>,
    },
    Scan {
        filter: ScanFilter,
    },
}

impl AccessStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            AccessStrategy::DeviceIndex { .. } => "device_index",
            AccessStrategy::PartitionKey { .. } => "partition_key",
            AccessStrategy::Scan { .. } => "scan",
        }
    }
}

impl fmt::Display for AccessStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 按过滤条件的形状选择访问策略，不访问存储。
pub fn plan(filter: &QueryFilter) -> Result<AccessStrategy, QueryError> {
    let range = sort_key_range(filter)?;
    let strategy = match (filter.device_id(), filter.sensor_type) {
        (Some(device_id), None) => AccessStrategy::DeviceIndex {
            device_id: device_id.to_string(),
            range,
        },
        (None, Some(sensor_type)) => AccessStrategy::PartitionKey { sensor_type, range },
        (device_id, sensor_type) => AccessStrategy::Scan {
            filter: ScanFilter {
                device_id: device_id.map(str::to_string),
                sensor_type,
                range,
            },
        },
    };
    Ok(strategy)
}

fn sort_key_range(filter: &QueryFilter) -> Result<Option<SortKeyRange>, QueryError> {
    if let (Some(start), Some(end)) = (filter.start, filter.end) {
        if start > end {
            return Err(QueryError::InvalidRange { start, end });
        }
    }
    if filter.start.is_none() && filter.end.is_none() {
        return Ok(None);
    }
    Ok(Some(SortKeyRange::new(
        filter.start.map(day_start_key),
        filter.end.map(day_end_key),
    )))
}

/// 查询结果及其使用的策略。
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutcome {
    pub strategy: AccessStrategy,
    pub readings: Vec<Reading>,
}

/// 读数查询入口，每次调用无状态。
#[derive(Clone)]
pub struct QueryPlanner {
    store: Arc<dyn ReadingStore>,
}

impl QueryPlanner {
    pub fn new(store: Arc<dyn ReadingStore>) -> Self {
        Self { store }
    }

    /// 规划并执行查询，返回全部匹配读数（存储顺序）。
    pub async fn query(&self, filter: &QueryFilter) -> Result<Vec<Reading>, QueryError> {
        Ok(self.query_with_strategy(filter).await?.readings)
    }

    pub async fn query_with_strategy(
        &self,
        filter: &QueryFilter,
    ) -> Result<QueryOutcome, QueryError> {
        let strategy = plan(filter)?;
        info!(
            target: "ems.query",
            strategy = strategy.name(),
            device_id = ?filter.device_id(),
            sensor_type = ?filter.sensor_type.map(|s| s.as_str()),
            start = ?filter.start,
            end = ?filter.end,
            "query_strategy_selected"
        );
        let readings = self.execute(&strategy).await?;
        Ok(QueryOutcome { strategy, readings })
    }

    /// 按给定策略拉取全部分页。
    pub async fn execute(&self, strategy: &AccessStrategy) -> Result<Vec<Reading>, QueryError> {
        let store = self.store.as_ref();
        let result = match strategy {
            AccessStrategy::DeviceIndex { device_id, range } => {
                record_query_device_index();
                let range = range.as_ref();
                merge_pages(move |token| store.query_device_index(device_id, range, token)).await
            }
            AccessStrategy::PartitionKey { sensor_type, range } => {
                record_query_partition();
                let sensor_type = *sensor_type;
                let range = range.as_ref();
                merge_pages(move |token| store.query_partition(sensor_type, range, token)).await
            }
            AccessStrategy::Scan { filter } => {
                record_query_scan();
                merge_pages(move |token| store.scan(filter, token)).await
            }
        };
        match result {
            Ok(readings) => {
                info!(
                    target: "ems.query",
                    strategy = strategy.name(),
                    count = readings.len(),
                    "query_completed"
                );
                Ok(readings)
            }
            Err(err) => {
                record_query_failure();
                warn!(
                    target: "ems.query",
                    strategy = strategy.name(),
                    error = %err,
                    "query_failed"
                );
                Err(QueryError::Storage(err))
            }
        }
    }
}
