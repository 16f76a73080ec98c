//! 读数内存存储
//!
//! 续读令牌是匹配结果中的偏移量；每次调用都重新筛选，适合小数据量。

use crate::error::StorageError;
use crate::traits::{ContinuationToken, ReadingStore, ResultPage, ScanFilter, SortKeyRange};
use domain::{Reading, SensorType, format_sort_key};
use std::sync::RwLock;

/// 默认页大小
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// 读数内存存储
pub struct InMemoryReadingStore {
    readings: RwLock<Vec<Reading>>,
    page_size: usize,
}

impl InMemoryReadingStore {
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    /// `page_size` 为 0 时按 1 处理
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            readings: RwLock::new(Vec::new()),
            page_size: page_size.max(1),
        }
    }

    pub fn insert(&self, reading: Reading) -> Result<(), StorageError> {
        let mut readings = self
            .readings
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        readings.push(reading);
        Ok(())
    }

    pub fn insert_many(
        &self,
        items: impl IntoIterator<Item = Reading>,
    ) -> Result<usize, StorageError> {
        let mut readings = self
            .readings
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let before = readings.len();
        readings.extend(items);
        Ok(readings.len() - before)
    }

    pub fn len(&self) -> usize {
        self.readings.read().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn select<F>(&self, sorted: bool, predicate: F) -> Result<Vec<Reading>, StorageError>
    where
        F: Fn(&Reading) -> bool,
    {
        let readings = self
            .readings
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        let mut selected: Vec<Reading> = readings
            .iter()
            .filter(|&reading| predicate(reading))
            .cloned()
            .collect();
        if sorted {
            selected.sort_by_key(|reading| reading.timestamp());
        }
        Ok(selected)
    }

    fn page(
        &self,
        selected: Vec<Reading>,
        token: Option<ContinuationToken>,
    ) -> Result<ResultPage, StorageError> {
        let offset = match &token {
            Some(token) => token
                .as_str()
                .parse::<usize>()
                .map_err(|_| StorageError::invalid_token(token.as_str()))?,
            None => 0,
        };
        if offset > selected.len() {
            return Err(StorageError::invalid_token(&offset.to_string()));
        }
        let end = (offset + self.page_size).min(selected.len());
        let next = (end < selected.len()).then(|| ContinuationToken::new(end.to_string()));
        let items = selected.into_iter().skip(offset).take(end - offset).collect();
        Ok(ResultPage { items, next })
    }
}

impl Default for InMemoryReadingStore {
    fn default() -> Self {
        Self::new()
    }
}

fn in_range(range: Option<&SortKeyRange>, reading: &Reading) -> bool {
    range.is_none_or(|range| range.contains(&format_sort_key(&reading.timestamp())))
}

#[async_trait::async_trait]
impl ReadingStore for InMemoryReadingStore {
    async fn query_partition(
        &self,
        sensor_type: SensorType,
        range: Option<&SortKeyRange>,
        token: Option<ContinuationToken>,
    ) -> Result<ResultPage, StorageError> {
        let selected = self.select(true, |reading| {
            reading.sensor_type() == sensor_type && in_range(range, reading)
        })?;
        self.page(selected, token)
    }

    async fn query_device_index(
        &self,
        device_id: &str,
        range: Option<&SortKeyRange>,
        token: Option<ContinuationToken>,
    ) -> Result<ResultPage, StorageError> {
        let selected = self.select(true, |reading| {
            reading.device_id() == device_id && in_range(range, reading)
        })?;
        self.page(selected, token)
    }

    async fn scan(
        &self,
        filter: &ScanFilter,
        token: Option<ContinuationToken>,
    ) -> Result<ResultPage, StorageError> {
        let selected = self.select(false, |reading| filter.matches(reading))?;
        self.page(selected, token)
    }
}
