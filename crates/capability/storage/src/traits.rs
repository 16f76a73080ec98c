//! 存储接口 Trait 定义
//!
//! - ReadingStore：读数分页读取（分区键 / 设备索引 / 扫描）
//!
//! 设计原则：
//! - 所有接口返回 StorageError
//! - 使用 async_trait 支持动态分发
//! - 续读令牌对调用方不透明，只能原样传回同一个操作

use crate::error::StorageError;
use async_trait::async_trait;
use domain::{Reading, SensorType, format_sort_key};
use std::fmt;

/// 不透明的续读令牌。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContinuationToken(String);

impl ContinuationToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContinuationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 排序键闭区间，任一端可缺省（半开区间）。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortKeyRange {
    pub start: Option<String>,
    pub end: Option<String>,
}

impl SortKeyRange {
    pub fn new(start: Option<String>, end: Option<String>) -> Self {
        Self { start, end }
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn contains(&self, sort_key: &str) -> bool {
        self.start.as_deref().is_none_or(|start| sort_key >= start)
            && self.end.as_deref().is_none_or(|end| sort_key <= end)
    }
}

/// 扫描过滤条件：只对存在的条件取合取。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanFilter {
    pub device_id: Option<String>,
    pub sensor_type: Option<SensorType>,
    pub range: Option<SortKeyRange>,
}

impl ScanFilter {
    pub fn is_empty(&self) -> bool {
        self.device_id.is_none()
            && self.sensor_type.is_none()
            && self.range.as_ref().is_none_or(SortKeyRange::is_unbounded)
    }

    pub fn matches(&self, reading: &Reading) -> bool {
        if let Some(device_id) = &self.device_id {
            if reading.device_id() != device_id {
                return false;
            }
        }
        if let Some(sensor_type) = self.sensor_type {
            if reading.sensor_type() != sensor_type {
                return false;
            }
        }
        match &self.range {
            Some(range) => range.contains(&format_sort_key(&reading.timestamp())),
            None => true,
        }
    }
}

/// 一页结果；`next` 为 `None` 表示没有更多数据。
#[derive(Debug, Clone, PartialEq)]
pub struct ResultPage<T = Reading> {
    pub items: Vec<T>,
    pub next: Option<ContinuationToken>,
}

impl<T> ResultPage<T> {
    pub fn last(items: Vec<T>) -> Self {
        Self { items, next: None }
    }
}

/// 读数存储接口
///
/// 三种读取方式对应表上的三条访问路径，全部分页。
#[async_trait]
pub trait ReadingStore: Send + Sync {
    /// 按分区键（传感器类型）读取，按排序键升序
    async fn query_partition(
        &self,
        sensor_type: SensorType,
        range: Option<&SortKeyRange>,
        token: Option<ContinuationToken>,
    ) -> Result<ResultPage, StorageError>;

    /// 按设备索引读取，按排序键升序
    async fn query_device_index(
        &self,
        device_id: &str,
        range: Option<&SortKeyRange>,
        token: Option<ContinuationToken>,
    ) -> Result<ResultPage, StorageError>;

    /// 全表扫描，返回顺序由存储决定
    async fn scan(
        &self,
        filter: &ScanFilter,
        token: Option<ContinuationToken>,
    ) -> Result<ResultPage, StorageError>;
}
