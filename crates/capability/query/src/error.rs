//! 查询错误类型定义

use chrono::NaiveDate;
use ems_storage::StorageError;

/// 查询错误；空结果不是错误。
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("invalid date range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}
