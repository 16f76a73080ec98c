//! # 查询规划能力模块
//!
//! 把调用方的 `QueryFilter` 映射为存储的一条访问路径，然后拉取全部分页：
//!
//! | device_id | sensor_type | 访问策略 |
//! |-----------|-------------|----------|
//! | 有 | 无 | 设备索引 + 可选排序键范围 |
//! | 无 | 有 | 分区键 + 可选排序键范围 |
//! | 有 | 有 | 扫描，合取过滤 |
//! | 无 | 无 | 扫描，仅时间范围过滤 |
//!
//! 时间范围按天解释：`start` 取当天 00:00:00，`end` 取当天 23:59:59.999999。

pub mod error;
pub mod merger;
pub mod planner;

pub use error::QueryError;
pub use merger::merge_pages;
pub use planner::{AccessStrategy, QueryOutcome, QueryPlanner, plan};
