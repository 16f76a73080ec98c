//! # PostgreSQL 存储实现模块
//!
//! 生产环境使用的读数存储实现。
//!
//! ## 设计原则
//!
//! 1. **参数化查询**：所有 SQL 查询使用参数绑定，防止 SQL 注入
//! 2. **键集分页**：续读令牌记录上一页最后一行的排序列，避免 offset 扫描
//! 3. **连接池管理**：使用连接池复用数据库连接
//!
//! ## 数据库模式要求
//!
//! ```sql
//! create table sensor_readings (
//!     sensor_type     text    not null,
//!     edge_time_stamp text    not null,
//!     device_id       text    not null,
//!     unit_id         integer,
//!     room            text,
//!     ttl             bigint  not null,
//!     payload         jsonb   not null,
//!     primary key (sensor_type, edge_time_stamp, device_id)
//! );
//! create index sensor_readings_device_idx on sensor_readings (device_id, edge_time_stamp);
//! ```
//!
//! `edge_time_stamp` 为定宽 ISO-8601 字符串，`payload` 为指标名到数值的 JSON 对象。

pub mod reading;

pub use reading::*;
