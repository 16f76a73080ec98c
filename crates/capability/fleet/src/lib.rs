//! # 发射器集群能力模块
//!
//! 模拟一栋楼宇内的全部监测点，每个监测点一个独立任务，按各自周期生成读数并交给共享的发布通道。
//!
//! - [`generator`]：监测点定义与读数生成
//! - [`emitter`]：单个监测点的无漂移调度循环
//! - [`layout`]：楼宇 / 住户单元 / 公共区域的监测点清单
//! - [`orchestrator`]：建连、错峰启动、取消、汇合与断开
//! - [`signal`]：SIGINT / SIGTERM 转为取消信号

pub mod emitter;
pub mod generator;
pub mod layout;
pub mod orchestrator;
pub mod signal;

pub use emitter::{Emitter, EmitterSpec, EmitterStats, Interval};
pub use generator::{MonitoringPoint, Room};
pub use layout::building_fleet;
pub use orchestrator::{FleetError, FleetOrchestrator, FleetReport};
pub use signal::{cancel_on_shutdown_signal, shutdown_signal};
