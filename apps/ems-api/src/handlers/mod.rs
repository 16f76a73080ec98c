//! Handlers 模块

pub mod health;
pub mod metrics;
pub mod readings;

pub use health::*;
pub use metrics::*;
pub use readings::*;
