//! 中间件
//!
//! - request_context：请求上下文中间件，注入 request_id/trace_id

pub mod request_context;

pub use request_context::*;
