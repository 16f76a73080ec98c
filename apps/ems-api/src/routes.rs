//! 路由定义
//!
//! 路由包括：
//! - 健康检查：/health
//! - 读数查询：/readings
//! - 指标快照：/metrics
//!
//! 业务路由同时挂在 / 与 /api/ 两种前缀下。

use super::AppState;
use super::handlers::*;
use super::middleware::request_context;
use axum::{Router, middleware, routing::get};
use tower_http::trace::TraceLayer;

/// 创建 API 路由
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/readings", get(list_readings))
        .route("/metrics", get(get_metrics))
}

/// 组装完整应用：健康检查、两种前缀的业务路由、追踪中间件
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(create_api_router())
        .nest("/api", create_api_router())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        // 注入 request_id/trace_id
        .layer(middleware::from_fn(request_context))
}
