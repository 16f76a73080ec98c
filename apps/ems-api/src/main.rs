//! 读数查询 HTTP API：按设备 / 传感器类型 / 日期范围检索历史读数。

mod handlers;
mod middleware;
mod routes;
mod utils;

use ems_config::ApiConfig;
use ems_query::QueryPlanner;
use ems_storage::PgReadingStore;
use ems_telemetry::init_tracing;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub planner: QueryPlanner,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载本地 .env（如存在），便于直接 cargo run 启动
    dotenvy::dotenv().ok();
    // 从环境变量加载运行配置
    let config = ApiConfig::from_env()?;
    // 初始化结构化日志
    init_tracing();

    // Postgres 读数存储（sensor_readings 表需已存在）
    let store =
        Arc::new(PgReadingStore::connect(&config.database_url, config.query_page_size).await?);
    let state = AppState {
        planner: QueryPlanner::new(store),
    };
    let app = routes::create_app(state);

    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    info!(target: "ems.api", addr = %config.http_addr, "http_listening");
    axum::serve(listener, app).await?;
    Ok(())
}
