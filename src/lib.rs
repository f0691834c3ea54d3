//! # Product API
//!
//! 单一 Product 实体的 HTTP CRUD 服务：
//! - `app`: 产品模型、存储接口、业务服务与处理器
//! - `core`: 统一错误、请求提取器、中间件
//! - `infrastructure`: 数据库连接、PostgreSQL 存储、日志
//! - `config`: TOML 配置

pub mod app;
pub mod config;
pub mod core;
pub mod infrastructure;

use std::time::Duration;

use axum::{middleware, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::app::product::{self, handler::AppState, service::ProductService};
use crate::config::HttpConfig;
use crate::core::middleware::request_logging_middleware;

/// 组装路由和中间件
pub fn build_app(product_service: ProductService, http: &HttpConfig) -> Router {
    let state = AppState { product_service };

    Router::new()
        .route("/health", get(product::handler::health_check))
        .merge(product::routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(request_logging_middleware))
                .layer(TimeoutLayer::new(Duration::from_secs(http.timeout_seconds)))
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state)
}
