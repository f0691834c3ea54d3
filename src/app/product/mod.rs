//! 产品模块：模型、存储、服务与 HTTP 处理器

pub mod handler;
pub mod model;
pub mod service;
pub mod store;

use axum::{
    routing::{get, post, put},
    Router,
};

use handler::AppState;

/// 产品相关路由
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/product/list", get(handler::list_products))
        .route("/product/:id/info", get(handler::get_product))
        .route("/product/add", post(handler::create_product))
        .route("/product/:id/update", put(handler::update_product))
}
