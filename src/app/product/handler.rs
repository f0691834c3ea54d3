//! 产品处理器

use axum::{extract::State, http::StatusCode, response::Json};

use super::{
    model::{ListQuery, NewProduct, Product, ProductChanges, ProductPath},
    service::ProductService,
};
use crate::core::{
    error::CoreError,
    extract::{JsonBody, PatchBody, PathParams, QueryParams},
};

#[derive(Clone)]
pub struct AppState {
    pub product_service: ProductService,
}

pub async fn list_products(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ListQuery>,
) -> Result<Json<Vec<Product>>, CoreError> {
    let products = state.product_service.list_products(query.page).await?;
    Ok(Json(products))
}

pub async fn get_product(
    State(state): State<AppState>,
    PathParams(path): PathParams<ProductPath>,
) -> Result<Json<Product>, CoreError> {
    let product = state.product_service.get_product(path.id).await?;
    Ok(Json(product))
}

pub async fn create_product(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<NewProduct>,
) -> Result<(StatusCode, Json<Product>), CoreError> {
    let product = state.product_service.create_product(payload).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    State(state): State<AppState>,
    PathParams(path): PathParams<ProductPath>,
    PatchBody(changes): PatchBody<ProductChanges>,
) -> Result<Json<Product>, CoreError> {
    let product = state.product_service.update_product(path.id, changes).await?;
    Ok(Json(product))
}

pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, CoreError> {
    state.product_service.health().await?;
    Ok(Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now()
    })))
}
