//! Public catalog endpoints

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use shared::error::{AppError, ErrorCode};
use shared::models::Product;

use super::ApiResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(list_products))
        .route("/api/products/{id}", get(get_product))
}

/// GET /api/products
pub async fn list_products(State(state): State<AppState>) -> ApiResult<Vec<Product>> {
    let products = state.catalog.list().await?;
    Ok(Json(products))
}

/// GET /api/products/{id}
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Product> {
    let product = state
        .catalog
        .get(&id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;
    Ok(Json(product))
}
