//! Admin catalog management

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{Product, ProductCreate, ProductUpdate};

use crate::api::ApiResult;
use crate::auth::AdminSession;
use crate::state::AppState;
use crate::util::new_id;

#[derive(Serialize)]
pub struct ProductResponse {
    pub success: bool,
    pub product: Product,
}

fn check_price(price: i64) -> Result<(), AppError> {
    if price <= 0 {
        return Err(AppError::new(ErrorCode::ProductInvalidPrice)
            .with_detail("fields", serde_json::json!(["price"])));
    }
    Ok(())
}

fn check_required(data: &ProductCreate) -> Result<(), AppError> {
    let fields = [
        ("name", &data.name),
        ("description", &data.description),
        ("category", &data.category),
        ("type", &data.product_type),
        ("imageUrl", &data.image_url),
    ];
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(k, _)| *k)
        .collect();
    if !missing.is_empty() {
        return Err(AppError::required_fields(missing));
    }
    Ok(())
}

/// POST /api/admin/products
pub async fn create(
    State(state): State<AppState>,
    _session: AdminSession,
    Json(data): Json<ProductCreate>,
) -> ApiResult<ProductResponse> {
    check_required(&data)?;
    check_price(data.price)?;

    let product = Product::from_create(new_id(), data);
    state.catalog.create(&product).await?;
    tracing::info!(product_id = %product.id, name = %product.name, "Product created");

    Ok(Json(ProductResponse {
        success: true,
        product,
    }))
}

/// PATCH /api/admin/products/{id}
pub async fn update(
    State(state): State<AppState>,
    _session: AdminSession,
    Path(id): Path<String>,
    Json(data): Json<ProductUpdate>,
) -> ApiResult<ProductResponse> {
    if let Some(price) = data.price {
        check_price(price)?;
    }
    let product = state
        .catalog
        .update(&id, data)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;
    tracing::info!(product_id = %product.id, "Product updated");

    Ok(Json(ProductResponse {
        success: true,
        product,
    }))
}

/// DELETE /api/admin/products/{id}
pub async fn delete(
    State(state): State<AppState>,
    _session: AdminSession,
    Path(id): Path<String>,
) -> ApiResult<serde_json::Value> {
    if !state.catalog.delete(&id).await? {
        return Err(AppError::new(ErrorCode::ProductNotFound));
    }
    tracing::info!(product_id = %id, "Product deleted");
    Ok(Json(serde_json::json!({ "success": true })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_must_be_positive() {
        assert!(check_price(1).is_ok());
        assert_eq!(check_price(0).unwrap_err().code, ErrorCode::ProductInvalidPrice);
        assert!(check_price(-5).is_err());
    }
}
