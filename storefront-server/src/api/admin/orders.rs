//! Admin order management

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use shared::error::AppError;
use shared::models::Order;

use crate::api::ApiResult;
use crate::auth::AdminSession;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StatusUpdate {
    pub status: Option<String>,
}

#[derive(Serialize)]
pub struct StatusUpdateResponse {
    pub success: bool,
    pub order: Order,
}

/// GET /api/admin/orders?status=
pub async fn list(
    State(state): State<AppState>,
    _session: AdminSession,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<Order>> {
    let orders = state.lifecycle.list(query.status.as_deref()).await?;
    Ok(Json(orders))
}

/// PATCH /api/admin/orders/{id}
pub async fn update_status(
    State(state): State<AppState>,
    _session: AdminSession,
    Path(id): Path<String>,
    Json(req): Json<StatusUpdate>,
) -> ApiResult<StatusUpdateResponse> {
    let status = req
        .status
        .ok_or_else(|| AppError::required_fields(["status"]))?;
    let order = state.lifecycle.update_status(&id, &status).await?;
    Ok(Json(StatusUpdateResponse {
        success: true,
        order,
    }))
}
