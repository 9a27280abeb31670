//! Review moderation

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{Review, ReviewAction};

use crate::api::ApiResult;
use crate::auth::AdminSession;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ModerateRequest {
    pub action: String,
}

/// GET /api/admin/reviews?status=pending
pub async fn list(
    State(state): State<AppState>,
    _session: AdminSession,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<Review>> {
    let pending_only = query.status.as_deref() == Some("pending");
    let reviews = state.reviews.list(pending_only).await?;
    Ok(Json(reviews))
}

/// PATCH /api/admin/reviews/{id}: approve, or reject (deletes)
pub async fn moderate(
    State(state): State<AppState>,
    _session: AdminSession,
    Path(id): Path<String>,
    Json(req): Json<ModerateRequest>,
) -> ApiResult<serde_json::Value> {
    let action: ReviewAction = req.action.parse()?;
    match action {
        ReviewAction::Approve => {
            let review = state
                .reviews
                .approve(&id)
                .await?
                .ok_or_else(|| AppError::new(ErrorCode::ReviewNotFound))?;
            tracing::info!(review_id = %id, "Review approved");
            Ok(Json(serde_json::json!({ "success": true, "review": review })))
        }
        ReviewAction::Reject => {
            if !state.reviews.delete(&id).await? {
                return Err(AppError::new(ErrorCode::ReviewNotFound));
            }
            tracing::info!(review_id = %id, "Review rejected");
            Ok(Json(serde_json::json!({ "success": true })))
        }
    }
}
