//! Public review endpoints; new reviews stay hidden until approved

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use serde::Deserialize;
use shared::error::{AppError, ErrorCode};
use shared::models::Review;
use validator::Validate;

use super::{ApiResult, validation_error};
use crate::state::AppState;
use crate::util::{new_id, now_millis};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/reviews", post(submit_review))
        .route("/api/reviews/{product_id}", get(list_product_reviews))
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct ReviewSubmit {
    #[validate(length(min = 1))]
    pub product_id: String,
    #[validate(length(min = 1, max = 100))]
    pub customer_name: String,
    #[validate(range(min = 1, max = 5))]
    pub rating: i32,
    #[validate(length(min = 1, max = 2000))]
    pub comment: String,
}

/// POST /api/reviews
pub async fn submit_review(
    State(state): State<AppState>,
    Json(req): Json<ReviewSubmit>,
) -> ApiResult<serde_json::Value> {
    if let Err(errors) = req.validate() {
        if errors.field_errors().contains_key("rating") {
            return Err(AppError::new(ErrorCode::InvalidRating)
                .with_detail("fields", serde_json::json!(["rating"])));
        }
        return Err(validation_error(&errors));
    }

    let review = Review {
        id: new_id(),
        product_id: req.product_id.trim().to_string(),
        customer_name: req.customer_name.trim().to_string(),
        rating: req.rating,
        comment: req.comment.trim().to_string(),
        approved: false,
        created_at: now_millis(),
    };
    state.reviews.create(&review).await?;
    tracing::info!(review_id = %review.id, product_id = %review.product_id, "Review submitted");

    Ok(Json(serde_json::json!({ "success": true, "review": review })))
}

/// GET /api/reviews/{product_id}
pub async fn list_product_reviews(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> ApiResult<Vec<Review>> {
    let reviews = state.reviews.list_approved(&product_id).await?;
    Ok(Json(reviews))
}
