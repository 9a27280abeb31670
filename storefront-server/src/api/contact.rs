//! Contact form

use axum::{Json, Router, extract::State, routing::post};
use serde::Deserialize;
use shared::models::ContactMessage;
use validator::Validate;

use super::{ApiResult, validation_error};
use crate::notify::Notification;
use crate::state::AppState;
use crate::util::{new_id, now_millis};

pub fn router() -> Router<AppState> {
    Router::new().route("/api/contact", post(submit_contact))
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactSubmit {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 100))]
    pub imvu_username: String,
    #[validate(length(min = 1, max = 5000))]
    pub message: String,
}

/// POST /api/contact: persisted, then forwarded to the status channel
pub async fn submit_contact(
    State(state): State<AppState>,
    Json(req): Json<ContactSubmit>,
) -> ApiResult<serde_json::Value> {
    req.validate().map_err(|e| validation_error(&e))?;

    let message = ContactMessage {
        id: new_id(),
        name: req.name.trim().to_string(),
        email: req.email.trim().to_string(),
        imvu_username: req.imvu_username.trim().to_string(),
        message: req.message.trim().to_string(),
        created_at: now_millis(),
    };
    state.contacts.create(&message).await?;

    let id = message.id.clone();
    state
        .notifier
        .publish(Notification::ContactSubmitted { message });

    Ok(Json(serde_json::json!({ "success": true, "id": id })))
}
