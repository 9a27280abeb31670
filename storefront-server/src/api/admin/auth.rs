//! Admin login / logout

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::api::ApiResult;
use crate::auth::AdminSession;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
}

/// POST /api/admin/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let token = state.sessions.login(&req.password).await?;
    Ok(Json(LoginResponse {
        success: true,
        token,
    }))
}

/// POST /api/admin/logout
pub async fn logout(
    State(state): State<AppState>,
    session: AdminSession,
) -> ApiResult<serde_json::Value> {
    state.sessions.logout(&session.token).await;
    Ok(Json(serde_json::json!({ "success": true })))
}
