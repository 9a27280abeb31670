//! Admin session extractor

use axum::{extract::FromRequestParts, http::request::Parts};
use shared::error::AppError;

use crate::state::AppState;

/// Authorized admin request, carrying the presented token
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub token: String,
}

fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

impl FromRequestParts<AppState> for AdminSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(session) = parts.extensions.get::<AdminSession>() {
            return Ok(session.clone());
        }

        let Some(header) = parts.headers.get(http::header::AUTHORIZATION) else {
            tracing::warn!(uri = %parts.uri, "Admin request without credentials");
            return Err(AppError::unauthorized());
        };

        let token = header
            .to_str()
            .ok()
            .and_then(bearer_token)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?;

        if let Err(e) = state.sessions.authorize(token).await {
            tracing::warn!(uri = %parts.uri, "Admin request with unknown session");
            return Err(e);
        }

        let session = AdminSession {
            token: token.to_string(),
        };
        parts.extensions.insert(session.clone());
        Ok(session)
    }
}
