//! Admin product media upload

use axum::{
    Json,
    extract::{Multipart, State},
};
use serde::Serialize;
use shared::error::{AppError, ErrorCode};

use crate::api::ApiResult;
use crate::api::upload::read_form;
use crate::auth::AdminSession;
use crate::media::{is_allowed, media_file_name, media_url};
use crate::state::AppState;
use crate::util::now_millis;

const FILE_FIELD: &str = "file";

#[derive(Serialize)]
pub struct MediaResponse {
    pub success: bool,
    /// Reference to store in a product's `imageUrl` / `videoUrl`
    pub url: String,
}

/// POST /api/admin/upload-media (multipart, field `file`)
pub async fn upload(
    State(state): State<AppState>,
    _session: AdminSession,
    multipart: Multipart,
) -> ApiResult<MediaResponse> {
    let form = read_form(multipart, FILE_FIELD).await?;
    let file = form
        .file
        .ok_or_else(|| AppError::new(ErrorCode::MediaFileRequired))?;

    if !is_allowed(file.content_type.as_deref()) {
        return Err(AppError::new(ErrorCode::UnsupportedMediaType)
            .with_detail("contentType", file.content_type.unwrap_or_default()));
    }

    let name = media_file_name(&file.filename, now_millis());
    state.media.save(&name, &file.bytes).await.map_err(|e| {
        tracing::error!(name = %name, error = %e, "Media write failed");
        AppError::with_message(ErrorCode::InternalError, "Failed to upload file")
    })?;

    tracing::info!(name = %name, bytes = file.bytes.len(), "Product media uploaded");
    Ok(Json(MediaResponse {
        success: true,
        url: media_url(&name),
    }))
}
