//! Multipart form reading for the order entry points

use std::collections::HashMap;

use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;
use http::StatusCode;
use shared::error::{AppError, ErrorCode};

use crate::notify::Attachment;

/// Text fields plus at most one file
#[derive(Debug, Default)]
pub struct UploadForm {
    fields: HashMap<String, String>,
    pub file: Option<Attachment>,
}

impl UploadForm {
    /// Trimmed text field, `None` when absent or blank
    pub fn text(&self, name: &str) -> Option<String> {
        crate::util::non_blank(self.fields.get(name).map(String::as_str))
    }
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::new(ErrorCode::FileTooLarge)
    } else {
        AppError::with_message(ErrorCode::InvalidRequest, format!("Multipart error: {e}"))
    }
}

/// Drain the form; `file_field` is read as bytes, everything else as text
pub async fn read_form(mut multipart: Multipart, file_field: &str) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == file_field {
            let filename = field.file_name().unwrap_or("screenshot").to_string();
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await.map_err(multipart_error)?;
            // browsers send an empty part when no file was chosen
            if !bytes.is_empty() {
                form.file = Some(Attachment {
                    filename,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
        } else {
            let value = field.text().await.map_err(multipart_error)?;
            form.fields.insert(name, value);
        }
    }

    Ok(form)
}
