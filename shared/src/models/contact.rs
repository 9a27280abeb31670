//! Contact Form Model

use serde::{Deserialize, Serialize};

/// Message submitted through the public contact form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ContactMessage {
    pub id: String,
    pub name: String,
    pub email: String,
    pub imvu_username: String,
    pub message: String,
    pub created_at: i64,
}
