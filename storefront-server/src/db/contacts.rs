//! PostgreSQL contact form store

use async_trait::async_trait;
use shared::models::ContactMessage;
use sqlx::PgPool;

use super::{ContactStore, StoreResult};

#[derive(Clone)]
pub struct PgContactStore {
    pool: PgPool,
}

impl PgContactStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContactStore for PgContactStore {
    async fn create(&self, message: &ContactMessage) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO contact_messages (id, name, email, imvu_username, message, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(&message.id)
        .bind(&message.name)
        .bind(&message.email)
        .bind(&message.imvu_username)
        .bind(&message.message)
        .bind(message.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
