//! PostgreSQL review store

use async_trait::async_trait;
use shared::models::Review;
use sqlx::PgPool;

use super::{ReviewStore, StoreResult};

const REVIEW_COLUMNS: &str =
    "id, product_id, customer_name, rating, comment, approved, created_at";

#[derive(Clone)]
pub struct PgReviewStore {
    pool: PgPool,
}

impl PgReviewStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReviewStore for PgReviewStore {
    async fn create(&self, review: &Review) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO reviews (id, product_id, customer_name, rating, comment, approved, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(&review.id)
        .bind(&review.product_id)
        .bind(&review.customer_name)
        .bind(review.rating)
        .bind(&review.comment)
        .bind(review.approved)
        .bind(review.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_approved(&self, product_id: &str) -> StoreResult<Vec<Review>> {
        let sql = format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews
             WHERE product_id = $1 AND approved
             ORDER BY created_at DESC"
        );
        Ok(sqlx::query_as(&sql)
            .bind(product_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn list(&self, pending_only: bool) -> StoreResult<Vec<Review>> {
        let sql = format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews
             WHERE NOT ($1 AND approved)
             ORDER BY created_at DESC"
        );
        Ok(sqlx::query_as(&sql)
            .bind(pending_only)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn approve(&self, id: &str) -> StoreResult<Option<Review>> {
        let sql = format!(
            "UPDATE reviews SET approved = TRUE WHERE id = $1 RETURNING {REVIEW_COLUMNS}"
        );
        Ok(sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete(&self, id: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
