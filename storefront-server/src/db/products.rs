//! PostgreSQL catalog store

use async_trait::async_trait;
use shared::models::{Product, ProductUpdate};
use sqlx::PgPool;

use super::{CatalogStore, StoreResult};

const PRODUCT_COLUMNS: &str = "id, name, description, price, category, product_type, \
     image_url, video_url, features, is_gift, login_method, vip_required, \
     sex_room_needed, pc_support, mobile_support";

#[derive(Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn list(&self) -> StoreResult<Vec<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY category, name");
        Ok(sqlx::query_as(&sql).fetch_all(&self.pool).await?)
    }

    async fn get(&self, id: &str) -> StoreResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");
        Ok(sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create(&self, product: &Product) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO products (
                id, name, description, price, category, product_type,
                image_url, video_url, features, is_gift, login_method,
                vip_required, sex_room_needed, pc_support, mobile_support
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)",
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(&product.category)
        .bind(&product.product_type)
        .bind(&product.image_url)
        .bind(&product.video_url)
        .bind(&product.features)
        .bind(product.is_gift)
        .bind(&product.login_method)
        .bind(product.vip_required)
        .bind(product.sex_room_needed)
        .bind(product.pc_support)
        .bind(product.mobile_support)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(&self, id: &str, update: ProductUpdate) -> StoreResult<Option<Product>> {
        let sql = format!(
            "UPDATE products SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                price = COALESCE($4, price),
                category = COALESCE($5, category),
                product_type = COALESCE($6, product_type),
                image_url = COALESCE($7, image_url),
                video_url = COALESCE($8, video_url),
                features = COALESCE($9, features),
                is_gift = COALESCE($10, is_gift),
                login_method = COALESCE($11, login_method),
                vip_required = COALESCE($12, vip_required),
                sex_room_needed = COALESCE($13, sex_room_needed),
                pc_support = COALESCE($14, pc_support),
                mobile_support = COALESCE($15, mobile_support)
             WHERE id = $1
             RETURNING {PRODUCT_COLUMNS}"
        );
        Ok(sqlx::query_as(&sql)
            .bind(id)
            .bind(update.name)
            .bind(update.description)
            .bind(update.price)
            .bind(update.category)
            .bind(update.product_type)
            .bind(update.image_url)
            .bind(update.video_url)
            .bind(update.features)
            .bind(update.is_gift)
            .bind(update.login_method)
            .bind(update.vip_required)
            .bind(update.sex_room_needed)
            .bind(update.pc_support)
            .bind(update.mobile_support)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete(&self, id: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
