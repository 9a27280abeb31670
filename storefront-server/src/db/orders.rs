//! PostgreSQL order store
//!
//! `orders` holds one row per order, `order_items` the ordered line items.
//! `seq` (identity column) breaks ties between orders created in the same
//! millisecond so "newest first" is deterministic.

use std::collections::HashMap;

use async_trait::async_trait;
use shared::models::{Order, OrderLineItem, OrderStatus};
use sqlx::PgPool;

use super::{OrderStore, StoreError, StoreResult};

const ORDER_COLUMNS: &str = "id, order_id, imvu_id, email, product_id, product_name, \
     subtotal, total, payment_method, transaction_id, screenshot_url, status, \
     created_at, updated_at";

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: String,
    order_id: String,
    imvu_id: String,
    email: String,
    product_id: String,
    product_name: String,
    subtotal: i64,
    total: i64,
    payment_method: String,
    transaction_id: Option<String>,
    screenshot_url: Option<String>,
    status: String,
    created_at: i64,
    updated_at: i64,
}

#[derive(sqlx::FromRow)]
struct ItemRow {
    order_ref: String,
    product_id: String,
    product_name: String,
    unit_price: i64,
    quantity: i32,
    line_total: i64,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderLineItem>) -> StoreResult<Order> {
        let status: OrderStatus = self
            .status
            .parse()
            .map_err(|e| StoreError::Database(sqlx::Error::Decode(Box::new(e))))?;

        Ok(Order {
            id: self.id,
            order_id: self.order_id,
            imvu_id: self.imvu_id,
            email: self.email,
            product_id: self.product_id,
            product_name: self.product_name,
            items,
            subtotal: self.subtotal,
            total: self.total,
            payment_method: self.payment_method,
            transaction_id: self.transaction_id,
            screenshot_url: self.screenshot_url,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Clone)]
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Line items for a batch of orders, keyed by order id, in position order
    async fn load_items(&self, ids: &[String]) -> StoreResult<HashMap<String, Vec<OrderLineItem>>> {
        let rows: Vec<ItemRow> = sqlx::query_as(
            "SELECT order_ref, product_id, product_name, unit_price, quantity, line_total
             FROM order_items WHERE order_ref = ANY($1)
             ORDER BY order_ref, position",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_order: HashMap<String, Vec<OrderLineItem>> = HashMap::new();
        for row in rows {
            by_order.entry(row.order_ref).or_default().push(OrderLineItem {
                product_id: row.product_id,
                product_name: row.product_name,
                unit_price: row.unit_price,
                quantity: row.quantity,
                line_total: row.line_total,
            });
        }
        Ok(by_order)
    }

    async fn hydrate(&self, rows: Vec<OrderRow>) -> StoreResult<Vec<Order>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<String> = rows.iter().map(|r| r.id.clone()).collect();
        let mut items = self.load_items(&ids).await?;
        rows.into_iter()
            .map(|row| {
                let line_items = items.remove(&row.id).unwrap_or_default();
                row.into_order(line_items)
            })
            .collect()
    }

    async fn hydrate_one(&self, row: Option<OrderRow>) -> StoreResult<Option<Order>> {
        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn insert(&self, order: &Order) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            "INSERT INTO orders (
                id, order_id, imvu_id, email, product_id, product_name,
                subtotal, total, payment_method, transaction_id, screenshot_url,
                status, created_at, updated_at
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
        )
        .bind(&order.id)
        .bind(&order.order_id)
        .bind(&order.imvu_id)
        .bind(&order.email)
        .bind(&order.product_id)
        .bind(&order.product_name)
        .bind(order.subtotal)
        .bind(order.total)
        .bind(&order.payment_method)
        .bind(&order.transaction_id)
        .bind(&order.screenshot_url)
        .bind(order.status.as_str())
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await;

        if let Err(sqlx::Error::Database(db_err)) = &inserted
            && db_err.is_unique_violation()
        {
            return Err(StoreError::DuplicateOrderId(order.order_id.clone()));
        }
        inserted?;

        for (position, item) in order.items.iter().enumerate() {
            sqlx::query(
                "INSERT INTO order_items (
                    order_ref, position, product_id, product_name,
                    unit_price, quantity, line_total
                 )
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(&order.id)
            .bind(position as i32)
            .bind(&item.product_id)
            .bind(&item.product_name)
            .bind(item.unit_price)
            .bind(item.quantity)
            .bind(item.line_total)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Order>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1");
        let row: Option<OrderRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        self.hydrate_one(row).await
    }

    async fn find_by_order_id(&self, order_id: &str) -> StoreResult<Option<Order>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE order_id = $1");
        let row: Option<OrderRow> = sqlx::query_as(&sql)
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?;
        self.hydrate_one(row).await
    }

    async fn find_latest_by_email(&self, email: &str) -> StoreResult<Option<Order>> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders
             WHERE lower(email) = $1
             ORDER BY created_at DESC, seq DESC
             LIMIT 1"
        );
        let row: Option<OrderRow> = sqlx::query_as(&sql)
            .bind(email.to_lowercase())
            .fetch_optional(&self.pool)
            .await?;
        self.hydrate_one(row).await
    }

    async fn list(&self, status: Option<OrderStatus>) -> StoreResult<Vec<Order>> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders
             WHERE ($1::text IS NULL OR status = $1)
             ORDER BY created_at DESC, seq DESC"
        );
        let rows: Vec<OrderRow> = sqlx::query_as(&sql)
            .bind(status.map(|s| s.as_str()))
            .fetch_all(&self.pool)
            .await?;
        self.hydrate(rows).await
    }

    async fn update_status(
        &self,
        id: &str,
        status: OrderStatus,
        updated_at: i64,
    ) -> StoreResult<Option<Order>> {
        let sql = format!(
            "UPDATE orders SET status = $2, updated_at = $3
             WHERE id = $1
             RETURNING {ORDER_COLUMNS}"
        );
        let row: Option<OrderRow> = sqlx::query_as(&sql)
            .bind(id)
            .bind(status.as_str())
            .bind(updated_at)
            .fetch_optional(&self.pool)
            .await?;
        self.hydrate_one(row).await
    }
}
