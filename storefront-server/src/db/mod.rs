//! Database access layer
//!
//! Every store is a trait object so the router can run against PostgreSQL
//! in production and against the [`memory`] stores in tests.

pub mod contacts;
pub mod memory;
pub mod orders;
pub mod products;
pub mod reviews;

use async_trait::async_trait;
use shared::models::{
    ContactMessage, Order, OrderStatus, Product, ProductUpdate, Review,
};

pub use contacts::PgContactStore;
pub use orders::PgOrderStore;
pub use products::PgCatalogStore;
pub use reviews::PgReviewStore;

/// Store-level failure
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The generated `order_id` collided with an existing order
    #[error("order identifier already exists: {0}")]
    DuplicateOrderId(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Orders and their line items
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist the order and all its line items atomically
    async fn insert(&self, order: &Order) -> StoreResult<()>;

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Order>>;

    /// Exact, case-sensitive match on the customer-facing identifier
    async fn find_by_order_id(&self, order_id: &str) -> StoreResult<Option<Order>>;

    /// Most recently created order for a lower-cased email
    async fn find_latest_by_email(&self, email: &str) -> StoreResult<Option<Order>>;

    /// Newest first, optionally filtered by status
    async fn list(&self, status: Option<OrderStatus>) -> StoreResult<Vec<Order>>;

    /// Single-row status write; `None` when the order does not exist
    async fn update_status(
        &self,
        id: &str,
        status: OrderStatus,
        updated_at: i64,
    ) -> StoreResult<Option<Order>>;
}

/// Product catalog
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn list(&self) -> StoreResult<Vec<Product>>;

    async fn get(&self, id: &str) -> StoreResult<Option<Product>>;

    async fn create(&self, product: &Product) -> StoreResult<()>;

    async fn update(&self, id: &str, update: ProductUpdate) -> StoreResult<Option<Product>>;

    /// Returns false when nothing was deleted
    async fn delete(&self, id: &str) -> StoreResult<bool>;
}

/// Product reviews and their moderation state
#[async_trait]
pub trait ReviewStore: Send + Sync {
    async fn create(&self, review: &Review) -> StoreResult<()>;

    /// Approved reviews for one product, newest first
    async fn list_approved(&self, product_id: &str) -> StoreResult<Vec<Review>>;

    /// Newest first; only unapproved reviews when `pending_only`
    async fn list(&self, pending_only: bool) -> StoreResult<Vec<Review>>;

    async fn approve(&self, id: &str) -> StoreResult<Option<Review>>;

    async fn delete(&self, id: &str) -> StoreResult<bool>;
}

/// Contact form submissions
#[async_trait]
pub trait ContactStore: Send + Sync {
    async fn create(&self, message: &ContactMessage) -> StoreResult<()>;
}
