//! In-memory stores
//!
//! Same contracts as the PostgreSQL stores: unique `order_id`, newest-first
//! ordering with insertion order as the tie-break, all-or-nothing inserts.
//! Used by the integration tests and for running the router without a
//! database.

use async_trait::async_trait;
use shared::models::{ContactMessage, Order, OrderStatus, Product, ProductUpdate, Review};
use tokio::sync::RwLock;

use super::{CatalogStore, ContactStore, OrderStore, ReviewStore, StoreError, StoreResult};

/// Orders kept in insertion order
#[derive(Default)]
pub struct MemoryOrderStore {
    orders: RwLock<Vec<Order>>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Newest first, later insertion wins on equal `created_at`
fn newest_first<'a>(orders: impl Iterator<Item = (usize, &'a Order)>) -> Vec<&'a Order> {
    let mut matched: Vec<(usize, &Order)> = orders.collect();
    matched.sort_by(|(ia, a), (ib, b)| (b.created_at, ib).cmp(&(a.created_at, ia)));
    matched.into_iter().map(|(_, o)| o).collect()
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn insert(&self, order: &Order) -> StoreResult<()> {
        let mut orders = self.orders.write().await;
        if orders.iter().any(|o| o.order_id == order.order_id) {
            return Err(StoreError::DuplicateOrderId(order.order_id.clone()));
        }
        orders.push(order.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Order>> {
        let orders = self.orders.read().await;
        Ok(orders.iter().find(|o| o.id == id).cloned())
    }

    async fn find_by_order_id(&self, order_id: &str) -> StoreResult<Option<Order>> {
        let orders = self.orders.read().await;
        Ok(orders.iter().find(|o| o.order_id == order_id).cloned())
    }

    async fn find_latest_by_email(&self, email: &str) -> StoreResult<Option<Order>> {
        let email = email.to_lowercase();
        let orders = self.orders.read().await;
        let matched = newest_first(
            orders
                .iter()
                .enumerate()
                .filter(|(_, o)| o.email.to_lowercase() == email),
        );
        Ok(matched.first().map(|o| (*o).clone()))
    }

    async fn list(&self, status: Option<OrderStatus>) -> StoreResult<Vec<Order>> {
        let orders = self.orders.read().await;
        let matched = newest_first(
            orders
                .iter()
                .enumerate()
                .filter(|(_, o)| status.is_none_or(|s| o.status == s)),
        );
        Ok(matched.into_iter().cloned().collect())
    }

    async fn update_status(
        &self,
        id: &str,
        status: OrderStatus,
        updated_at: i64,
    ) -> StoreResult<Option<Order>> {
        let mut orders = self.orders.write().await;
        Ok(orders.iter_mut().find(|o| o.id == id).map(|order| {
            order.status = status;
            order.updated_at = updated_at;
            order.clone()
        }))
    }
}

/// Products kept in creation order
#[derive(Default)]
pub struct MemoryCatalogStore {
    products: RwLock<Vec<Product>>,
}

impl MemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populated catalog
    pub fn with_products(products: Vec<Product>) -> Self {
        Self {
            products: RwLock::new(products),
        }
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn list(&self) -> StoreResult<Vec<Product>> {
        Ok(self.products.read().await.clone())
    }

    async fn get(&self, id: &str) -> StoreResult<Option<Product>> {
        let products = self.products.read().await;
        Ok(products.iter().find(|p| p.id == id).cloned())
    }

    async fn create(&self, product: &Product) -> StoreResult<()> {
        self.products.write().await.push(product.clone());
        Ok(())
    }

    async fn update(&self, id: &str, update: ProductUpdate) -> StoreResult<Option<Product>> {
        let mut products = self.products.write().await;
        Ok(products.iter_mut().find(|p| p.id == id).map(|product| {
            product.apply(update);
            product.clone()
        }))
    }

    async fn delete(&self, id: &str) -> StoreResult<bool> {
        let mut products = self.products.write().await;
        let before = products.len();
        products.retain(|p| p.id != id);
        Ok(products.len() != before)
    }
}

#[derive(Default)]
pub struct MemoryReviewStore {
    reviews: RwLock<Vec<Review>>,
}

impl MemoryReviewStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn reviews_newest_first<'a>(reviews: impl Iterator<Item = &'a Review>) -> Vec<Review> {
    let mut matched: Vec<Review> = reviews.cloned().collect();
    // stable sort + reverse: equal timestamps come out last-inserted first
    matched.sort_by_key(|r| r.created_at);
    matched.reverse();
    matched
}

#[async_trait]
impl ReviewStore for MemoryReviewStore {
    async fn create(&self, review: &Review) -> StoreResult<()> {
        self.reviews.write().await.push(review.clone());
        Ok(())
    }

    async fn list_approved(&self, product_id: &str) -> StoreResult<Vec<Review>> {
        let reviews = self.reviews.read().await;
        Ok(reviews_newest_first(
            reviews
                .iter()
                .filter(|r| r.approved && r.product_id == product_id),
        ))
    }

    async fn list(&self, pending_only: bool) -> StoreResult<Vec<Review>> {
        let reviews = self.reviews.read().await;
        Ok(reviews_newest_first(
            reviews.iter().filter(|r| !(pending_only && r.approved)),
        ))
    }

    async fn approve(&self, id: &str) -> StoreResult<Option<Review>> {
        let mut reviews = self.reviews.write().await;
        Ok(reviews.iter_mut().find(|r| r.id == id).map(|review| {
            review.approved = true;
            review.clone()
        }))
    }

    async fn delete(&self, id: &str) -> StoreResult<bool> {
        let mut reviews = self.reviews.write().await;
        let before = reviews.len();
        reviews.retain(|r| r.id != id);
        Ok(reviews.len() != before)
    }
}

#[derive(Default)]
pub struct MemoryContactStore {
    messages: RwLock<Vec<ContactMessage>>,
}

impl MemoryContactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn all(&self) -> Vec<ContactMessage> {
        self.messages.read().await.clone()
    }
}

#[async_trait]
impl ContactStore for MemoryContactStore {
    async fn create(&self, message: &ContactMessage) -> StoreResult<()> {
        self.messages.write().await.push(message.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::OrderLineItem;

    fn order(id: &str, order_id: &str, email: &str, created_at: i64) -> Order {
        Order {
            id: id.into(),
            order_id: order_id.into(),
            imvu_id: "user1".into(),
            email: email.into(),
            product_id: "p1".into(),
            product_name: "Pink Room".into(),
            items: vec![OrderLineItem::new("p1", "Pink Room", 3799, 1)],
            subtotal: 3799,
            total: 3799,
            payment_method: "PayPal".into(),
            transaction_id: None,
            screenshot_url: None,
            status: OrderStatus::Pending,
            created_at,
            updated_at: created_at,
        }
    }

    fn review(id: &str, product_id: &str, approved: bool, created_at: i64) -> Review {
        Review {
            id: id.into(),
            product_id: product_id.into(),
            customer_name: "Ana".into(),
            rating: 5,
            comment: "great".into(),
            approved,
            created_at,
        }
    }

    #[tokio::test]
    async fn duplicate_order_id_is_rejected_and_not_stored() {
        let store = MemoryOrderStore::new();
        store.insert(&order("a", "BM-1-AAAAAAA", "a@b.com", 1)).await.unwrap();

        let err = store
            .insert(&order("b", "BM-1-AAAAAAA", "c@d.com", 2))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateOrderId(id) if id == "BM-1-AAAAAAA"));
        assert!(store.find_by_id("b").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn latest_by_email_prefers_newest_then_last_inserted() {
        let store = MemoryOrderStore::new();
        store.insert(&order("old", "BM-1-AAAAAAA", "a@b.com", 100)).await.unwrap();
        store.insert(&order("new", "BM-2-BBBBBBB", "A@B.com", 200)).await.unwrap();
        store.insert(&order("other", "BM-3-CCCCCCC", "x@y.com", 300)).await.unwrap();

        let found = store.find_latest_by_email("a@b.com").await.unwrap().unwrap();
        assert_eq!(found.id, "new");

        store.insert(&order("same-ms", "BM-4-DDDDDDD", "a@b.com", 200)).await.unwrap();
        let found = store.find_latest_by_email("a@b.com").await.unwrap().unwrap();
        assert_eq!(found.id, "same-ms");
    }

    #[tokio::test]
    async fn order_id_lookup_is_case_sensitive() {
        let store = MemoryOrderStore::new();
        store.insert(&order("a", "BM-1-ABCDEFG", "a@b.com", 1)).await.unwrap();
        assert!(store.find_by_order_id("BM-1-ABCDEFG").await.unwrap().is_some());
        assert!(store.find_by_order_id("bm-1-abcdefg").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_filters_by_status_newest_first() {
        let store = MemoryOrderStore::new();
        store.insert(&order("a", "BM-1-AAAAAAA", "a@b.com", 1)).await.unwrap();
        store.insert(&order("b", "BM-2-BBBBBBB", "a@b.com", 2)).await.unwrap();
        store
            .update_status("a", OrderStatus::Completed, 5)
            .await
            .unwrap()
            .unwrap();

        let all = store.list(None).await.unwrap();
        assert_eq!(
            all.iter().map(|o| o.id.as_str()).collect::<Vec<_>>(),
            vec!["b", "a"]
        );

        let completed = store.list(Some(OrderStatus::Completed)).await.unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].updated_at, 5);
    }

    #[tokio::test]
    async fn update_status_on_missing_order_returns_none() {
        let store = MemoryOrderStore::new();
        let result = store
            .update_status("missing", OrderStatus::Processing, 1)
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn review_moderation_views() {
        let store = MemoryReviewStore::new();
        store.create(&review("r1", "p1", false, 1)).await.unwrap();
        store.create(&review("r2", "p1", false, 2)).await.unwrap();
        store.create(&review("r3", "p2", false, 3)).await.unwrap();

        assert!(store.list_approved("p1").await.unwrap().is_empty());
        assert_eq!(store.list(true).await.unwrap().len(), 3);

        store.approve("r1").await.unwrap().unwrap();
        store.approve("r2").await.unwrap().unwrap();
        let approved = store.list_approved("p1").await.unwrap();
        assert_eq!(
            approved.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(),
            vec!["r2", "r1"]
        );
        assert_eq!(store.list(true).await.unwrap().len(), 1);
        assert_eq!(store.list(false).await.unwrap().len(), 3);

        assert!(store.delete("r3").await.unwrap());
        assert!(!store.delete("r3").await.unwrap());
        assert!(store.approve("r3").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn contact_messages_are_kept_in_order() {
        let store = MemoryContactStore::new();
        for id in ["c1", "c2"] {
            store
                .create(&ContactMessage {
                    id: id.into(),
                    name: "Ana".into(),
                    email: "ana@example.com".into(),
                    imvu_username: "ana".into(),
                    message: "hello".into(),
                    created_at: 1,
                })
                .await
                .unwrap();
        }
        let all = store.all().await;
        assert_eq!(
            all.iter().map(|m| m.id.as_str()).collect::<Vec<_>>(),
            vec!["c1", "c2"]
        );
    }
}
