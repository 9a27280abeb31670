//! Order lifecycle engine
//!
//! Entry point (`create`) and the only place order status changes
//! (`transition`). Validation runs before any write; once a write is
//! committed, notification problems never unwind it.

use std::sync::Arc;

use shared::error::{AppError, ErrorCode};
use shared::models::{MAX_QUANTITY, MAX_UNIT_PRICE, NewOrder, Order, OrderStatus};
use validator::ValidateEmail;

use super::identifier::generate_order_id;
use crate::db::{CatalogStore, OrderStore, StoreError};
use crate::error::ServiceResult;
use crate::notify::{Attachment, Notification, Notifier};
use crate::util::{new_id, non_blank, normalize_email, now_millis};

/// Identifier collisions tolerated before giving up
const MAX_ID_ATTEMPTS: usize = 5;

/// Decides which status changes are allowed
pub trait TransitionPolicy: Send + Sync {
    fn check(&self, from: OrderStatus, to: OrderStatus) -> Result<(), AppError>;
}

/// Any status to any status (admins correct mistakes by hand)
pub struct Unrestricted;

impl TransitionPolicy for Unrestricted {
    fn check(&self, _from: OrderStatus, _to: OrderStatus) -> Result<(), AppError> {
        Ok(())
    }
}

pub struct OrderLifecycle {
    orders: Arc<dyn OrderStore>,
    catalog: Arc<dyn CatalogStore>,
    notifier: Notifier,
    policy: Arc<dyn TransitionPolicy>,
}

impl OrderLifecycle {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        catalog: Arc<dyn CatalogStore>,
        notifier: Notifier,
    ) -> Self {
        Self::with_policy(orders, catalog, notifier, Arc::new(Unrestricted))
    }

    pub fn with_policy(
        orders: Arc<dyn OrderStore>,
        catalog: Arc<dyn CatalogStore>,
        notifier: Notifier,
        policy: Arc<dyn TransitionPolicy>,
    ) -> Self {
        Self {
            orders,
            catalog,
            notifier,
            policy,
        }
    }

    /// Create a `pending` order and announce it on the payment channel
    pub async fn create(
        &self,
        input: NewOrder,
        attachment: Option<Attachment>,
    ) -> ServiceResult<Order> {
        let input = self.snapshot_catalog(validate(input)?).await?;

        let now = now_millis();
        let subtotal = input.subtotal().ok_or_else(items_out_of_range)?;
        let product_name = input.summary_name();
        let product_id = input
            .items
            .first()
            .map(|i| i.product_id.clone())
            .unwrap_or_default();

        let mut order = Order {
            id: new_id(),
            order_id: generate_order_id(),
            imvu_id: input.imvu_id,
            email: input.email,
            product_id,
            product_name,
            items: input.items,
            subtotal,
            total: subtotal,
            payment_method: input.payment_method,
            transaction_id: input.transaction_id,
            screenshot_url: input.screenshot_url,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        let mut attempt = 1;
        loop {
            match self.orders.insert(&order).await {
                Ok(()) => break,
                Err(StoreError::DuplicateOrderId(taken)) if attempt < MAX_ID_ATTEMPTS => {
                    tracing::warn!(order_id = %taken, attempt, "Order identifier collision, regenerating");
                    order.order_id = generate_order_id();
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }

        tracing::info!(
            order_id = %order.order_id,
            items = order.items.len(),
            total = order.total,
            "Order created"
        );

        self.notifier.publish(Notification::Submitted {
            order: Box::new(order.clone()),
            attachment,
        });
        Ok(order)
    }

    /// Admin status update by internal id
    ///
    /// The status is validated before the order is looked up, so a bogus
    /// value never touches the store.
    pub async fn update_status(&self, id: &str, status: &str) -> ServiceResult<Order> {
        let to: OrderStatus = status.parse()?;
        let order = self
            .orders
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;
        self.transition(&order, to).await
    }

    /// Apply one status change: policy check, single-row write, notification
    pub async fn transition(&self, order: &Order, to: OrderStatus) -> ServiceResult<Order> {
        self.policy.check(order.status, to)?;

        // strictly after the previous value, even with a skewed clock
        let updated_at = now_millis().max(order.updated_at + 1);
        let updated = self
            .orders
            .update_status(&order.id, to, updated_at)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;

        tracing::info!(
            order_id = %updated.order_id,
            from = %order.status,
            to = %updated.status,
            "Order status updated"
        );

        self.notifier.publish(Notification::StatusChanged {
            order: Box::new(updated.clone()),
        });
        Ok(updated)
    }

    /// Public lookup by identifier, or by email when the query contains `@`
    pub async fn track(&self, query: &str) -> ServiceResult<Order> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::required_fields(["search"]).into());
        }

        let found = if query.contains('@') {
            self.orders
                .find_latest_by_email(&normalize_email(query))
                .await?
        } else {
            self.orders.find_by_order_id(query).await?
        };

        // same error for a wrong identifier and a wrong email
        found.ok_or_else(|| AppError::new(ErrorCode::OrderNotFound).into())
    }

    /// Admin listing, newest first; blank or `all` means no filter
    pub async fn list(&self, status: Option<&str>) -> ServiceResult<Vec<Order>> {
        let filter = match status.map(str::trim) {
            None | Some("") | Some("all") => None,
            Some(s) => Some(s.parse::<OrderStatus>()?),
        };
        Ok(self.orders.list(filter).await?)
    }

    /// Overwrite client-supplied names and prices with the catalog's
    async fn snapshot_catalog(&self, mut input: NewOrder) -> ServiceResult<NewOrder> {
        for item in &mut input.items {
            match self.catalog.get(&item.product_id).await? {
                Some(product) => {
                    if product.price != item.unit_price {
                        tracing::warn!(
                            product_id = %product.id,
                            submitted = item.unit_price,
                            catalog = product.price,
                            "Submitted price differs from catalog, using catalog price"
                        );
                    }
                    item.product_name = product.name;
                    item.unit_price = product.price;
                    item.line_total = item
                        .checked_total()
                        .ok_or_else(|| out_of_range(&item.product_id))?;
                }
                None => {
                    tracing::warn!(
                        product_id = %item.product_id,
                        "Product not in catalog, keeping submitted snapshot"
                    );
                }
            }
        }
        Ok(input)
    }
}

/// Trim, normalize and check the customer input
fn validate(input: NewOrder) -> Result<NewOrder, AppError> {
    let imvu_id = non_blank(Some(&input.imvu_id));
    let email = non_blank(Some(&input.email)).map(|e| normalize_email(&e));
    let payment_method = non_blank(Some(&input.payment_method));

    let mut missing = Vec::new();
    if imvu_id.is_none() {
        missing.push("imvuId");
    }
    if email.is_none() {
        missing.push("email");
    }
    if payment_method.is_none() {
        missing.push("paymentMethod");
    }
    if !missing.is_empty() {
        return Err(AppError::required_fields(missing));
    }

    let email = email.unwrap_or_default();
    if !email.validate_email() {
        return Err(AppError::validation("Invalid email address")
            .with_detail("fields", serde_json::json!(["email"])));
    }

    if input.items.is_empty() {
        return Err(AppError::new(ErrorCode::OrderEmpty));
    }
    for item in &input.items {
        if item.product_id.trim().is_empty() || item.product_name.trim().is_empty() {
            return Err(AppError::required_fields(["productId", "productName"]));
        }
        if !(1..=MAX_QUANTITY).contains(&item.quantity)
            || !(0..=MAX_UNIT_PRICE).contains(&item.unit_price)
        {
            return Err(out_of_range(&item.product_id));
        }
    }

    let mut items = input.items;
    for item in &mut items {
        item.line_total = item
            .checked_total()
            .ok_or_else(|| out_of_range(&item.product_id))?;
    }

    Ok(NewOrder {
        imvu_id: imvu_id.unwrap_or_default(),
        email,
        payment_method: payment_method.unwrap_or_default(),
        transaction_id: non_blank(input.transaction_id.as_deref()),
        screenshot_url: non_blank(input.screenshot_url.as_deref()),
        items,
    })
}

fn items_out_of_range() -> AppError {
    AppError::new(ErrorCode::ValueOutOfRange).with_detail("fields", serde_json::json!(["items"]))
}

fn out_of_range(product_id: &str) -> AppError {
    items_out_of_range().with_detail("productId", product_id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::is_order_id;
    use crate::db::memory::{MemoryCatalogStore, MemoryOrderStore};
    use crate::notify::NotificationSink;
    use async_trait::async_trait;
    use shared::models::{OrderLineItem, Product};
    use std::time::Duration;
    use tokio::sync::mpsc;

    struct Capture(mpsc::UnboundedSender<Notification>);

    #[async_trait]
    impl NotificationSink for Capture {
        async fn deliver(&self, notification: Notification) {
            let _ = self.0.send(notification);
        }
    }

    struct ForwardOnly;

    impl TransitionPolicy for ForwardOnly {
        fn check(&self, from: OrderStatus, _to: OrderStatus) -> Result<(), AppError> {
            if from.is_terminal() {
                return Err(AppError::new(ErrorCode::InvalidStatusTransition));
            }
            Ok(())
        }
    }

    fn product(id: &str, name: &str, price: i64) -> Product {
        Product {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            price,
            category: "triggers".into(),
            product_type: "Permanent".into(),
            image_url: String::new(),
            video_url: None,
            features: vec![],
            is_gift: false,
            login_method: None,
            vip_required: false,
            sex_room_needed: false,
            pc_support: true,
            mobile_support: true,
        }
    }

    fn new_order(email: &str) -> NewOrder {
        NewOrder {
            imvu_id: "user1".into(),
            email: email.into(),
            payment_method: "PayPal".into(),
            transaction_id: None,
            screenshot_url: None,
            items: vec![OrderLineItem::new("p1", "BBC KING V5", 5399, 1)],
        }
    }

    fn engine(
        products: Vec<Product>,
    ) -> (OrderLifecycle, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let notifier = Notifier::spawn(Arc::new(Capture(tx)), 16);
        let lifecycle = OrderLifecycle::new(
            Arc::new(MemoryOrderStore::new()),
            Arc::new(MemoryCatalogStore::with_products(products)),
            notifier,
        );
        (lifecycle, rx)
    }

    async fn next(rx: &mut mpsc::UnboundedReceiver<Notification>) -> Notification {
        tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn create_starts_pending_and_announces_submission() {
        let (lifecycle, mut rx) = engine(vec![]);
        let order = lifecycle
            .create(new_order("  A@B.com "), None)
            .await
            .unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.email, "a@b.com");
        assert_eq!(order.total, 5399);
        assert_eq!(order.subtotal, order.total);
        assert!(is_order_id(&order.order_id));

        match next(&mut rx).await {
            Notification::Submitted { order: sent, .. } => assert_eq!(sent.id, order.id),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn create_snapshots_catalog_price_and_name() {
        let (lifecycle, _rx) = engine(vec![product("p1", "BBC KING V5", 5399)]);
        let mut input = new_order("a@b.com");
        input.items = vec![OrderLineItem::new("p1", "cheap", 1, 2)];

        let order = lifecycle.create(input, None).await.unwrap();
        assert_eq!(order.items[0].product_name, "BBC KING V5");
        assert_eq!(order.items[0].unit_price, 5399);
        assert_eq!(order.total, 5399 * 2);
        assert_eq!(order.product_name, "BBC KING V5");
    }

    #[tokio::test]
    async fn create_rejects_missing_fields_before_persisting() {
        let (lifecycle, _rx) = engine(vec![]);
        let mut input = new_order(" ");
        input.imvu_id = String::new();

        let err: AppError = lifecycle.create(input, None).await.unwrap_err().into();
        assert_eq!(err.code, ErrorCode::RequiredField);
        let details = err.details.unwrap();
        assert_eq!(details["fields"], serde_json::json!(["imvuId", "email"]));
        assert!(lifecycle.list(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_rejects_empty_cart_and_bad_quantity() {
        let (lifecycle, _rx) = engine(vec![]);

        let mut empty = new_order("a@b.com");
        empty.items.clear();
        let err: AppError = lifecycle.create(empty, None).await.unwrap_err().into();
        assert_eq!(err.code, ErrorCode::OrderEmpty);

        let mut zero = new_order("a@b.com");
        zero.items = vec![OrderLineItem::new("p1", "x", 100, 0)];
        let err: AppError = lifecycle.create(zero, None).await.unwrap_err().into();
        assert_eq!(err.code, ErrorCode::ValueOutOfRange);
    }

    #[tokio::test]
    async fn update_status_persists_and_notifies_fixed_message() {
        let (lifecycle, mut rx) = engine(vec![]);
        let order = lifecycle.create(new_order("a@b.com"), None).await.unwrap();
        let _ = next(&mut rx).await;

        let updated = lifecycle.update_status(&order.id, "completed").await.unwrap();
        assert_eq!(updated.status, OrderStatus::Completed);
        assert!(updated.updated_at > order.updated_at);

        match next(&mut rx).await {
            Notification::StatusChanged { order: sent } => {
                assert_eq!(sent.status.message(), "Your product has been delivered");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn failing_webhook_does_not_undo_status_update() {
        let lifecycle = OrderLifecycle::new(
            Arc::new(MemoryOrderStore::new()),
            Arc::new(MemoryCatalogStore::new()),
            Notifier::spawn(
                Arc::new(crate::notify::DiscordWebhook::new(
                    "http://127.0.0.1:9/payment",
                    "http://127.0.0.1:9/status",
                )),
                16,
            ),
        );
        let order = lifecycle.create(new_order("a@b.com"), None).await.unwrap();
        let updated = lifecycle.update_status(&order.id, "completed").await.unwrap();
        assert_eq!(updated.status, OrderStatus::Completed);

        // give the worker time to fail delivery
        tokio::time::sleep(Duration::from_millis(200)).await;
        let stored = lifecycle.track(&order.order_id).await.unwrap();
        assert_eq!(stored.status, OrderStatus::Completed);
        assert_eq!(stored.updated_at, updated.updated_at);
    }

    #[tokio::test]
    async fn bogus_status_leaves_order_unchanged() {
        let (lifecycle, _rx) = engine(vec![]);
        let order = lifecycle.create(new_order("a@b.com"), None).await.unwrap();

        let err: AppError = lifecycle
            .update_status(&order.id, "bogus")
            .await
            .unwrap_err()
            .into();
        assert_eq!(err.code, ErrorCode::InvalidOrderStatus);

        let after = lifecycle.track(&order.order_id).await.unwrap();
        assert_eq!(after, order);
    }

    #[tokio::test]
    async fn update_status_on_unknown_id_is_not_found() {
        let (lifecycle, _rx) = engine(vec![]);
        let err: AppError = lifecycle
            .update_status("missing", "processing")
            .await
            .unwrap_err()
            .into();
        assert_eq!(err.code, ErrorCode::OrderNotFound);
    }

    #[tokio::test]
    async fn policy_is_consulted_on_every_transition() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let lifecycle = OrderLifecycle::with_policy(
            Arc::new(MemoryOrderStore::new()),
            Arc::new(MemoryCatalogStore::new()),
            Notifier::spawn(Arc::new(Capture(tx)), 16),
            Arc::new(ForwardOnly),
        );
        let order = lifecycle.create(new_order("a@b.com"), None).await.unwrap();
        lifecycle.update_status(&order.id, "rejected").await.unwrap();

        let err: AppError = lifecycle
            .update_status(&order.id, "pending")
            .await
            .unwrap_err()
            .into();
        assert_eq!(err.code, ErrorCode::InvalidStatusTransition);
    }

    #[tokio::test]
    async fn track_dispatches_on_at_sign() {
        let (lifecycle, _rx) = engine(vec![]);
        let order = lifecycle.create(new_order("a@b.com"), None).await.unwrap();

        assert_eq!(lifecycle.track(&order.order_id).await.unwrap().id, order.id);
        assert_eq!(lifecycle.track("  A@B.COM ").await.unwrap().id, order.id);

        let by_id: AppError = lifecycle.track("nonexistent").await.unwrap_err().into();
        let by_email: AppError = lifecycle.track("x@y.com").await.unwrap_err().into();
        assert_eq!(by_id.code, ErrorCode::OrderNotFound);
        assert_eq!(by_id.message, by_email.message);

        let lower: AppError = lifecycle
            .track(&order.order_id.to_lowercase())
            .await
            .unwrap_err()
            .into();
        assert_eq!(lower.code, ErrorCode::OrderNotFound);
    }

    #[tokio::test]
    async fn track_matches_stored_identifier_of_any_shape() {
        let orders = Arc::new(MemoryOrderStore::new());
        let (tx, _rx) = mpsc::unbounded_channel();
        let lifecycle = OrderLifecycle::new(
            orders.clone(),
            Arc::new(MemoryCatalogStore::new()),
            Notifier::spawn(Arc::new(Capture(tx)), 16),
        );
        let items = vec![OrderLineItem::new("p1", "BBC KING V5", 5399, 1)];
        let legacy = Order {
            id: new_id(),
            order_id: "BM-123-ABC".into(),
            imvu_id: "user1".into(),
            email: "a@b.com".into(),
            product_id: "p1".into(),
            product_name: "BBC KING V5".into(),
            items,
            subtotal: 5399,
            total: 5399,
            payment_method: "PayPal".into(),
            transaction_id: None,
            screenshot_url: None,
            status: OrderStatus::Pending,
            created_at: 1,
            updated_at: 1,
        };
        orders.insert(&legacy).await.unwrap();

        assert_eq!(lifecycle.track(" BM-123-ABC ").await.unwrap(), legacy);
        assert_eq!(lifecycle.track("A@B.COM").await.unwrap(), legacy);
        assert!(lifecycle.track("nonexistent").await.is_err());
    }

    #[tokio::test]
    async fn overflowing_amounts_are_rejected_before_persisting() {
        let (lifecycle, _rx) = engine(vec![product("p1", "BBC KING V5", 5399)]);

        let mut huge_price = new_order("a@b.com");
        huge_price.items = vec![OrderLineItem::new("p9", "x", i64::MAX, 2)];
        let err: AppError = lifecycle.create(huge_price, None).await.unwrap_err().into();
        assert_eq!(err.code, ErrorCode::ValueOutOfRange);
        assert_eq!(err.details.unwrap()["fields"], serde_json::json!(["items"]));

        let mut huge_qty = new_order("a@b.com");
        huge_qty.items = vec![OrderLineItem::new("p1", "BBC KING V5", 5399, i32::MAX)];
        let err: AppError = lifecycle.create(huge_qty, None).await.unwrap_err().into();
        assert_eq!(err.code, ErrorCode::ValueOutOfRange);

        let mut at_limit = new_order("a@b.com");
        at_limit.items = vec![OrderLineItem::new("p9", "x", MAX_UNIT_PRICE, MAX_QUANTITY)];
        let order = lifecycle.create(at_limit, None).await.unwrap();
        assert_eq!(order.total, MAX_UNIT_PRICE * i64::from(MAX_QUANTITY));

        assert_eq!(lifecycle.list(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn blank_track_query_is_a_validation_error() {
        let (lifecycle, _rx) = engine(vec![]);
        let err: AppError = lifecycle.track("   ").await.unwrap_err().into();
        assert_eq!(err.code, ErrorCode::RequiredField);
    }

    #[tokio::test]
    async fn list_filter_accepts_all_and_rejects_unknown() {
        let (lifecycle, _rx) = engine(vec![]);
        let order = lifecycle.create(new_order("a@b.com"), None).await.unwrap();
        lifecycle.update_status(&order.id, "processing").await.unwrap();
        lifecycle.create(new_order("c@d.com"), None).await.unwrap();

        assert_eq!(lifecycle.list(Some("all")).await.unwrap().len(), 2);
        assert_eq!(lifecycle.list(Some("processing")).await.unwrap().len(), 1);
        assert!(lifecycle.list(Some("weird")).await.is_err());
    }
}
