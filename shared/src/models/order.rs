//! Order Model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{AppError, ErrorCode};

/// Order verification status
///
/// Persisted and serialized as the lower-case name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Created, payment proof awaiting review
    Pending,
    /// Payment verified, delivery in progress
    Processing,
    /// Product delivered
    Completed,
    /// Payment could not be verified
    Rejected,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Completed,
        OrderStatus::Rejected,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Completed => "completed",
            OrderStatus::Rejected => "rejected",
        }
    }

    /// Customer-facing text sent with every status notification
    pub const fn message(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Awaiting payment confirmation",
            OrderStatus::Processing => "Your order is being completed",
            OrderStatus::Completed => "Your product has been delivered",
            OrderStatus::Rejected => "Payment not verified, please contact support",
        }
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Rejected)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "processing" => Ok(OrderStatus::Processing),
            "completed" => Ok(OrderStatus::Completed),
            "rejected" => Ok(OrderStatus::Rejected),
            other => Err(AppError::new(ErrorCode::InvalidOrderStatus)
                .with_detail("fields", serde_json::json!(["status"]))
                .with_detail("value", other)),
        }
    }
}

/// One purchased product inside an order, snapshotted at creation time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderLineItem {
    pub product_id: String,
    pub product_name: String,
    /// Unit price in cents
    pub unit_price: i64,
    pub quantity: i32,
    /// unit_price * quantity
    pub line_total: i64,
}

/// Upper bound on a single unit price (cents)
pub const MAX_UNIT_PRICE: i64 = 100_000_000;
/// Upper bound on the quantity of one line item
pub const MAX_QUANTITY: i32 = 1_000;

impl OrderLineItem {
    pub fn new(
        product_id: impl Into<String>,
        product_name: impl Into<String>,
        unit_price: i64,
        quantity: i32,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            product_name: product_name.into(),
            unit_price,
            quantity,
            line_total: unit_price.saturating_mul(i64::from(quantity)),
        }
    }

    /// `unit_price * quantity`, `None` on overflow
    pub fn checked_total(&self) -> Option<i64> {
        self.unit_price.checked_mul(i64::from(self.quantity))
    }
}

/// Order entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Internal key (UUID), target of admin status updates
    pub id: String,
    /// Customer-facing identifier, `BM-<millis>-<7 chars>`
    pub order_id: String,
    pub imvu_id: String,
    /// Trimmed and lower-cased
    pub email: String,
    /// First line item's product (kept for single-item clients)
    pub product_id: String,
    /// Product name, or a comma-joined list for cart orders
    pub product_name: String,
    pub items: Vec<OrderLineItem>,
    /// Cents
    pub subtotal: i64,
    /// Cents, equal to subtotal
    pub total: i64,
    pub payment_method: String,
    pub transaction_id: Option<String>,
    pub screenshot_url: Option<String>,
    pub status: OrderStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Customer input for a new order, before an identifier is assigned
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub imvu_id: String,
    pub email: String,
    pub payment_method: String,
    pub transaction_id: Option<String>,
    pub screenshot_url: Option<String>,
    pub items: Vec<OrderLineItem>,
}

impl NewOrder {
    /// Sum of line totals, `None` on overflow
    pub fn subtotal(&self) -> Option<i64> {
        self.items
            .iter()
            .try_fold(0i64, |acc, i| acc.checked_add(i.line_total))
    }

    /// Display name used in notifications and the denormalized column
    pub fn summary_name(&self) -> String {
        match self.items.as_slice() {
            [single] => single.product_name.clone(),
            items => items
                .iter()
                .map(|i| {
                    if i.quantity > 1 {
                        format!("{} x{}", i.product_name, i.quantity)
                    } else {
                        i.product_name.clone()
                    }
                })
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}
