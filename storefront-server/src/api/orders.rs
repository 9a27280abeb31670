//! Public order endpoints: checkout, payment proof, tracking
//!
//! Every entry point funnels into [`OrderLifecycle::create`](crate::orders::OrderLifecycle::create),
//! so all three produce the same `pending` order and submission event.

use axum::{
    Json, Router,
    extract::{Multipart, Query, State},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::{NewOrder, Order, OrderLineItem};

use super::ApiResult;
use super::upload::{UploadForm, read_form};
use crate::state::AppState;

const SCREENSHOT_FIELD: &str = "screenshot";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/orders", post(create_order))
        .route("/api/orders/cart", post(create_cart_order))
        .route("/api/orders/track", get(track_order))
        .route("/api/payment-upload", post(payment_upload))
}

/// Single-item order body; missing fields are reported by validation
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateOrderRequest {
    pub imvu_id: String,
    pub email: String,
    pub payment_method: String,
    pub product_id: String,
    pub product_name: String,
    /// Cents
    pub total: i64,
    pub transaction_id: Option<String>,
    pub screenshot_url: Option<String>,
}

/// Cart line as sent by the storefront
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CartItem {
    #[serde(alias = "id")]
    product_id: String,
    #[serde(alias = "name")]
    product_name: String,
    /// Cents
    price: i64,
    #[serde(default = "one")]
    quantity: i32,
}

fn one() -> i32 {
    1
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedResponse {
    pub success: bool,
    pub order_id: String,
}

impl From<Order> for SubmittedResponse {
    fn from(order: Order) -> Self {
        Self {
            success: true,
            order_id: order.order_id,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TrackQuery {
    #[serde(default)]
    pub search: String,
}

/// POST /api/orders
pub async fn create_order(
    State(state): State<AppState>,
    Json(req): Json<CreateOrderRequest>,
) -> ApiResult<Order> {
    let input = NewOrder {
        imvu_id: req.imvu_id,
        email: req.email,
        payment_method: req.payment_method,
        transaction_id: req.transaction_id,
        screenshot_url: req.screenshot_url,
        items: vec![OrderLineItem::new(
            req.product_id,
            req.product_name,
            req.total,
            1,
        )],
    };
    let order = state.lifecycle.create(input, None).await?;
    Ok(Json(order))
}

fn parse_items(raw: Option<String>) -> Result<Vec<OrderLineItem>, AppError> {
    let raw = raw.ok_or_else(|| AppError::required_fields(["items"]))?;
    let items: Vec<CartItem> = serde_json::from_str(&raw).map_err(|e| {
        AppError::with_message(ErrorCode::InvalidFormat, format!("Invalid items: {e}"))
            .with_detail("fields", serde_json::json!(["items"]))
    })?;
    Ok(items
        .into_iter()
        .map(|i| OrderLineItem::new(i.product_id, i.product_name, i.price, i.quantity))
        .collect())
}

fn new_order_from_form(form: &UploadForm, items: Vec<OrderLineItem>) -> NewOrder {
    NewOrder {
        imvu_id: form.text("imvuId").unwrap_or_default(),
        email: form.text("email").unwrap_or_default(),
        payment_method: form.text("paymentMethod").unwrap_or_default(),
        transaction_id: form.text("transactionId"),
        screenshot_url: form.file.as_ref().map(|f| f.filename.clone()),
        items,
    }
}

/// POST /api/orders/cart (multipart)
///
/// Client-side subtotal/total fields are ignored; totals are recomputed
/// from the line items.
pub async fn create_cart_order(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<SubmittedResponse> {
    let mut form = read_form(multipart, SCREENSHOT_FIELD).await?;
    let items = parse_items(form.text("items"))?;
    let input = new_order_from_form(&form, items);
    let order = state.lifecycle.create(input, form.file.take()).await?;
    Ok(Json(order.into()))
}

/// POST /api/payment-upload (multipart, screenshot required)
///
/// A missing or malformed `total` is recorded as 0 cents for products the
/// catalog does not know.
pub async fn payment_upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<SubmittedResponse> {
    let mut form = read_form(multipart, SCREENSHOT_FIELD).await?;

    let required = [
        "imvuId",
        "email",
        "transactionId",
        "productId",
        "productName",
        "paymentMethod",
    ];
    let missing: Vec<&str> = required
        .into_iter()
        .filter(|f| form.text(f).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(AppError::required_fields(missing));
    }
    if form.file.is_none() {
        return Err(AppError::new(ErrorCode::PaymentProofRequired));
    }

    // unit price comes from the catalog when the product is known
    let price = match form.text("total").map(|t| t.parse::<i64>()) {
        Some(Ok(cents)) => cents,
        submitted => {
            tracing::warn!(
                product_id = ?form.text("productId"),
                total = ?submitted,
                "Payment upload without a usable total, defaulting to 0 unless the catalog knows the product"
            );
            0
        }
    };
    let item = OrderLineItem::new(
        form.text("productId").unwrap_or_default(),
        form.text("productName").unwrap_or_default(),
        price,
        1,
    );
    let input = new_order_from_form(&form, vec![item]);
    let order = state.lifecycle.create(input, form.file.take()).await?;
    Ok(Json(order.into()))
}

/// GET /api/orders/track?search=
pub async fn track_order(
    State(state): State<AppState>,
    Query(query): Query<TrackQuery>,
) -> ApiResult<Order> {
    let order = state.lifecycle.track(&query.search).await?;
    Ok(Json(order))
}
