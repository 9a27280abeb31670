//! HTTP API for the storefront
//!
//! | Path | Auth |
//! |------|------|
//! | /health | public |
//! | /api/products, /api/reviews, /api/contact | public |
//! | /api/orders, /api/orders/cart, /api/payment-upload, /api/orders/track | public |
//! | /api/admin/login | public (password) |
//! | /api/admin/* | Bearer session token |

pub mod admin;
pub mod catalog;
pub mod contact;
pub mod health;
pub mod orders;
pub mod reviews;
mod upload;

use axum::extract::DefaultBodyLimit;
use axum::{Json, Router};
use http::{HeaderName, HeaderValue};
use shared::error::AppError;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;
use validator::ValidationErrors;

use crate::state::AppState;

pub type ApiResult<T> = Result<Json<T>, AppError>;

const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// All routes, no middleware, no state
pub fn build_router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(catalog::router())
        .merge(orders::router())
        .merge(reviews::router())
        .merge(contact::router())
        .merge(admin::router())
}

/// Fully layered application, used by `main` and the HTTP tests
pub fn build_app(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes;
    // Router::layer wraps outward: the last layer added runs first
    build_router()
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            REQUEST_ID_HEADER,
        )))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            XRequestId,
        ))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// `product_id` -> `productId`
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Field-level validation failure, offending fields under `details.fields`
pub(crate) fn validation_error(errors: &ValidationErrors) -> AppError {
    let mut fields: Vec<String> = errors
        .field_errors()
        .keys()
        .map(|k| camel_case(k))
        .collect();
    fields.sort();
    AppError::validation(format!("Invalid fields: {}", fields.join(", ")))
        .with_detail("fields", serde_json::json!(fields))
}
