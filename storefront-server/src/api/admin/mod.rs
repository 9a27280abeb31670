//! Admin API
//!
//! Everything except `/login` requires an [`AdminSession`](crate::auth::AdminSession).

pub mod auth;
pub mod media;
pub mod orders;
pub mod products;
pub mod reviews;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/admin", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/orders", get(orders::list))
        .route("/orders/{id}", patch(orders::update_status))
        .route("/products", post(products::create))
        .route(
            "/products/{id}",
            patch(products::update).delete(products::delete),
        )
        .route("/reviews", get(reviews::list))
        .route("/reviews/{id}", patch(reviews::moderate))
        .route("/upload-media", post(media::upload))
}
