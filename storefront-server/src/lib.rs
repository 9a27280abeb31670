//! storefront-server: order intake and manual payment verification
//!
//! - Public catalog, checkout, payment-proof upload and order tracking
//! - Admin session gate over order status, catalog, media and review moderation
//! - Best-effort Discord notifications for submissions and status changes

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod media;
pub mod notify;
pub mod orders;
pub mod state;
pub mod util;

pub use api::{build_app, build_router};
pub use config::Config;
pub use state::AppState;
