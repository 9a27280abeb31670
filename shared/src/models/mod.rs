//! Data models
//!
//! Shared between the storefront server and its API clients.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! IDs are UUID strings, timestamps are epoch milliseconds.

pub mod contact;
pub mod order;
pub mod product;
pub mod review;

// Re-exports
pub use contact::*;
pub use order::*;
pub use product::*;
pub use review::*;
