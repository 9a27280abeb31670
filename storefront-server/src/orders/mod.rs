//! Order lifecycle: identifiers, creation, status transitions, lookup

pub mod identifier;
pub mod lifecycle;

pub use identifier::{generate_order_id, is_order_id};
pub use lifecycle::{OrderLifecycle, TransitionPolicy, Unrestricted};
