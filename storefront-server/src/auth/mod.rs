//! Admin authorization gate
//!
//! A shared secret buys an opaque session token; every admin handler takes
//! an [`AdminSession`] so the token is checked before the handler body runs.

pub mod extractor;
pub mod session;

pub use extractor::AdminSession;
pub use session::{Authenticator, InMemorySessions, SessionRegistry, SessionStore, SharedSecret};
