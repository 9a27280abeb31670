//! Session registry
//!
//! Tokens live only in process memory: a restart logs every admin out.
//! There is no expiry other than explicit logout.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashSet;
use sha2::{Digest, Sha256};
use shared::error::AppError;

use crate::util::generate_token;

/// Checks a login password
pub trait Authenticator: Send + Sync {
    fn verify(&self, password: &str) -> bool;
}

/// Single process-wide admin secret
pub struct SharedSecret {
    digest: [u8; 32],
}

impl SharedSecret {
    pub fn new(secret: &str) -> Self {
        Self {
            digest: Sha256::digest(secret.as_bytes()).into(),
        }
    }
}

impl Authenticator for SharedSecret {
    fn verify(&self, password: &str) -> bool {
        // fixed-length digests, compared without early exit
        let supplied: [u8; 32] = Sha256::digest(password.as_bytes()).into();
        supplied
            .iter()
            .zip(self.digest.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

/// Set of valid session tokens
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert(&self, token: String);
    async fn contains(&self, token: &str) -> bool;
    /// Returns false when the token was not present
    async fn remove(&self, token: &str) -> bool;
    async fn len(&self) -> usize;
}

/// Concurrent in-process token set
#[derive(Default)]
pub struct InMemorySessions {
    tokens: DashSet<String>,
}

impl InMemorySessions {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessions {
    async fn insert(&self, token: String) {
        self.tokens.insert(token);
    }

    async fn contains(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }

    async fn remove(&self, token: &str) -> bool {
        self.tokens.remove(token).is_some()
    }

    async fn len(&self) -> usize {
        self.tokens.len()
    }
}

#[derive(Clone)]
pub struct SessionRegistry {
    authenticator: Arc<dyn Authenticator>,
    sessions: Arc<dyn SessionStore>,
}

impl SessionRegistry {
    pub fn new(authenticator: Arc<dyn Authenticator>, sessions: Arc<dyn SessionStore>) -> Self {
        Self {
            authenticator,
            sessions,
        }
    }

    /// Shared-secret registry with in-memory sessions
    pub fn shared_secret(secret: &str) -> Self {
        Self::new(
            Arc::new(SharedSecret::new(secret)),
            Arc::new(InMemorySessions::new()),
        )
    }

    /// Mint a new session token
    pub async fn login(&self, password: &str) -> Result<String, AppError> {
        if !self.authenticator.verify(password) {
            tracing::warn!("Admin login failed");
            return Err(AppError::invalid_credentials());
        }
        let token = generate_token();
        self.sessions.insert(token.clone()).await;
        let active = self.sessions.len().await;
        tracing::info!(active, "Admin logged in");
        Ok(token)
    }

    pub async fn authorize(&self, token: &str) -> Result<(), AppError> {
        if self.sessions.contains(token).await {
            Ok(())
        } else {
            Err(AppError::invalid_token("Invalid or expired session"))
        }
    }

    /// Revoke a token; unknown tokens are ignored
    pub async fn logout(&self, token: &str) {
        if self.sessions.remove(token).await {
            tracing::info!("Admin logged out");
        }
    }

    pub async fn active_sessions(&self) -> usize {
        self.sessions.len().await
    }
}
