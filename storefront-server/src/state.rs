//! Application state for the storefront server

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;

use crate::auth::SessionRegistry;
use crate::config::{Config, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_NOTIFY_QUEUE_CAPACITY};
use crate::db::memory::{
    MemoryCatalogStore, MemoryContactStore, MemoryOrderStore, MemoryReviewStore,
};
use crate::db::{
    CatalogStore, ContactStore, OrderStore, PgCatalogStore, PgContactStore, PgOrderStore,
    PgReviewStore, ReviewStore,
};
use crate::media::{DiskMediaStore, MediaStore, MemoryMediaStore};
use crate::notify::{DiscordWebhook, NotificationSink, Notifier};
use crate::orders::OrderLifecycle;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub orders: Arc<dyn OrderStore>,
    pub catalog: Arc<dyn CatalogStore>,
    pub reviews: Arc<dyn ReviewStore>,
    pub contacts: Arc<dyn ContactStore>,
    /// Uploaded product media
    pub media: Arc<dyn MediaStore>,
    /// Admin session tokens
    pub sessions: SessionRegistry,
    pub notifier: Notifier,
    pub lifecycle: Arc<OrderLifecycle>,
    /// Request body limit
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Production state: PostgreSQL stores, Discord webhook sink
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");

        let sink: Arc<dyn NotificationSink> = Arc::new(DiscordWebhook::new(
            config.payment_webhook_url.clone(),
            config.status_webhook_url.clone(),
        ));
        if config.payment_webhook_url.is_empty() || config.status_webhook_url.is_empty() {
            tracing::warn!("Webhook URL(s) not configured, notifications partially disabled");
        }

        Ok(Self::assemble(
            Arc::new(PgOrderStore::new(pool.clone())),
            Arc::new(PgCatalogStore::new(pool.clone())),
            Arc::new(PgReviewStore::new(pool.clone())),
            Arc::new(PgContactStore::new(pool)),
            Arc::new(DiskMediaStore::new(config.media_dir.clone())),
            SessionRegistry::shared_secret(&config.admin_password),
            Notifier::spawn(sink, config.notify_queue_capacity),
            config.max_upload_bytes,
        ))
    }

    /// Database-free state over the in-memory stores
    ///
    /// Must be called inside a Tokio runtime (spawns the notification worker).
    pub fn in_memory(admin_password: &str, sink: Arc<dyn NotificationSink>) -> Self {
        Self::assemble(
            Arc::new(MemoryOrderStore::new()),
            Arc::new(MemoryCatalogStore::new()),
            Arc::new(MemoryReviewStore::new()),
            Arc::new(MemoryContactStore::new()),
            Arc::new(MemoryMediaStore::new()),
            SessionRegistry::shared_secret(admin_password),
            Notifier::spawn(sink, DEFAULT_NOTIFY_QUEUE_CAPACITY),
            DEFAULT_MAX_UPLOAD_BYTES,
        )
    }

    /// Same as [`AppState::in_memory`] with a pre-populated catalog
    pub fn in_memory_with_catalog(
        admin_password: &str,
        sink: Arc<dyn NotificationSink>,
        catalog: Arc<dyn CatalogStore>,
    ) -> Self {
        let mut state = Self::in_memory(admin_password, sink);
        state.lifecycle = Arc::new(OrderLifecycle::new(
            state.orders.clone(),
            catalog.clone(),
            state.notifier.clone(),
        ));
        state.catalog = catalog;
        state
    }

    fn assemble(
        orders: Arc<dyn OrderStore>,
        catalog: Arc<dyn CatalogStore>,
        reviews: Arc<dyn ReviewStore>,
        contacts: Arc<dyn ContactStore>,
        media: Arc<dyn MediaStore>,
        sessions: SessionRegistry,
        notifier: Notifier,
        max_upload_bytes: usize,
    ) -> Self {
        let lifecycle = Arc::new(OrderLifecycle::new(
            orders.clone(),
            catalog.clone(),
            notifier.clone(),
        ));
        Self {
            orders,
            catalog,
            reviews,
            contacts,
            media,
            sessions,
            notifier,
            lifecycle,
            max_upload_bytes,
        }
    }
}
