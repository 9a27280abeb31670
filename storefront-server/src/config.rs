//! Storefront server configuration

use std::path::PathBuf;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const DEFAULT_HTTP_PORT: u16 = 5000;
pub(crate) const DEFAULT_NOTIFY_QUEUE_CAPACITY: usize = 256;
pub(crate) const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_MEDIA_DIR: &str = "uploaded_assets/products";

/// Server configuration, read once at startup
#[derive(Clone)]
pub struct Config {
    /// Shared admin secret (env: ADMIN_PASSWORD, required)
    pub admin_password: String,
    /// PostgreSQL connection URL
    pub database_url: String,
    /// HTTP port
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// Payment-proof channel webhook, empty disables it
    pub payment_webhook_url: String,
    /// Status/contact channel webhook, empty disables it
    pub status_webhook_url: String,
    /// Bounded queue between request handlers and the notification worker
    pub notify_queue_capacity: usize,
    /// Request body limit (screenshot and media uploads)
    pub max_upload_bytes: usize,
    /// Directory product media uploads are written to
    pub media_dir: PathBuf,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("admin_password", &"<redacted>")
            .field("http_port", &self.http_port)
            .field("environment", &self.environment)
            .field("payment_webhook", &!self.payment_webhook_url.is_empty())
            .field("status_webhook", &!self.status_webhook_url.is_empty())
            .field("notify_queue_capacity", &self.notify_queue_capacity)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("media_dir", &self.media_dir)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Admin secret: must be set and non-empty, in every environment.
    fn require_secret(name: &str) -> Result<String, BoxError> {
        let val = std::env::var(name).map_err(|_| format!("{name} must be set"))?;
        if val.is_empty() {
            return Err(format!("{name} must not be empty").into());
        }
        Ok(val)
    }

    fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> Result<T, BoxError> {
        match std::env::var(name) {
            Ok(v) if !v.trim().is_empty() => v
                .trim()
                .parse()
                .map_err(|_| format!("{name} is not a valid value: {v}").into()),
            _ => Ok(default),
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        Ok(Self {
            admin_password: Self::require_secret("ADMIN_PASSWORD")?,
            database_url: std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?,
            http_port: Self::parse_or("HTTP_PORT", DEFAULT_HTTP_PORT)?,
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            payment_webhook_url: std::env::var("PAYMENT_WEBHOOK_URL").unwrap_or_default(),
            status_webhook_url: std::env::var("STATUS_WEBHOOK_URL").unwrap_or_default(),
            notify_queue_capacity: Self::parse_or(
                "NOTIFY_QUEUE_CAPACITY",
                DEFAULT_NOTIFY_QUEUE_CAPACITY,
            )?
            .max(1),
            max_upload_bytes: Self::parse_or("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            media_dir: std::env::var("MEDIA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_MEDIA_DIR)),
        })
    }
}
