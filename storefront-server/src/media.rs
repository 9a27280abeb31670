//! Product media storage
//!
//! Admin uploads land under a flat directory and are served back as
//! `/uploaded_assets/products/{name}`. Names are `{millis}-{12 hex}{.ext}`,
//! never the client's filename.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use dashmap::DashMap;
use rand::RngCore;

/// Public URL prefix for stored media
pub const MEDIA_URL_PREFIX: &str = "/uploaded_assets/products";

/// Content types accepted for product media
pub const ALLOWED_CONTENT_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "video/mp4",
    "video/webm",
];

pub fn is_allowed(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| ALLOWED_CONTENT_TYPES.contains(&ct))
}

/// Server-side name for an upload, keeping only a sane extension
pub fn media_file_name(original: &str, now_millis: i64) -> String {
    let mut suffix = [0u8; 6];
    rand::thread_rng().fill_bytes(&mut suffix);

    let ext = Path::new(original)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.len() <= 8 && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default();

    format!("{now_millis}-{}{ext}", hex::encode(suffix))
}

pub fn media_url(name: &str) -> String {
    format!("{MEDIA_URL_PREFIX}/{name}")
}

/// Where uploaded media bytes go
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Persist `bytes` under `name`
    async fn save(&self, name: &str, bytes: &[u8]) -> std::io::Result<()>;
}

/// Files under a local directory, created on first write
pub struct DiskMediaStore {
    root: PathBuf,
}

impl DiskMediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl MediaStore for DiskMediaStore {
    async fn save(&self, name: &str, bytes: &[u8]) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(self.root.join(name), bytes).await
    }
}

/// Keeps uploads in memory (tests, database-free runs)
#[derive(Default)]
pub struct MemoryMediaStore {
    files: DashMap<String, Vec<u8>>,
}

impl MemoryMediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<Vec<u8>> {
        self.files.get(name).map(|f| f.value().clone())
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[async_trait]
impl MediaStore for MemoryMediaStore {
    async fn save(&self, name: &str, bytes: &[u8]) -> std::io::Result<()> {
        self.files.insert(name.to_string(), bytes.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_keeps_extension_only() {
        let name = media_file_name("../../etc/Pink Room.MP4", 1_700_000_000_000);
        let (stem, ext) = name.split_once('.').unwrap();
        assert_eq!(ext, "mp4");
        let (millis, hex) = stem.split_once('-').unwrap();
        assert_eq!(millis, "1700000000000");
        assert_eq!(hex.len(), 12);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn file_name_drops_odd_extensions() {
        assert!(!media_file_name("noext", 1).contains('.'));
        assert!(!media_file_name("x.p/h", 1).contains('/'));
        assert_ne!(media_file_name("a.png", 1), media_file_name("a.png", 1));
    }

    #[test]
    fn allow_list_matches_images_and_videos() {
        assert!(is_allowed(Some("image/png")));
        assert!(is_allowed(Some("video/webm")));
        assert!(!is_allowed(Some("text/html")));
        assert!(!is_allowed(None));
    }

    #[tokio::test]
    async fn disk_store_creates_directory_and_writes() {
        let root = std::env::temp_dir().join(format!("storefront-media-{}", crate::util::new_id()));
        let store = DiskMediaStore::new(&root);
        store.save("a.png", b"png").await.unwrap();
        assert_eq!(tokio::fs::read(root.join("a.png")).await.unwrap(), b"png");
        tokio::fs::remove_dir_all(&root).await.unwrap();
    }

    #[tokio::test]
    async fn memory_store_keeps_bytes() {
        let store = MemoryMediaStore::new();
        store.save("a.png", b"png").await.unwrap();
        assert_eq!(store.get("a.png").unwrap(), b"png");
        assert_eq!(store.len(), 1);
    }
}
