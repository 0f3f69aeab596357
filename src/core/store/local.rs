use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;

use crate::core::store::{validate_key, ArtifactStore};

/// Writes artifacts into a directory and returns `file://` URLs.
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl ArtifactStore for LocalStore {
    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<String> {
        validate_key(key)?;
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Failed to create output directory: {}", self.dir.display()))?;
        let path = self.dir.join(key);
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("Failed to write artifact to {}", path.display()))?;
        let canonical = tokio::fs::canonicalize(&path).await;
        let path = canonical.unwrap_or(path);
        tracing::debug!(path = %path.display(), content_type, size = bytes.len(), "stored artifact");
        Ok(format!("file://{}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_writes_file_and_returns_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path().join("out"));
        let url = store.put("screenshot.png", b"png-bytes", "image/png").await.unwrap();

        let written = std::fs::read(dir.path().join("out").join("screenshot.png")).unwrap();
        assert_eq!(written, b"png-bytes");
        assert!(url.starts_with("file://"));
        assert!(url.ends_with("/out/screenshot.png"));
    }

    #[tokio::test]
    async fn put_overwrites_existing_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        store.put("chart", b"old", "text/html").await.unwrap();
        store.put("chart", b"new", "text/html").await.unwrap();
        assert_eq!(std::fs::read(dir.path().join("chart")).unwrap(), b"new");
    }

    #[tokio::test]
    async fn put_rejects_path_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        assert!(store.put("../escape", b"x", "text/plain").await.is_err());
    }
}
