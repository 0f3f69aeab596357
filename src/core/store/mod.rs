pub mod key_value;
pub mod local;

use async_trait::async_trait;

/// Keeps rendered artifacts and hands back where they can be fetched.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Store `bytes` under `key`; returns a URL for the stored record.
    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> anyhow::Result<String>;
}

/// Record keys may not escape their store.
pub fn validate_key(key: &str) -> anyhow::Result<()> {
    if key.is_empty()
        || key.contains('/')
        || key.contains('\\')
        || key == "."
        || key == ".."
    {
        anyhow::bail!("Invalid artifact key: '{}'", key);
    }
    Ok(())
}
