use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::core::config::StoreConfig;
use crate::core::http::{client, validate_endpoint};
use crate::core::store::{validate_key, ArtifactStore};

/// Apify-style HTTP key-value store. Records are publicly readable at the
/// same URL they are written to.
pub struct KeyValueStore {
    api_url: String,
    store_id: String,
    token: Option<String>,
}

impl KeyValueStore {
    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        let store_id = config
            .store_id
            .clone()
            .context("store.store_id is required for the key_value store")?;
        validate_endpoint(&config.api_url, "Key-value store")?;
        Ok(Self {
            api_url: config.api_url.trim_end_matches('/').to_string(),
            store_id,
            token: config.token.clone(),
        })
    }

    pub fn record_url(&self, key: &str) -> String {
        format!(
            "{}/v2/key-value-stores/{}/records/{}",
            self.api_url, self.store_id, key
        )
    }
}

#[async_trait]
impl ArtifactStore for KeyValueStore {
    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<String> {
        validate_key(key)?;
        let url = self.record_url(key);

        let mut request = client()?
            .put(&url)
            .header("Content-Type", content_type)
            .body(bytes.to_vec());
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request
            .send()
            .await
            .context("Failed to send record to key-value store")?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            anyhow::bail!("Unauthorized - check your APIFY_TOKEN");
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("HTTP {} from key-value store: {}", status.as_u16(), body);
        }

        tracing::debug!(key, content_type, size = bytes.len(), "uploaded artifact");
        Ok(url)
    }
}
