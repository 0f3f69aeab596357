use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::core::models::billing::{CostAndUsageResponse, RawTimeBucket};
use crate::core::sources::{BillingSource, DateRange, Query};

/// Reads saved `GetCostAndUsage` responses from a directory:
/// `yesterday.json` and `window.json`.
pub struct JsonFileSource {
    dir: PathBuf,
}

impl JsonFileSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, query: Query) -> PathBuf {
        self.dir.join(format!("{}.json", query.name()))
    }
}

pub async fn read_response(path: &Path) -> Result<CostAndUsageResponse> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse cost response in {}", path.display()))
}

#[async_trait]
impl BillingSource for JsonFileSource {
    async fn fetch(&self, query: Query, range: DateRange) -> Result<Vec<RawTimeBucket>> {
        let path = self.path_for(query);
        tracing::debug!(path = %path.display(), %range, "reading saved cost response");
        let response = read_response(&path).await?;
        Ok(response.results_by_time)
    }
}
