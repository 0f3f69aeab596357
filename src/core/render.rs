use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

use crate::core::config::RenderConfig;
use crate::core::process::{run_command_with_env, which};

/// Browsers tried in order when none is configured.
const BROWSER_CANDIDATES: &[&str] = &[
    "chromium",
    "chromium-browser",
    "google-chrome",
    "google-chrome-stable",
    "chrome",
];

/// Time allowed for the browser on top of the settle delay.
const LAUNCH_GRACE: Duration = Duration::from_secs(60);

/// Turns the chart page into an image.
#[async_trait]
pub trait ChartRenderer: Send + Sync {
    /// Returns PNG bytes.
    async fn render(&self, html: &str) -> Result<Vec<u8>>;
}

/// Screenshots the page with a Chromium-family browser in headless mode.
pub struct HeadlessBrowser {
    binary: String,
    settle: Duration,
    width: u32,
    height: u32,
}

impl HeadlessBrowser {
    pub fn from_config(config: &RenderConfig) -> Result<Self> {
        let binary = match &config.browser {
            Some(b) => b.clone(),
            None => BROWSER_CANDIDATES
                .iter()
                .find_map(|name| which(name))
                .map(|p| p.to_string_lossy().to_string())
                .context("No headless browser found; set render.browser in the config")?,
        };
        Ok(Self {
            binary,
            settle: Duration::from_secs(config.settle_secs),
            width: config.width,
            height: config.height,
        })
    }

    fn args(&self, page: &Path, screenshot: &Path) -> Vec<String> {
        vec![
            "--headless".into(),
            "--disable-gpu".into(),
            "--no-sandbox".into(),
            "--hide-scrollbars".into(),
            format!("--window-size={},{}", self.width, self.height),
            format!("--virtual-time-budget={}", self.settle.as_millis()),
            format!("--screenshot={}", screenshot.display()),
            format!("file://{}", page.display()),
        ]
    }
}

/// Fresh private directory for one render, removed when dropped.
fn scratch_dir() -> Result<tempfile::TempDir> {
    tempfile::Builder::new()
        .prefix("costdigest-render-")
        .tempdir()
        .context("Failed to create render scratch directory")
}

#[async_trait]
impl ChartRenderer for HeadlessBrowser {
    async fn render(&self, html: &str) -> Result<Vec<u8>> {
        let scratch = scratch_dir()?;
        let page = scratch.path().join("chart.html");
        let screenshot = scratch.path().join("screenshot.png");
        tokio::fs::write(&page, html)
            .await
            .with_context(|| format!("Failed to write {}", page.display()))?;

        tracing::debug!(browser = %self.binary, settle_ms = self.settle.as_millis() as u64, "rendering chart");
        run_command_with_env(
            &self.binary,
            &self.args(&page, &screenshot),
            &[],
            self.settle + LAUNCH_GRACE,
        )
        .await
        .context("Headless browser failed to render the chart")?;

        let bytes = tokio::fs::read(&screenshot)
            .await
            .with_context(|| format!("Browser produced no screenshot at {}", screenshot.display()))?;
        if bytes.is_empty() {
            anyhow::bail!("Browser produced an empty screenshot");
        }
        Ok(bytes)
    }
}
