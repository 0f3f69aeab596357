use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

use crate::core::cost::normalizer::{MissingKeyPolicy, DEFAULT_METRIC};
use crate::core::report::EmptySummary;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
}

/// Cost metrics Cost Explorer accepts.
const KNOWN_METRICS: &[&str] = &[
    "AmortizedCost",
    "BlendedCost",
    "NetAmortizedCost",
    "NetUnblendedCost",
    "UnblendedCost",
];

/// Longest trailing window the report accepts.
pub const MAX_WINDOW_DAYS: u32 = 366;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwsConfig {
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default = "default_metric")]
    pub metric: String,
    pub profile: Option<String>,
    #[serde(default = "default_aws_cli")]
    pub cli: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
}

fn default_region() -> String {
    "us-east-1".to_string()
}
fn default_metric() -> String {
    DEFAULT_METRIC.to_string()
}
fn default_aws_cli() -> String {
    "aws".to_string()
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
            metric: default_metric(),
            profile: None,
            cli: default_aws_cli(),
            access_key_id: None,
            secret_access_key: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlackConfig {
    #[serde(default)]
    pub channel: String,
    #[serde(default = "default_username")]
    pub username: String,
    pub bot_token: Option<String>,
    #[serde(default = "default_slack_api")]
    pub api_url: String,
}

fn default_username() -> String {
    "Yesterday AWS costs".to_string()
}
fn default_slack_api() -> String {
    "https://slack.com/api".to_string()
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            channel: String::new(),
            username: default_username(),
            bot_token: None,
            api_url: default_slack_api(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreKind {
    #[default]
    Local,
    KeyValue,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub kind: StoreKind,
    /// Output directory for the local store
    pub dir: Option<PathBuf>,
    /// Key-value store id for the HTTP store
    pub store_id: Option<String>,
    pub token: Option<String>,
    #[serde(default = "default_store_api")]
    pub api_url: String,
}

fn default_store_api() -> String {
    "https://api.apify.com".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            kind: StoreKind::default(),
            dir: None,
            store_id: None,
            token: None,
            api_url: default_store_api(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Browser binary; searched in PATH when unset
    pub browser: Option<String>,
    #[serde(default = "default_settle_secs")]
    pub settle_secs: u64,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
}

fn default_settle_secs() -> u64 {
    10
}
fn default_width() -> u32 {
    1280
}
fn default_height() -> u32 {
    800
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            browser: None,
            settle_secs: default_settle_secs(),
            width: default_width(),
            height: default_height(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_window_days")]
    pub window_days: u32,
    #[serde(default)]
    pub strict_keys: bool,
    #[serde(default)]
    pub fail_on_empty_summary: bool,
}

fn default_window_days() -> u32 {
    30
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            window_days: default_window_days(),
            strict_keys: false,
            fail_on_empty_summary: false,
        }
    }
}

impl ReportConfig {
    pub fn missing_key_policy(&self) -> MissingKeyPolicy {
        if self.strict_keys {
            MissingKeyPolicy::Reject
        } else {
            MissingKeyPolicy::AssignUnknown
        }
    }

    pub fn empty_summary(&self) -> EmptySummary {
        if self.fail_on_empty_summary {
            EmptySummary::Reject
        } else {
            EmptySummary::Allow
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub aws: AwsConfig,
    #[serde(default)]
    pub slack: SlackConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub report: ReportConfig,
    /// Extra service → color entries on top of the built-in table
    #[serde(default)]
    pub colors: HashMap<String, String>,
    /// Extra legacy name → current name service aliases
    #[serde(default)]
    pub aliases: HashMap<String, String>,
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

impl AppConfig {
    /// Get the config file path, respecting XDG_CONFIG_HOME
    pub fn config_path() -> PathBuf {
        let config_dir = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("~"))
                    .join(".config")
            });
        config_dir.join("costdigest").join("config.toml")
    }

    /// Load config from the default path, falling back to defaults if not found
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Fill secrets missing from the file with environment variables.
    pub fn apply_env(&mut self) {
        if self.aws.access_key_id.is_none() {
            self.aws.access_key_id = env_nonempty("AWS_ACCESS_KEY_ID");
        }
        if self.aws.secret_access_key.is_none() {
            self.aws.secret_access_key =
                env_nonempty("AWS_SECRET_ACCESS_KEY").or_else(|| env_nonempty("AWS_ACCESS_SECRET"));
        }
        if self.slack.bot_token.is_none() {
            self.slack.bot_token = env_nonempty("SLACK_BOT_TOKEN");
        }
        if self.store.token.is_none() {
            self.store.token = env_nonempty("APIFY_TOKEN");
        }
        if self.store.store_id.is_none() {
            self.store.store_id = env_nonempty("APIFY_DEFAULT_KEY_VALUE_STORE_ID");
        }
    }

    /// Serialize and write this config to the config file path.
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        Ok(path)
    }

    /// Directory the local store writes into.
    pub fn output_dir(&self) -> PathBuf {
        self.store.dir.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("costdigest")
        })
    }

    /// Validate the config
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if !KNOWN_METRICS.contains(&self.aws.metric.as_str()) {
            issues.push(format!(
                "Invalid aws.metric: '{}' (must be one of {})",
                self.aws.metric,
                KNOWN_METRICS.join(", ")
            ));
        }
        if self.aws.region.trim().is_empty() {
            issues.push("aws.region is empty".to_string());
        }
        if self.slack.channel.trim().is_empty() {
            issues.push("slack.channel is not set".to_string());
        }
        if !self.slack.api_url.starts_with("https://") {
            issues.push(format!(
                "slack.api_url must use HTTPS, got: {}",
                self.slack.api_url
            ));
        }
        if self.store.kind == StoreKind::KeyValue {
            if self.store.store_id.is_none() {
                issues.push("store.store_id is required for the key_value store".to_string());
            }
            if !self.store.api_url.starts_with("https://") {
                issues.push(format!(
                    "store.api_url must use HTTPS, got: {}",
                    self.store.api_url
                ));
            }
        }
        if self.report.window_days == 0 {
            issues.push("report.window_days must be at least 1".to_string());
        } else if self.report.window_days > MAX_WINDOW_DAYS {
            issues.push(format!(
                "report.window_days must be at most {}, got: {}",
                MAX_WINDOW_DAYS, self.report.window_days
            ));
        }
        if self.render.width == 0 || self.render.height == 0 {
            issues.push("render.width and render.height must be positive".to_string());
        }
        issues
    }
}
