use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;

use crate::core::config::AwsConfig;
use crate::core::models::billing::{CostAndUsageResponse, RawTimeBucket};
use crate::core::process::run_command_with_env;
use crate::core::sources::{BillingSource, DateRange, Query};

const AWS_TIMEOUT: Duration = Duration::from_secs(60);
const MAX_PAGES: usize = 50;

/// Queries Cost Explorer through the `aws` CLI.
pub struct AwsCliSource {
    cli: String,
    region: String,
    metric: String,
    profile: Option<String>,
    credentials: Option<(String, String)>,
}

impl AwsCliSource {
    pub fn from_config(config: &AwsConfig) -> Self {
        let credentials = match (&config.access_key_id, &config.secret_access_key) {
            (Some(id), Some(secret)) => Some((id.clone(), secret.clone())),
            _ => None,
        };
        Self {
            cli: config.cli.clone(),
            region: config.region.clone(),
            metric: config.metric.clone(),
            profile: config.profile.clone(),
            credentials,
        }
    }

    fn args(&self, range: DateRange, page_token: Option<&str>) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "ce".into(),
            "get-cost-and-usage".into(),
            "--time-period".into(),
            format!(
                "Start={},End={}",
                range.start.format("%Y-%m-%d"),
                range.end.format("%Y-%m-%d")
            ),
            "--granularity".into(),
            "DAILY".into(),
            "--metrics".into(),
            self.metric.clone(),
            "--group-by".into(),
            "Type=DIMENSION,Key=SERVICE".into(),
            "--region".into(),
            self.region.clone(),
            "--output".into(),
            "json".into(),
        ];
        if let Some(profile) = &self.profile {
            args.push("--profile".into());
            args.push(profile.clone());
        }
        if let Some(token) = page_token {
            args.push("--next-page-token".into());
            args.push(token.to_string());
        }
        args
    }

    fn envs(&self) -> Vec<(String, String)> {
        let mut envs = vec![
            ("AWS_PAGER".to_string(), String::new()),
            ("AWS_DEFAULT_REGION".to_string(), self.region.clone()),
        ];
        if let Some((id, secret)) = &self.credentials {
            envs.push(("AWS_ACCESS_KEY_ID".to_string(), id.clone()));
            envs.push(("AWS_SECRET_ACCESS_KEY".to_string(), secret.clone()));
        }
        envs
    }

    async fn fetch_page(&self, range: DateRange, token: Option<&str>) -> Result<CostAndUsageResponse> {
        let stdout = run_command_with_env(
            &self.cli,
            &self.args(range, token),
            &self.envs(),
            AWS_TIMEOUT,
        )
        .await
        .context("Cost Explorer query failed")?;
        serde_json::from_slice(&stdout).context("Failed to parse Cost Explorer response")
    }
}

#[async_trait]
impl BillingSource for AwsCliSource {
    async fn fetch(&self, query: Query, range: DateRange) -> Result<Vec<RawTimeBucket>> {
        tracing::debug!(query = query.name(), %range, metric = %self.metric, "querying Cost Explorer");
        let mut response = self.fetch_page(range, None).await?;
        let mut pages = 1;
        while let Some(token) = response.next_page_token.clone() {
            if pages >= MAX_PAGES {
                anyhow::bail!("Cost Explorer returned more than {} pages", MAX_PAGES);
            }
            let page = self.fetch_page(range, Some(&token)).await?;
            response.merge_page(page);
            pages += 1;
        }
        tracing::debug!(
            query = query.name(),
            pages,
            buckets = response.results_by_time.len(),
            "Cost Explorer query complete"
        );
        Ok(response.results_by_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn range() -> DateRange {
        DateRange::trailing(NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(), 30).unwrap()
    }

    #[test]
    fn args_describe_daily_service_query() {
        let source = AwsCliSource::from_config(&AwsConfig::default());
        let args = source.args(range(), None);
        let joined = args.join(" ");
        assert!(joined.starts_with("ce get-cost-and-usage"));
        assert!(joined.contains("--time-period Start=2024-03-01,End=2024-03-31"));
        assert!(joined.contains("--granularity DAILY"));
        assert!(joined.contains("--metrics AmortizedCost"));
        assert!(joined.contains("--group-by Type=DIMENSION,Key=SERVICE"));
        assert!(joined.contains("--region us-east-1"));
        assert!(!joined.contains("--profile"));
        assert!(!joined.contains("--next-page-token"));
    }

    #[test]
    fn args_include_profile_and_page_token() {
        let config = AwsConfig {
            profile: Some("billing".into()),
            ..AwsConfig::default()
        };
        let source = AwsCliSource::from_config(&config);
        let args = source.args(range(), Some("tok"));
        let joined = args.join(" ");
        assert!(joined.contains("--profile billing"));
        assert!(joined.ends_with("--next-page-token tok"));
    }

    #[test]
    fn credentials_only_passed_when_complete() {
        let mut config = AwsConfig {
            access_key_id: Some("AKIA".into()),
            ..AwsConfig::default()
        };
        let envs = AwsCliSource::from_config(&config).envs();
        assert!(!envs.iter().any(|(k, _)| k == "AWS_ACCESS_KEY_ID"));

        config.secret_access_key = Some("secret".into());
        let envs = AwsCliSource::from_config(&config).envs();
        assert!(envs.iter().any(|(k, v)| k == "AWS_ACCESS_KEY_ID" && v == "AKIA"));
        assert!(envs
            .iter()
            .any(|(k, v)| k == "AWS_SECRET_ACCESS_KEY" && v == "secret"));
    }

    #[tokio::test]
    async fn fetch_follows_page_tokens() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-aws");
        std::fs::write(
            &script,
            r#"#!/bin/sh
case "$*" in
  *--next-page-token*)
    echo '{"ResultsByTime":[{"TimePeriod":{"Start":"2024-03-01","End":"2024-03-02"},"Groups":[{"Keys":["S3"],"Metrics":{"AmortizedCost":{"Amount":"1.0","Unit":"USD"}}}]}]}'
    ;;
  *)
    echo '{"ResultsByTime":[{"TimePeriod":{"Start":"2024-03-01","End":"2024-03-02"},"Groups":[{"Keys":["EC2"],"Metrics":{"AmortizedCost":{"Amount":"2.0","Unit":"USD"}}}]}],"NextPageToken":"p2"}'
    ;;
esac
"#,
        )
        .unwrap();
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(&script).unwrap().permissions();
            perms.set_mode(0o755);
            std::fs::set_permissions(&script, perms).unwrap();
        }

        let config = AwsConfig {
            cli: script.to_string_lossy().to_string(),
            ..AwsConfig::default()
        };
        let buckets = AwsCliSource::from_config(&config)
            .fetch(Query::Window, range())
            .await
            .unwrap();
        assert_eq!(buckets.len(), 1);
        let keys: Vec<_> = buckets[0]
            .groups
            .as_ref()
            .unwrap()
            .iter()
            .filter_map(|g| g.service_key())
            .collect();
        assert_eq!(keys, vec!["EC2", "S3"]);
    }
}
