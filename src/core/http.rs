use anyhow::{Context, Result};
use std::time::Duration;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Validate that a resolved endpoint URL uses HTTPS.
///
/// Every adapter that sends a token must call this first, so credentials
/// never travel over plain HTTP or other schemes.
pub fn validate_endpoint(url: &str, service_name: &str) -> Result<()> {
    if !url.starts_with("https://") {
        anyhow::bail!("{}: endpoint must use HTTPS, got: {}", service_name, url);
    }
    Ok(())
}

pub fn client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_endpoint_accepts_https() {
        assert!(validate_endpoint("https://slack.com/api", "Slack").is_ok());
    }

    #[test]
    fn validate_endpoint_rejects_http() {
        let err = validate_endpoint("http://evil.com", "Slack").unwrap_err();
        assert!(err.to_string().contains("must use HTTPS"));
    }

    #[test]
    fn validate_endpoint_rejects_empty() {
        assert!(validate_endpoint("", "Slack").is_err());
    }

    #[test]
    fn validate_endpoint_rejects_file_scheme() {
        assert!(validate_endpoint("file:///etc/passwd", "Store").is_err());
    }

    #[test]
    fn client_builds() {
        assert!(client().is_ok());
    }
}
