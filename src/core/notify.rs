use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::config::SlackConfig;
use crate::core::http::{client, validate_endpoint};

/// Delivers the finished report text to a channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn post(&self, channel: &str, text: &str) -> Result<()>;
}

#[derive(Serialize)]
struct PostMessage<'a> {
    channel: &'a str,
    text: &'a str,
    username: &'a str,
    response_type: &'a str,
}

#[derive(Deserialize)]
struct PostMessageResponse {
    ok: bool,
    error: Option<String>,
}

/// Posts through Slack's `chat.postMessage` Web API.
pub struct SlackNotifier {
    api_url: String,
    token: String,
    username: String,
}

impl SlackNotifier {
    pub fn from_config(config: &SlackConfig) -> Result<Self> {
        let token = config
            .bot_token
            .clone()
            .filter(|t| !t.is_empty())
            .context("SLACK_BOT_TOKEN env var not set")?;
        validate_endpoint(&config.api_url, "Slack")?;
        Ok(Self {
            api_url: config.api_url.trim_end_matches('/').to_string(),
            token,
            username: config.username.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat.postMessage", self.api_url)
    }
}

fn check_response(resp: PostMessageResponse) -> Result<()> {
    if !resp.ok {
        anyhow::bail!(
            "Slack rejected the message: {}",
            resp.error.as_deref().unwrap_or("unknown error")
        );
    }
    Ok(())
}

#[async_trait]
impl Notifier for SlackNotifier {
    async fn post(&self, channel: &str, text: &str) -> Result<()> {
        let body = PostMessage {
            channel,
            text,
            username: &self.username,
            response_type: "in_channel",
        };

        let response = client()?
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", self.token))
            .json(&body)
            .send()
            .await
            .context("Failed to send request to Slack")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("HTTP {} from Slack: {}", status.as_u16(), body);
        }

        let data: PostMessageResponse = response
            .json()
            .await
            .context("Failed to parse Slack response")?;
        check_response(data)
    }
}
