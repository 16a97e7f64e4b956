use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;
use url::Url;

/// Payload accepted by the mail webhook
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Anything that can deliver a composed digest
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &MailMessage) -> Result<()>;
}

/// Apps Script style mail webhook: POST JSON, expect `{"status": "OK"}` with HTTP 200.
pub struct WebhookNotifier {
    url: Url,
    client: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new(url: Url, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build reqwest client")?;
        Ok(Self { url, client })
    }
}

#[derive(Debug, Deserialize)]
struct WebhookReply {
    #[serde(default)]
    status: Option<String>,
}

#[async_trait::async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, message: &MailMessage) -> Result<()> {
        let response = self
            .client
            .post(self.url.clone())
            .json(message)
            .send()
            .await
            .context("mail webhook request failed")?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status != StatusCode::OK {
            anyhow::bail!("mail webhook returned {}: {}", status, body.trim());
        }

        let reply: WebhookReply = serde_json::from_str(&body)
            .with_context(|| format!("mail webhook reply is not JSON: {}", body.trim()))?;

        match reply.status.as_deref() {
            Some("OK") => {
                info!(to = %message.to, "mail webhook accepted digest");
                Ok(())
            }
            other => anyhow::bail!(
                "mail webhook reported failure (status {:?}): {}",
                other,
                body.trim()
            ),
        }
    }
}
