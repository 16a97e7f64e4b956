/*!
common/src/lib.rs

Shared configuration types for newsdigest.

This file provides:
- Config data structures (deserialized from TOML)
- The bundled defaults document and a loader that merges an optional override file on top
- Resolution of the secrets (API key, webhook URL) from the process environment
*/

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

/// Defaults compiled into the binary so a bare run only needs the secrets.
pub const DEFAULT_CONFIG: &str = include_str!("../config.default.toml");

/// Environment variable naming an optional TOML file merged over the defaults.
pub const CONFIG_PATH_ENV: &str = "NEWSDIGEST_CONFIG";

/// Feed sources and fetching behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedsConfig {
    pub urls: Vec<String>,
    pub fetch_timeout_seconds: Option<u64>,
    pub user_agent: Option<String>,
}

/// Personnel blocklist
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub personnel_keywords: Vec<String>,
}

/// Which completion failures are worth another attempt, and how long to wait.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_attempts: u32,
    /// Delay before attempt `n + 1` is `n * backoff_step_seconds`.
    pub backoff_step_seconds: u64,
    #[serde(default)]
    pub retryable_codes: Vec<u16>,
    /// Vendor status strings such as `RESOURCE_EXHAUSTED`.
    #[serde(default)]
    pub retryable_statuses: Vec<String>,
    #[serde(default)]
    pub retry_transport_errors: bool,
}

/// Prompt text and the markers used to split the model's answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptConfig {
    pub instructions: String,
    pub summary_label: String,
    pub impact_marker: String,
    pub missing_impact: String,
}

/// Generative-language endpoint config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub api_url: String,
    pub api_key_env: String,
    pub model: String,
    pub max_output_tokens: Option<u32>,
    pub timeout_seconds: Option<u64>,
    pub retry: RetryConfig,
    pub prompt: PromptConfig,
}

/// Mail webhook and message addressing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    pub webhook_url_env: String,
    pub recipient: String,
    pub recipient_env: Option<String>,
    pub subject_prefix: String,
    pub timeout_seconds: Option<u64>,
}

/// Top-level application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub feeds: FeedsConfig,
    pub filter: FilterConfig,
    pub llm: LlmConfig,
    pub mail: MailConfig,
}

impl Config {
    /// Parse a complete configuration document.
    pub fn from_toml_str(data: &str) -> Result<Self> {
        toml::from_str(data).context("Failed to parse TOML configuration")
    }

    /// Merge an optional override file over the given defaults document.
    pub async fn load_with_defaults(defaults: &str, override_path: Option<&Path>) -> Result<Self> {
        let mut config_value: toml::Value =
            toml::from_str(defaults).context("Failed to parse default configuration")?;

        if let Some(path) = override_path {
            let data = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read override config: {}", path.display()))?;
            let val: toml::Value = toml::from_str(&data)
                .with_context(|| format!("Failed to parse override config: {}", path.display()))?;
            merge_toml(&mut config_value, val);
        }

        let cfg: Config = config_value
            .try_into()
            .context("Failed to parse merged configuration")?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load the bundled defaults, merged with the file named by `NEWSDIGEST_CONFIG` if set.
    pub async fn load() -> Result<Self> {
        let override_path = match std::env::var_os(CONFIG_PATH_ENV) {
            Some(p) if !p.is_empty() => {
                let p = PathBuf::from(p);
                if !p.exists() {
                    bail!("Config file named by {} not found: {}", CONFIG_PATH_ENV, p.display());
                }
                Some(p)
            }
            _ => None,
        };
        Self::load_with_defaults(DEFAULT_CONFIG, override_path.as_deref()).await
    }

    fn validate(&self) -> Result<()> {
        if self.feeds.urls.is_empty() {
            bail!("No feed URLs configured");
        }
        if self.llm.retry.max_attempts == 0 {
            bail!("llm.retry.max_attempts must be at least 1");
        }
        if self.llm.prompt.impact_marker.is_empty() {
            bail!("llm.prompt.impact_marker must not be empty");
        }
        Ok(())
    }
}

fn merge_toml(a: &mut toml::Value, b: toml::Value) {
    match (a, b) {
        (toml::Value::Table(a_map), toml::Value::Table(b_map)) => {
            for (k, v) in b_map {
                if let Some(a_val) = a_map.get_mut(&k) {
                    merge_toml(a_val, v);
                } else {
                    a_map.insert(k, v);
                }
            }
        }
        (a_val, b_val) => *a_val = b_val,
    }
}

/// Secrets and addressing resolved from the environment at startup.
#[derive(Clone)]
pub struct Credentials {
    pub api_key: String,
    pub webhook_url: Url,
    pub recipient: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("webhook_url", &self.webhook_url.as_str())
            .field("recipient", &self.recipient)
            .finish()
    }
}

impl Credentials {
    /// Read the API key, webhook URL and recipient override from the process environment.
    pub fn from_env(config: &Config) -> Result<Self> {
        Self::from_lookup(config, |name| std::env::var(name).ok())
    }

    /// Same as `from_env`, with the variable lookup supplied by the caller.
    pub fn from_lookup<F>(config: &Config, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| -> Result<String> {
            match lookup(name) {
                Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
                _ => bail!("Required environment variable '{}' is not set", name),
            }
        };

        let api_key = required(&config.llm.api_key_env)?;
        let webhook_raw = required(&config.mail.webhook_url_env)?;
        let webhook_url = Url::parse(&webhook_raw).with_context(|| {
            format!(
                "Environment variable '{}' is not a valid URL",
                config.mail.webhook_url_env
            )
        })?;

        let recipient = config
            .mail
            .recipient_env
            .as_deref()
            .and_then(|name| lookup(name))
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| config.mail.recipient.clone());

        Ok(Self {
            api_key,
            webhook_url,
            recipient,
        })
    }
}
