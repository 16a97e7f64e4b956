/*
newsdigest - one-shot run binary.
Collects yesterday's reinsurance news, summarizes it and mails the digest. Meant to be run by cron.
*/

use anyhow::Result;
use chrono::Local;
use common::{Config, Credentials};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use newsdigest::ingestion;
use newsdigest::llm::gemini::GeminiProvider;
use newsdigest::llm::retry::RetryPolicy;
use newsdigest::llm::summarizer::Summarizer;
use newsdigest::notify::WebhookNotifier;
use newsdigest::pipeline::{Pipeline, RunSettings};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (RUST_LOG, default info)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    // Configuration and secrets are resolved before any network activity
    let config = match Config::load().await {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("failed to load configuration: {:#}", e);
            return Err(e);
        }
    };
    let credentials = match Credentials::from_env(&config) {
        Ok(c) => c,
        Err(e) => {
            error!("missing configuration: {:#}", e);
            return Err(e);
        }
    };
    info!(
        feeds = config.feeds.urls.len(),
        model = %config.llm.model,
        recipient = %credentials.recipient,
        "configuration loaded"
    );

    let client = ingestion::build_client(
        config.feeds.fetch_timeout_seconds.unwrap_or(20),
        config.feeds.user_agent.as_deref().unwrap_or("newsdigest/0.1.0"),
    )?;

    let provider = GeminiProvider::new(
        config.llm.api_url.clone(),
        credentials.api_key.clone(),
        config.llm.model.clone(),
        Duration::from_secs(config.llm.timeout_seconds.unwrap_or(60)),
    )?;

    let mut summarizer = Summarizer::new(
        Arc::new(provider),
        RetryPolicy::from(&config.llm.retry),
        &config.llm.prompt,
    );
    if let Some(max) = config.llm.max_output_tokens {
        summarizer = summarizer.with_max_output_tokens(max);
    }

    let notifier = WebhookNotifier::new(
        credentials.webhook_url.clone(),
        config.mail.timeout_seconds.unwrap_or(30),
    )?;

    let pipeline = Pipeline::new(
        client,
        summarizer,
        Arc::new(notifier),
        RunSettings::from_config(&config, &credentials),
    );

    let now = Local::now().fixed_offset();
    let outcome = pipeline.run(&now).await;
    info!(?outcome, "run finished");

    Ok(())
}
