use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use feed_rs::model::{Entry, Feed};
use feed_rs::parser;
use reqwest::Client;
use std::time::Duration;

/// One article item as the rest of the run sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntry {
    pub title: String,
    pub link: String,
    /// Raw summary text as delivered by the feed (often HTML).
    pub summary: String,
    pub published: Option<DateTime<Utc>>,
}

impl FeedEntry {
    pub fn from_entry(entry: &Entry) -> Self {
        let title = entry.title.as_ref().map(|t| t.content.clone()).unwrap_or_default();
        // Use the first link as the URL
        let link = entry.links.first().map(|l| l.href.trim().to_string()).unwrap_or_default();
        let summary = entry
            .summary
            .as_ref()
            .map(|s| s.content.clone())
            .or_else(|| entry.content.as_ref().and_then(|c| c.body.clone()))
            .unwrap_or_default();

        Self {
            title,
            link,
            summary,
            published: entry.published,
        }
    }
}

/// Builds the HTTP client shared by every feed fetch of a run.
pub fn build_client(timeout_secs: u64, user_agent: &str) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(user_agent)
        .build()
        .context("failed to build reqwest client")
}

/// Fetches a feed from the given URL and parses it. One attempt only.
pub async fn fetch_and_parse_feed(client: &Client, url: &str) -> Result<Feed> {
    let response = client.get(url).send().await.context("failed to fetch feed")?;

    let status = response.status();
    if !status.is_success() {
        return Err(anyhow::anyhow!("feed fetch failed with status: {}", status));
    }

    let bytes = response.bytes().await.context("failed to read response body")?;
    let feed = parser::parse(bytes.as_ref()).context("failed to parse feed")?;

    Ok(feed)
}

/// Fetches a feed and flattens it into `FeedEntry` values, in feed order.
pub async fn fetch_entries(client: &Client, url: &str) -> Result<Vec<FeedEntry>> {
    let feed = fetch_and_parse_feed(client, url).await?;
    Ok(feed.entries.iter().map(FeedEntry::from_entry).collect())
}
