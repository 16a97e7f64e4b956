use chrono::{DateTime, FixedOffset};
use common::{Config, Credentials};
use reqwest::Client;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::digest::{subject_line, Digest};
use crate::filter::EntryFilter;
use crate::ingestion;
use crate::llm::summarizer::Summarizer;
use crate::notify::{MailMessage, Notifier};

/// What one run needs besides its collaborators.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub feeds: Vec<String>,
    pub personnel_keywords: Vec<String>,
    pub recipient: String,
    pub subject_prefix: String,
}

impl RunSettings {
    pub fn from_config(config: &Config, credentials: &Credentials) -> Self {
        Self {
            feeds: config.feeds.urls.clone(),
            personnel_keywords: config.filter.personnel_keywords.clone(),
            recipient: credentials.recipient.clone(),
            subject_prefix: config.mail.subject_prefix.clone(),
        }
    }
}

/// How a run ended. None of these is an error for the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    NothingToSend,
    Sent { articles: usize },
    DispatchFailed { articles: usize },
}

/// fetch → filter → summarize → format → send, once.
pub struct Pipeline {
    client: Client,
    summarizer: Summarizer,
    notifier: Arc<dyn Notifier>,
    settings: RunSettings,
}

impl Pipeline {
    pub fn new(
        client: Client,
        summarizer: Summarizer,
        notifier: Arc<dyn Notifier>,
        settings: RunSettings,
    ) -> Self {
        Self {
            client,
            summarizer,
            notifier,
            settings,
        }
    }

    /// Collects and summarizes yesterday's articles (relative to `now`), feed by feed.
    pub async fn collect(&self, now: &DateTime<FixedOffset>) -> Digest {
        let mut filter = EntryFilter::for_previous_day(&self.settings.personnel_keywords, now);
        let mut digest = Digest::new();

        for url in &self.settings.feeds {
            info!("Fetching feed: {}", url);
            let entries = match ingestion::fetch_entries(&self.client, url).await {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("Skipping feed {}: {:#}", url, e);
                    continue;
                }
            };
            debug!("Feed {} returned {} entries", url, entries.len());

            for entry in entries {
                if let Err(reason) = filter.admit(&entry) {
                    debug!(?reason, link = %entry.link, "entry filtered out");
                    continue;
                }

                info!("Summarizing: {}", entry.title);
                match self.summarizer.summarize(&entry.summary).await {
                    Some(result) => digest.push(&entry, &result, self.summarizer.markers()),
                    None => warn!("No summary for {}, leaving it out", entry.link),
                }
            }
        }

        info!(
            "Found {} articles published {} (personnel news excluded)",
            digest.len(),
            filter.target_date()
        );
        digest
    }

    /// Hands a non-empty digest to the notifier. Failures are logged, never retried.
    pub async fn dispatch(&self, digest: &Digest, now: &DateTime<FixedOffset>) -> RunOutcome {
        if digest.is_empty() {
            info!("No articles for {}, skipping mail", crate::filter::previous_day(now));
            return RunOutcome::NothingToSend;
        }

        let body = digest.body();
        info!("Digest content:\n{}", body);

        let message = MailMessage {
            to: self.settings.recipient.clone(),
            subject: subject_line(&self.settings.subject_prefix, now),
            body,
        };

        match self.notifier.send(&message).await {
            Ok(()) => {
                info!(subject = %message.subject, "Digest sent");
                RunOutcome::Sent {
                    articles: digest.len(),
                }
            }
            Err(e) => {
                error!("Failed to send digest: {:#}", e);
                RunOutcome::DispatchFailed {
                    articles: digest.len(),
                }
            }
        }
    }

    pub async fn run(&self, now: &DateTime<FixedOffset>) -> RunOutcome {
        let digest = self.collect(now).await;
        self.dispatch(&digest, now).await
    }
}
