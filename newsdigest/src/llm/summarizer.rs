// Summarizer module
use common::PromptConfig;
use std::sync::Arc;
use tracing::{debug, error, warn};

use super::retry::RetryPolicy;
use super::{CompletionProvider, CompletionRequest};

/// Model answer split into its two parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryResult {
    pub summary: String,
    pub impact: String,
}

/// Textual markers the prompt asks the model to use, and the fallback impact text.
#[derive(Debug, Clone)]
pub struct ResponseMarkers {
    pub summary_label: String,
    pub impact_marker: String,
    pub missing_impact: String,
}

impl From<&PromptConfig> for ResponseMarkers {
    fn from(cfg: &PromptConfig) -> Self {
        Self {
            summary_label: cfg.summary_label.clone(),
            impact_marker: cfg.impact_marker.clone(),
            missing_impact: cfg.missing_impact.clone(),
        }
    }
}

/// Splits a free-text answer at the first impact marker.
///
/// Text before the marker, with every summary label removed, is the summary;
/// text after it is the impact. Without a marker the whole answer is the
/// summary and the impact is the configured placeholder.
pub fn split_summary_impact(text: &str, markers: &ResponseMarkers) -> SummaryResult {
    match text.split_once(markers.impact_marker.as_str()) {
        Some((before, after)) => {
            let summary = if markers.summary_label.is_empty() {
                before.to_string()
            } else {
                before.replace(markers.summary_label.as_str(), "")
            };
            SummaryResult {
                summary: summary.trim().to_string(),
                impact: after.trim().to_string(),
            }
        }
        None => SummaryResult {
            summary: text.trim().to_string(),
            impact: markers.missing_impact.clone(),
        },
    }
}

/// Converts feed HTML to plain text for the prompt; falls back to the raw input.
pub fn plain_text(html: &str) -> String {
    match html2text::from_read(html.as_bytes(), 120) {
        Ok(text) => text.trim().to_string(),
        Err(e) => {
            debug!("html2text failed, using raw summary: {}", e);
            html.trim().to_string()
        }
    }
}

pub fn build_prompt(instructions: &str, article_text: &str) -> String {
    format!("{}\n\n{}", instructions.trim_end(), article_text)
}

/// Prompts the completion provider under a `RetryPolicy` and splits the answer.
pub struct Summarizer {
    provider: Arc<dyn CompletionProvider>,
    policy: RetryPolicy,
    instructions: String,
    markers: ResponseMarkers,
    max_output_tokens: Option<u32>,
}

impl Summarizer {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        policy: RetryPolicy,
        prompt: &PromptConfig,
    ) -> Self {
        Self {
            provider,
            policy,
            instructions: prompt.instructions.clone(),
            markers: ResponseMarkers::from(prompt),
            max_output_tokens: None,
        }
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = Some(max_output_tokens);
        self
    }

    pub fn markers(&self) -> &ResponseMarkers {
        &self.markers
    }

    /// Runs the prompt until it succeeds, fails permanently, or runs out of attempts.
    /// Returns an empty string on failure; the cause is logged.
    pub async fn complete(&self, prompt: &str) -> String {
        let max_attempts = self.policy.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            let request = CompletionRequest {
                prompt: prompt.to_string(),
                max_output_tokens: self.max_output_tokens,
            };

            match self.provider.generate(request).await {
                Ok(text) => return text.trim().to_string(),
                Err(e) if self.policy.should_retry(attempt, &e) => {
                    let wait = self.policy.delay_after(attempt);
                    warn!(
                        "{}, retrying in {:?} (attempt {}/{})",
                        e, wait, attempt, max_attempts
                    );
                    tokio::time::sleep(wait).await;
                }
                Err(e) => {
                    error!("Summarization failed after {} attempt(s): {}", attempt, e);
                    break;
                }
            }
        }

        String::new()
    }

    /// Summarizes one article body. `None` means "skip this article".
    pub async fn summarize(&self, article_text: &str) -> Option<SummaryResult> {
        let body = plain_text(article_text);
        if body.is_empty() {
            warn!("Article has no body text, skipping summarization");
            return None;
        }

        let text = self.complete(&build_prompt(&self.instructions, &body)).await;
        if text.is_empty() {
            return None;
        }
        Some(split_summary_impact(&text, &self.markers))
    }
}
