use chrono::{DateTime, FixedOffset};

use crate::ingestion::FeedEntry;
use crate::llm::summarizer::{ResponseMarkers, SummaryResult};

/// Ordered per-article blocks that make up the mail body.
#[derive(Debug, Clone, Default)]
pub struct Digest {
    blocks: Vec<String>,
}

impl Digest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: &FeedEntry, result: &SummaryResult, markers: &ResponseMarkers) {
        self.blocks.push(format_block(entry, result, markers));
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Blocks joined by a blank line.
    pub fn body(&self) -> String {
        self.blocks.join("\n\n")
    }

    /// True when there is nothing worth mailing.
    pub fn is_empty(&self) -> bool {
        self.body().trim().is_empty()
    }
}

pub fn format_block(
    entry: &FeedEntry,
    result: &SummaryResult,
    markers: &ResponseMarkers,
) -> String {
    format!(
        "📰 {}\n🔗 {}\n📖 {}{}\n⚖️ {}{}",
        entry.title.trim(),
        entry.link,
        markers.summary_label,
        result.summary,
        markers.impact_marker,
        result.impact
    )
}

/// `"<prefix> - YYYY-MM-DD"` for the execution date.
pub fn subject_line(prefix: &str, now: &DateTime<FixedOffset>) -> String {
    format!("{} - {}", prefix, now.format("%Y-%m-%d"))
}
