use chrono::{DateTime, Duration, FixedOffset, NaiveDate};
use std::collections::HashSet;

use crate::ingestion::FeedEntry;

/// Why an entry was left out of the digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    NoTimestamp,
    OutsideTargetDay,
    Personnel,
    NoLink,
    DuplicateLink,
}

/// True when any keyword occurs, case-insensitively, in the title or the summary.
pub fn is_personnel_article(entry: &FeedEntry, keywords: &[String]) -> bool {
    let title = entry.title.to_lowercase();
    let summary = entry.summary.to_lowercase();
    keywords.iter().any(|kw| {
        let kw = kw.to_lowercase();
        !kw.is_empty() && (title.contains(&kw) || summary.contains(&kw))
    })
}

/// The calendar day before `now`, in `now`'s own offset.
pub fn previous_day(now: &DateTime<FixedOffset>) -> NaiveDate {
    (*now - Duration::days(1)).date_naive()
}

/// Per-run admission check: target day, personnel blocklist, and link dedup.
///
/// The target day is a local calendar date; publish instants are compared by
/// their UTC calendar date.
pub struct EntryFilter {
    keywords: Vec<String>,
    target_date: NaiveDate,
    seen_links: HashSet<String>,
}

impl EntryFilter {
    pub fn new(keywords: &[String], target_date: NaiveDate) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            target_date,
            seen_links: HashSet::new(),
        }
    }

    /// Filter for the day before `now`.
    pub fn for_previous_day(keywords: &[String], now: &DateTime<FixedOffset>) -> Self {
        Self::new(keywords, previous_day(now))
    }

    pub fn target_date(&self) -> NaiveDate {
        self.target_date
    }

    /// Checks one entry. An admitted link is remembered, so later copies are rejected.
    pub fn admit(&mut self, entry: &FeedEntry) -> Result<(), Rejection> {
        let published = entry.published.ok_or(Rejection::NoTimestamp)?;
        if published.date_naive() != self.target_date {
            return Err(Rejection::OutsideTargetDay);
        }
        if is_personnel_article(entry, &self.keywords) {
            return Err(Rejection::Personnel);
        }
        if entry.link.is_empty() {
            return Err(Rejection::NoLink);
        }
        if !self.seen_links.insert(entry.link.clone()) {
            return Err(Rejection::DuplicateLink);
        }
        Ok(())
    }
}
