use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A normalized, source-tagged feed entry ready for display.
///
/// Fields are only reachable through accessors so an item cannot change
/// after the aggregator has built it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewsItem {
    title: String,
    url: String,
    source: String,
    published: Option<String>,
    summary: Option<String>,
}

impl NewsItem {
    /// Returns `None` when either the title or the source is blank.
    pub fn new(title: impl Into<String>, url: impl Into<String>, source: impl Into<String>) -> Option<Self> {
        let title = title.into().trim().to_string();
        let source = source.into();
        if title.is_empty() || source.trim().is_empty() {
            return None;
        }

        Some(Self {
            title,
            url: url.into(),
            source,
            published: None,
            summary: None,
        })
    }

    pub fn with_published(mut self, published: Option<String>) -> Self {
        self.published = published;
        self
    }

    pub fn with_summary(mut self, summary: Option<String>) -> Self {
        self.summary = summary;
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn published(&self) -> Option<&str> {
        self.published.as_deref()
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }
}

/// Structured publish time as reported by the feed, always in UTC.
///
/// Kept as raw fields rather than a `DateTime` so that out-of-range values
/// coming from a sloppy feed can be represented and rejected later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishedTime {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl PublishedTime {
    pub fn new(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    /// Builds a calendar datetime, or `None` if any field is out of range.
    pub fn to_datetime(&self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)?
            .and_hms_opt(self.hour, self.minute, self.second)
    }
}

/// One entry as handed over by the parse layer, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    pub title: Option<String>,
    pub link: Option<String>,
    pub published: Option<PublishedTime>,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct FeedDocument {
    pub title: Option<String>,
    pub entries: Vec<RawEntry>,
    /// Set when the feed was malformed but could still be parsed.
    pub malformation: Option<String>,
}

impl FeedDocument {
    pub fn new(entries: Vec<RawEntry>) -> Self {
        Self {
            title: None,
            entries,
            malformation: None,
        }
    }

    pub fn with_malformation(mut self, reason: impl Into<String>) -> Self {
        self.malformation = Some(reason.into());
        self
    }

    pub fn is_malformed(&self) -> bool {
        self.malformation.is_some()
    }
}

/// Result of processing a single source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOutcome {
    Fetched { items: Vec<NewsItem>, malformed: bool },
    Failed { reason: String },
}

impl SourceOutcome {
    pub fn items(&self) -> &[NewsItem] {
        match self {
            SourceOutcome::Fetched { items, .. } => items,
            SourceOutcome::Failed { .. } => &[],
        }
    }

    pub fn into_items(self) -> Vec<NewsItem> {
        match self {
            SourceOutcome::Fetched { items, .. } => items,
            SourceOutcome::Failed { .. } => Vec::new(),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, SourceOutcome::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceReport {
    pub name: String,
    pub url: String,
    pub outcome: SourceOutcome,
}

/// Per-source outcomes of one aggregation run, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregationReport {
    pub sources: Vec<SourceReport>,
}

impl AggregationReport {
    pub fn items(&self) -> impl Iterator<Item = &NewsItem> {
        self.sources.iter().flat_map(|report| report.outcome.items())
    }

    pub fn into_items(self) -> Vec<NewsItem> {
        self.sources
            .into_iter()
            .flat_map(|report| report.outcome.into_items())
            .collect()
    }

    pub fn item_count(&self) -> usize {
        self.sources.iter().map(|report| report.outcome.items().len()).sum()
    }

    pub fn failed_sources(&self) -> impl Iterator<Item = &SourceReport> {
        self.sources.iter().filter(|report| report.outcome.is_failed())
    }

    pub fn is_empty(&self) -> bool {
        self.item_count() == 0
    }
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_retries: u32,
    pub retry_delay_seconds: u64,
    pub max_feed_size_mb: usize,
    pub follow_redirects: bool,
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("news-aggregator/{}", env!("CARGO_PKG_VERSION")),
            timeout_seconds: 30,
            max_retries: 2,
            retry_delay_seconds: 1,
            max_feed_size_mb: 10,
            follow_redirects: true,
            max_redirects: 5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    pub max_entries_per_source: usize,
    pub summary_max_chars: usize,
    /// Pause between two successive sources.
    pub request_delay: Duration,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            max_entries_per_source: 15,
            summary_max_chars: 100,
            request_delay: Duration::from_millis(500),
        }
    }
}

/// Name and endpoint of one feed, as read from a sources file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSource {
    pub name: String,
    pub url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AggregatorError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status {status}")]
    Status { status: u16 },

    #[error("Feed parse error: {0}")]
    Parse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Feed size exceeds limit: {size_mb}MB")]
    FeedTooLarge { size_mb: usize },

    #[error("Invalid source: {0}")]
    InvalidSource(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("General error: {0}")]
    General(String),
}

pub type Result<T> = std::result::Result<T, AggregatorError>;
