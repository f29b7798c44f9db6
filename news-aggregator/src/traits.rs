use crate::types::{FeedDocument, Result};
use async_trait::async_trait;
use std::fmt;

/// Retrieves and parses the feed behind a URL.
#[async_trait]
pub trait FeedClient: Send + Sync {
    /// Hard failures (transport, HTTP status, unparseable body) are errors.
    /// Recoverable problems are flagged on the returned document instead.
    async fn fetch(&self, url: &str) -> Result<FeedDocument>;
}

/// Pacing applied between two successive sources.
#[async_trait]
pub trait Throttle: Send + Sync {
    async fn pause(&self);
}

/// Receives the non-fatal problems found while aggregating, plus progress
/// as each source is started.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);

    /// Called before fetching source `position` (1-based) of `total`.
    fn progress(&self, _source: &str, _position: usize, _total: usize) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// The feed parsed, but only after recovering from broken input.
    MalformedFeed { source: String, reason: String },
    /// The source could not be fetched or parsed and contributes nothing.
    SourceFailed { source: String, error: String },
}

impl Diagnostic {
    pub fn source(&self) -> &str {
        match self {
            Diagnostic::MalformedFeed { source, .. } | Diagnostic::SourceFailed { source, .. } => source,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Diagnostic::SourceFailed { .. })
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::MalformedFeed { source, reason } => {
                write!(f, "Warning: the feed for {} has problems ({})", source, reason)
            }
            Diagnostic::SourceFailed { source, error } => {
                write!(f, "Failed to fetch the feed for {}: {}", source, error)
            }
        }
    }
}
