use crate::diagnostics::TracingSink;
use crate::rss_utils::{text, time};
use crate::sources::SourceList;
use crate::throttle::FixedDelay;
use crate::traits::{Diagnostic, DiagnosticSink, FeedClient, Throttle};
use crate::types::{AggregationReport, AggregatorConfig, NewsItem, RawEntry, SourceOutcome, SourceReport};
use std::sync::Arc;
use tracing::{debug, info};

/// Fetches named feeds one after another and normalizes their entries
/// into source-tagged [`NewsItem`]s.
///
/// A failing source never aborts a run: it is reported to the diagnostic
/// sink and contributes no items.
pub struct FeedAggregator {
    client: Arc<dyn FeedClient>,
    throttle: Arc<dyn Throttle>,
    diagnostics: Arc<dyn DiagnosticSink>,
    config: AggregatorConfig,
}

impl FeedAggregator {
    pub fn new(client: Arc<dyn FeedClient>, config: AggregatorConfig) -> Self {
        Self {
            client,
            throttle: Arc::new(FixedDelay(config.request_delay)),
            diagnostics: Arc::new(TracingSink),
            config,
        }
    }

    pub fn with_throttle(mut self, throttle: Arc<dyn Throttle>) -> Self {
        self.throttle = throttle;
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Items of a single source; empty when the source failed.
    pub async fn fetch_one(&self, source_name: &str, feed_url: &str) -> Vec<NewsItem> {
        self.fetch_source(source_name, feed_url).await.into_items()
    }

    pub async fn fetch_source(&self, source_name: &str, feed_url: &str) -> SourceOutcome {
        debug!("Fetching {} from {}", source_name, feed_url);

        let document = match self.client.fetch(feed_url).await {
            Ok(document) => document,
            Err(e) => {
                self.diagnostics.report(Diagnostic::SourceFailed {
                    source: source_name.to_string(),
                    error: e.to_string(),
                });
                return SourceOutcome::Failed { reason: e.to_string() };
            }
        };

        let malformed = document.is_malformed();
        if let Some(reason) = document.malformation {
            self.diagnostics.report(Diagnostic::MalformedFeed {
                source: source_name.to_string(),
                reason,
            });
        }

        let items: Vec<NewsItem> = document
            .entries
            .iter()
            .take(self.config.max_entries_per_source)
            .filter_map(|entry| self.normalize(source_name, entry))
            .collect();

        info!("{}: {} items from {} entries", source_name, items.len(), document.entries.len());
        SourceOutcome::Fetched { items, malformed }
    }

    /// Every source's items concatenated in source order.
    pub async fn fetch_all(&self, sources: &SourceList) -> Vec<NewsItem> {
        self.fetch_report(sources).await.into_items()
    }

    pub async fn fetch_report(&self, sources: &SourceList) -> AggregationReport {
        let mut report = AggregationReport::default();

        let total = sources.len();

        for (index, source) in sources.iter().enumerate() {
            if index > 0 {
                self.throttle.pause().await;
            }

            self.diagnostics.progress(&source.name, index + 1, total);

            let outcome = self.fetch_source(&source.name, &source.url).await;
            report.sources.push(SourceReport {
                name: source.name.clone(),
                url: source.url.clone(),
                outcome,
            });
        }

        info!(
            "Fetched {} items from {} sources ({} failed)",
            report.item_count(),
            report.sources.len(),
            report.failed_sources().count()
        );
        report
    }

    /// `None` for entries without a usable title.
    fn normalize(&self, source_name: &str, entry: &RawEntry) -> Option<NewsItem> {
        let title = entry.title.as_deref().unwrap_or_default().trim();
        if title.is_empty() {
            debug!("{}: skipping entry without title", source_name);
            return None;
        }

        let published = entry.published.as_ref().and_then(|published| {
            let formatted = time::format_published(published);
            if formatted.is_none() {
                debug!("{}: dropping out-of-range publish time {:?}", source_name, published);
            }
            formatted
        });

        let summary = entry
            .summary
            .as_deref()
            .map(|raw| text::clean_summary(raw, self.config.summary_max_chars));

        let url = entry.link.clone().unwrap_or_default();

        NewsItem::new(title, url, source_name)
            .map(|item| item.with_published(published).with_summary(summary))
    }
}
