use crate::fetcher::Fetcher;
use crate::parser::FeedParser;
use crate::traits::FeedClient;
use crate::types::{FeedDocument, FetchConfig, Result};
use async_trait::async_trait;
use tracing::debug;

/// Production [`FeedClient`]: HTTP retrieval followed by feed-rs parsing.
pub struct HttpFeedClient {
    fetcher: Fetcher,
    parser: FeedParser,
}

impl HttpFeedClient {
    pub fn new(config: FetchConfig) -> Result<Self> {
        Ok(Self {
            fetcher: Fetcher::new(config)?,
            parser: FeedParser::new(),
        })
    }
}

#[async_trait]
impl FeedClient for HttpFeedClient {
    async fn fetch(&self, url: &str) -> Result<FeedDocument> {
        let body = self.fetcher.fetch(url).await?;
        debug!(
            "Got {} ({}) from {} in {}ms",
            body.http_status,
            body.content_type.as_deref().unwrap_or("unknown type"),
            url,
            body.response_time_ms
        );
        self.parser.parse(&body.bytes)
    }
}
