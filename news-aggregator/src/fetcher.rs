use crate::types::{AggregatorError, FetchConfig, Result};
use backoff::{backoff::Backoff, exponential::ExponentialBackoff};
use reqwest::{Client, Response, StatusCode};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use url::Url;

/// Body of a successful feed request.
#[derive(Debug, Clone)]
pub struct FetchedBody {
    pub bytes: Vec<u8>,
    pub http_status: u16,
    pub content_type: Option<String>,
    pub response_time_ms: u64,
}

pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let redirect = if config.follow_redirects {
            reqwest::redirect::Policy::limited(config.max_redirects)
        } else {
            reqwest::redirect::Policy::none()
        };

        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(redirect)
            .build()?;

        Ok(Self { client, config })
    }

    /// GETs `url`, retrying transport errors, 5xx and 429 with exponential
    /// backoff. Other statuses and oversized bodies fail at once. Returns the
    /// last error once retries run out.
    pub async fn fetch(&self, url: &str) -> Result<FetchedBody> {
        let start_time = Instant::now();
        Url::parse(url)?;

        debug!("Fetching feed: {}", url);

        let mut backoff: ExponentialBackoff<backoff::SystemClock> = ExponentialBackoff {
            current_interval: Duration::from_secs(self.config.retry_delay_seconds),
            initial_interval: Duration::from_secs(self.config.retry_delay_seconds),
            max_interval: Duration::from_secs(self.config.retry_delay_seconds * 32),
            multiplier: 2.0,
            max_elapsed_time: Some(Duration::from_secs(self.config.retry_delay_seconds * 60)),
            ..Default::default()
        };

        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            match self.fetch_once(url).await {
                Ok(response) => {
                    let status = response.status();

                    if !status.is_success() {
                        let error = AggregatorError::Status { status: status.as_u16() };
                        if !Self::is_retryable(status) {
                            warn!("Giving up on {}: HTTP {}", url, status);
                            return Err(error);
                        }
                        last_error = Some(error);
                    } else {
                        let content_type = response
                            .headers()
                            .get(reqwest::header::CONTENT_TYPE)
                            .and_then(|v| v.to_str().ok())
                            .map(|s| s.to_string());

                        match self.read_body(response).await {
                            Ok(bytes) => {
                                info!("Successfully fetched feed: {} ({} bytes)", url, bytes.len());
                                return Ok(FetchedBody {
                                    bytes,
                                    http_status: status.as_u16(),
                                    content_type,
                                    response_time_ms: start_time.elapsed().as_millis() as u64,
                                });
                            }
                            // Oversized feeds are not retried.
                            Err(e @ AggregatorError::FeedTooLarge { .. }) => return Err(e),
                            Err(e) => {
                                last_error = Some(e);
                            }
                        }
                    }
                }
                Err(e) => {
                    last_error = Some(e);
                }
            }

            if attempt < self.config.max_retries {
                if let Some(delay) = backoff.next_backoff() {
                    warn!("Attempt {} failed for {}, retrying in {:?}", attempt + 1, url, delay);
                    tokio::time::sleep(delay).await;
                    continue;
                }
            }
            break;
        }

        error!("Failed to fetch feed after {} attempts: {}", self.config.max_retries + 1, url);
        Err(last_error.unwrap_or_else(|| AggregatorError::General("Unknown error".to_string())))
    }

    async fn fetch_once(&self, url: &str) -> Result<Response> {
        let response = self.client.get(url).send().await?;
        Ok(response)
    }

    fn is_retryable(status: StatusCode) -> bool {
        status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
    }

    /// Streams the body chunk by chunk, stopping as soon as it passes the
    /// size limit. Content-Length is checked first when the server sends it.
    async fn read_body(&self, mut response: Response) -> Result<Vec<u8>> {
        self.check_size(response.content_length().unwrap_or_default())?;

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            body.extend_from_slice(&chunk);
            self.check_size(body.len() as u64)?;
        }
        Ok(body)
    }

    fn check_size(&self, length: u64) -> Result<()> {
        let limit = self.config.max_feed_size_mb as u64 * 1024 * 1024;
        if length > limit {
            return Err(AggregatorError::FeedTooLarge {
                size_mb: length.div_ceil(1024 * 1024) as usize,
            });
        }
        Ok(())
    }
}
