pub mod types;
pub mod traits;
pub mod fetcher;
pub mod parser;
pub mod client;
pub mod aggregator;
pub mod throttle;
pub mod diagnostics;
pub mod sources;
pub mod render;
pub mod rss_utils;

pub use types::*;
pub use traits::{Diagnostic, DiagnosticSink, FeedClient, Throttle};
pub use fetcher::Fetcher;
pub use parser::FeedParser;
pub use client::HttpFeedClient;
pub use aggregator::FeedAggregator;
pub use throttle::{FixedDelay, NoDelay};
pub use diagnostics::{MemorySink, TracingSink};
pub use sources::SourceList;
