use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use news_aggregator::render::{self, ConsoleSink};
use news_aggregator::{AggregatorConfig, FeedAggregator, FeedSource, FetchConfig, HttpFeedClient, SourceList};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Fetch headlines from RSS/Atom feeds and print them grouped by source.
#[derive(Parser, Debug)]
#[command(name = "news", version)]
struct Cli {
    /// Feed to read, as NAME=URL. May be repeated. Replaces the built-in sources.
    #[arg(short, long = "source", value_name = "NAME=URL")]
    sources: Vec<FeedSource>,

    /// JSON file with an array of {"name", "url"} objects.
    #[arg(long, value_name = "PATH")]
    sources_file: Option<PathBuf>,

    /// Maximum number of entries read from each feed.
    #[arg(long, default_value_t = 15)]
    limit: usize,

    /// Summaries longer than this many characters are truncated.
    #[arg(long, default_value_t = 100)]
    summary_chars: usize,

    /// Pause between two feeds, in milliseconds.
    #[arg(long, default_value_t = 500)]
    delay_ms: u64,

    /// HTTP timeout per request, in seconds.
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Print the items as JSON instead of tables.
    #[arg(long)]
    json: bool,

    /// Log at debug level (overridden by RUST_LOG).
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn source_list(&self) -> anyhow::Result<SourceList> {
        let mut list = match &self.sources_file {
            Some(path) => SourceList::from_json_file(path)
                .with_context(|| format!("failed to load sources from {}", path.display()))?,
            None => SourceList::new(),
        };

        for source in &self.sources {
            list.push(source.clone());
        }

        if list.is_empty() {
            debug!("No sources given, using defaults");
            list = SourceList::defaults();
        }
        Ok(list)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    tokio::select! {
        result = run(cli) => result,
        _ = tokio::signal::ctrl_c() => {
            eprintln!("\n{}", "⚠️ Interrupted.".bold().yellow());
            std::process::exit(130);
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let sources = cli.source_list()?;
    info!("Aggregating {} sources", sources.len());

    let fetch_config = FetchConfig {
        timeout_seconds: cli.timeout,
        ..FetchConfig::default()
    };
    let config = AggregatorConfig {
        max_entries_per_source: cli.limit,
        summary_max_chars: cli.summary_chars,
        request_delay: Duration::from_millis(cli.delay_ms),
    };

    let client = HttpFeedClient::new(fetch_config).context("failed to build HTTP client")?;
    let aggregator = FeedAggregator::new(Arc::new(client), config)
        .with_diagnostics(Arc::new(ConsoleSink));

    let mut out = std::io::stdout();

    if cli.json {
        let items = aggregator.fetch_all(&sources).await;
        render::render_json(&mut out, &items)?;
        return Ok(());
    }

    render::render_welcome(&mut out)?;
    let report = aggregator.fetch_report(&sources).await;

    if report.is_empty() {
        render::render_empty(&mut out)?;
        return Ok(());
    }

    let items: Vec<_> = report.items().cloned().collect();
    render::render_news(&mut out, &items)?;
    render::render_summary(&mut out, &report)?;
    render::render_footer(&mut out, chrono::Local::now())?;
    writeln!(out, "{}", "✨ Done.".bold().green())?;

    Ok(())
}
