use news_aggregator::{AggregatorError, FetchConfig, Fetcher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

static INIT: Once = Once::new();

fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

const FEED: &str = r#"<?xml version="1.0"?><rss version="2.0"><channel><title>T</title></channel></rss>"#;

/// Answers every connection with `response` and counts the requests served.
async fn serve(response: Vec<u8>) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            let response = response.clone();
            tokio::spawn(async move {
                let mut request = [0u8; 4096];
                let _ = socket.read(&mut request).await;
                let _ = socket.write_all(&response).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (format!("http://{}/feed.xml", addr), hits)
}

fn status_response(status: &str) -> Vec<u8> {
    format!("HTTP/1.1 {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n", status).into_bytes()
}

fn config(max_retries: u32) -> FetchConfig {
    FetchConfig {
        timeout_seconds: 5,
        max_retries,
        retry_delay_seconds: 1,
        ..FetchConfig::default()
    }
}

#[tokio::test]
async fn test_fetch_returns_body() {
    init_tracing();

    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/rss+xml\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        FEED.len(),
        FEED
    );
    let (url, hits) = serve(response.into_bytes()).await;
    let fetcher = Fetcher::new(config(2)).unwrap();

    let body = fetcher.fetch(&url).await.unwrap();

    assert_eq!(body.bytes, FEED.as_bytes());
    assert_eq!(body.http_status, 200);
    assert_eq!(body.content_type.as_deref(), Some("application/rss+xml"));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    init_tracing();

    let (url, hits) = serve(status_response("404 Not Found")).await;
    let fetcher = Fetcher::new(config(2)).unwrap();

    let result = fetcher.fetch(&url).await;

    assert!(matches!(result, Err(AggregatorError::Status { status: 404 })));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_server_errors_are_retried() {
    init_tracing();

    let (url, hits) = serve(status_response("503 Service Unavailable")).await;
    let fetcher = Fetcher::new(config(1)).unwrap();

    let result = fetcher.fetch(&url).await;

    assert!(matches!(result, Err(AggregatorError::Status { status: 503 })));
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_body_without_length_is_capped() {
    init_tracing();

    // No Content-Length: the body runs until the connection closes.
    let mut response = b"HTTP/1.1 200 OK\r\nContent-Type: application/rss+xml\r\nConnection: close\r\n\r\n".to_vec();
    response.extend(std::iter::repeat(b'x').take(2 * 1024 * 1024 + 1));
    let (url, hits) = serve(response).await;
    let fetcher = Fetcher::new(FetchConfig { max_feed_size_mb: 1, ..config(2) }).unwrap();

    let result = fetcher.fetch(&url).await;

    assert!(matches!(result, Err(AggregatorError::FeedTooLarge { .. })));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}
