//! Fetching external calendar feeds.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use thiserror::Error;
use tokio::sync::Mutex;

use stayline_core::config::SyncConfig;
use stayline_core::types::CalendarEvent;
use stayline_rfc::rfc::ical::parse_feed;

/// Why a feed could not be turned into events.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedError {
    #[error("feed URL is invalid: {0}")]
    InvalidUrl(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("request timed out")]
    Timeout,

    #[error("feed answered with HTTP {0}")]
    Status(u16),

    #[error("feed is not a valid calendar: {0}")]
    Parse(String),
}

#[async_trait::async_trait]
pub trait FeedFetcher: Send + Sync + 'static {
    /// ## Summary
    /// Downloads the body of a feed.
    ///
    /// ## Errors
    /// Returns an error if the feed cannot be downloaded.
    async fn fetch(&self, url: &str) -> Result<String, FeedError>;
}

/// ## Summary
/// Downloads a feed and extracts its bookings.
///
/// ## Errors
/// Returns an error if the download fails or the body is not a calendar.
#[tracing::instrument(skip(fetcher))]
pub async fn fetch_events(
    fetcher: &dyn FeedFetcher,
    url: &str,
) -> Result<Vec<CalendarEvent>, FeedError> {
    let body = fetcher.fetch(url).await?;
    parse_feed(&body).map_err(|e| FeedError::Parse(e.to_string()))
}

/// ## Summary
/// Normalises an operator-entered feed URL. `webcal://` links are fetched
/// over HTTPS.
///
/// ## Errors
/// Returns an error if the URL is not an HTTP, HTTPS or webcal URL.
pub fn normalize_feed_url(url: &str) -> Result<String, FeedError> {
    let url = url.trim();
    let lower = url.to_ascii_lowercase();

    if let Some(rest) = lower.strip_prefix("webcal://") {
        let offset = url.len() - rest.len();
        return Ok(format!("https://{}", &url[offset..]));
    }
    if lower.starts_with("https://") || lower.starts_with("http://") {
        return Ok(url.to_string());
    }
    Err(FeedError::InvalidUrl(url.to_string()))
}

/// Fetches feeds over HTTP with the configured timeout and user agent.
#[derive(Debug, Clone)]
pub struct HttpFeedFetcher {
    client: reqwest::Client,
}

impl HttpFeedFetcher {
    /// ## Summary
    /// Builds the HTTP client used for every feed download.
    ///
    /// ## Errors
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn new(config: &SyncConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.fetch_timeout())
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl FeedFetcher for HttpFeedFetcher {
    #[tracing::instrument(skip(self))]
    async fn fetch(&self, url: &str) -> Result<String, FeedError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "text/calendar, */*")
            .send()
            .await
            .map_err(request_error)?;

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "Feed request rejected");
            return Err(FeedError::Status(response.status().as_u16()));
        }

        let body = response.text().await.map_err(request_error)?;
        tracing::debug!(bytes = body.len(), "Feed downloaded");
        Ok(body)
    }
}

fn request_error(error: reqwest::Error) -> FeedError {
    if error.is_timeout() {
        FeedError::Timeout
    } else {
        FeedError::Request(error.to_string())
    }
}

/// Serves canned feed bodies by URL and counts requests.
///
/// Unknown URLs answer with HTTP 404.
#[derive(Debug, Clone, Default)]
pub struct StaticFeedFetcher {
    feeds: Arc<Mutex<HashMap<String, Result<String, FeedError>>>>,
    requests: Arc<AtomicUsize>,
}

impl StaticFeedFetcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn serve(&self, url: impl Into<String>, body: impl Into<String>) {
        self.feeds.lock().await.insert(url.into(), Ok(body.into()));
    }

    pub async fn fail(&self, url: impl Into<String>, error: FeedError) {
        self.feeds.lock().await.insert(url.into(), Err(error));
    }

    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl FeedFetcher for StaticFeedFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FeedError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.feeds
            .lock()
            .await
            .get(url)
            .cloned()
            .unwrap_or(Err(FeedError::Status(404)))
    }
}
