use crate::types::{FetchConfig, NewsbriefError, RawEntry, Result};
use async_trait::async_trait;
use backoff::{backoff::Backoff, exponential::ExponentialBackoff};
use chrono::Utc;
use feed_rs::parser;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use url::Url;

/// Trait for retrieving a feed's raw entries from an address.
///
/// The pipeline depends on this seam rather than on a concrete HTTP
/// client, so collection can run against canned sources in tests.
#[async_trait]
pub trait FetchFeed: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<RawEntry>>;
}

pub struct FeedFetcher {
    client: Client,
    config: FetchConfig,
}

impl FeedFetcher {
    pub fn new(config: FetchConfig) -> Self {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    // Network and timeout failures retry with exponential backoff up to
    // the attempt bound; HTTP status and body errors return immediately.
    async fn fetch_content(&self, url: &Url) -> Result<String> {
        let mut backoff: ExponentialBackoff<backoff::SystemClock> = ExponentialBackoff {
            current_interval: Duration::from_secs(self.config.retry_delay_seconds),
            initial_interval: Duration::from_secs(self.config.retry_delay_seconds),
            max_interval: Duration::from_secs(self.config.max_retry_delay_seconds),
            multiplier: 2.0,
            max_elapsed_time: None,
            ..Default::default()
        };

        let attempts = self.config.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.client.get(url.clone()).send().await {
                Ok(response) => {
                    let response = response.error_for_status()?;
                    return Ok(response.text().await?);
                }
                Err(e) if is_transient(&e) && attempt < attempts => {
                    warn!("Attempt {}/{} failed for {}: {}", attempt, attempts, url, e);
                    if let Some(delay) = backoff.next_backoff() {
                        debug!("Retrying {} in {:?}", url, delay);
                        tokio::time::sleep(delay).await;
                    }
                }
                Err(e) => {
                    if is_transient(&e) {
                        error!("Giving up on {} after {} attempts", url, attempts);
                    }
                    return Err(NewsbriefError::Http(e));
                }
            }
        }
    }
}

#[async_trait]
impl FetchFeed for FeedFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<RawEntry>> {
        let address = Url::parse(url)?;
        debug!("Fetching feed: {}", address);
        let content = self.fetch_content(&address).await?;
        info!("Fetched feed: {} ({} bytes)", address, content.len());
        parse_entries(&content)
    }
}

// Shared with the other HTTP collaborators: only these classes retry.
pub(crate) fn is_transient(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect()
}

/// Parse feed content into raw entries, preserving document order.
pub fn parse_entries(content: &str) -> Result<Vec<RawEntry>> {
    let feed = parser::parse(content.as_bytes())
        .map_err(|e| NewsbriefError::Parse(format!("Failed to parse feed: {}", e)))?;

    let entries = feed
        .entries
        .into_iter()
        .map(|entry| RawEntry {
            link: entry.links.first().map(|l| l.href.clone()),
            title: entry.title.map(|t| t.content),
            summary: entry.summary.map(|s| s.content),
            published: entry.published.map(|dt| dt.with_timezone(&Utc)),
        })
        .collect();

    Ok(entries)
}
