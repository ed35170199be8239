use crate::fetcher::FetchFeed;
use crate::normalizer::normalize;
use crate::types::{Article, FeedSpec};
use chrono::{Duration, Utc};
use tracing::{debug, error, info, warn};

/// Collects recent articles from the configured feeds.
///
/// One unreachable or malformed feed never aborts the batch: fetch and
/// normalization failures are logged and skipped at the narrowest scope
/// that contains them.
pub struct CollectorAgent {
    feeds: Vec<FeedSpec>,
    fetcher: Box<dyn FetchFeed>,
    hours_back: i64,
    max_articles: usize,
}

impl CollectorAgent {
    pub fn new(
        feeds: Vec<FeedSpec>,
        fetcher: Box<dyn FetchFeed>,
        hours_back: i64,
        max_articles: usize,
    ) -> Self {
        Self {
            feeds,
            fetcher,
            hours_back,
            max_articles,
        }
    }

    /// Fetch every configured source in order and build the batch:
    /// retain articles published after `now - hours_back`, sort newest
    /// first (stable, so ties keep encounter order), and truncate to
    /// `max_articles`.
    pub async fn collect(&self) -> Vec<Article> {
        let cutoff = Utc::now() - Duration::hours(self.hours_back);
        let total = self.feeds.len();
        let mut articles = Vec::new();
        let mut failed_sources = 0;

        info!(
            "Collecting articles from the last {} days ({} sources)",
            self.hours_back / 24,
            total
        );

        for (idx, feed) in self.feeds.iter().enumerate() {
            debug!("[{}/{}] Fetching from {}", idx + 1, total, feed.name);
            match self.fetcher.fetch(&feed.url).await {
                Ok(entries) => {
                    debug!("{}: {} entries", feed.name, entries.len());
                    for entry in entries {
                        match normalize(&feed.name, entry) {
                            Ok(article) => {
                                if article.published > cutoff {
                                    articles.push(article);
                                }
                            }
                            Err(e) => {
                                warn!("Error parsing entry from {}: {}", feed.name, e);
                            }
                        }
                    }
                }
                Err(e) => {
                    failed_sources += 1;
                    error!("Error fetching from {}: {}", feed.name, e);
                }
            }
        }

        if total > 0 && failed_sources == total {
            warn!("All {} sources failed; batch is empty", total);
        }

        articles.sort_by(|a, b| b.published.cmp(&a.published));
        articles.truncate(self.max_articles);

        info!("Collected {} articles", articles.len());
        articles
    }
}
