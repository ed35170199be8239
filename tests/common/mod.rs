// Shared fixtures and scripted collaborators for the integration tests.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use newsbrief::{Article, FetchFeed, Mailer, NewsbriefError, RawEntry, Result, Summarizer};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Build a configuration suitable for tests: a dummy API key, email
/// off, and the reference defaults everywhere else. Never reads the
/// environment.
pub fn test_config() -> newsbrief::AppConfig {
    newsbrief::AppConfig {
        max_articles: 10,
        max_ai: 15,
        hours_back: 120,
        google_api_key: "test-key".to_string(),
        model: "gemini-2.5-flash".to_string(),
        ai_tokens: 2000,
        ai_temp: 0.7,
        email_enabled: false,
        email_user: String::new(),
        email_password: String::new(),
        smtp_server: "smtp.gmail.com".to_string(),
        smtp_port: 587,
        mailing_list: Vec::new(),
    }
}

/// An article published `minutes_ago` minutes before now.
pub fn article(source: &str, title: &str, minutes_ago: i64) -> Article {
    Article {
        source: source.to_string(),
        title: title.to_string(),
        link: format!(
            "https://example.com/{}",
            title.to_lowercase().replace(' ', "-")
        ),
        summary: format!("Summary of {}", title),
        published: Utc::now() - Duration::minutes(minutes_ago),
    }
}

/// A raw feed entry published `hours_ago` hours before now.
pub fn entry(title: &str, hours_ago: i64) -> RawEntry {
    RawEntry {
        title: Some(title.to_string()),
        link: Some(format!(
            "https://example.com/{}",
            title.to_lowercase().replace(' ', "-")
        )),
        summary: Some(format!("Summary of {}", title)),
        published: Some(Utc::now() - Duration::hours(hours_ago)),
    }
}

enum FeedScript {
    Entries(Vec<RawEntry>),
    Fail(String),
}

/// Feed source with canned responses per URL. Unknown URLs return an
/// empty feed.
pub struct ScriptedFetcher {
    scripts: HashMap<String, FeedScript>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self {
            scripts: HashMap::new(),
        }
    }

    pub fn with_entries(mut self, url: &str, entries: Vec<RawEntry>) -> Self {
        self.scripts
            .insert(url.to_string(), FeedScript::Entries(entries));
        self
    }

    pub fn with_failure(mut self, url: &str, message: &str) -> Self {
        self.scripts
            .insert(url.to_string(), FeedScript::Fail(message.to_string()));
        self
    }
}

#[async_trait]
impl FetchFeed for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<RawEntry>> {
        match self.scripts.get(url) {
            Some(FeedScript::Entries(entries)) => Ok(entries.clone()),
            Some(FeedScript::Fail(message)) => Err(NewsbriefError::Parse(message.clone())),
            None => Ok(Vec::new()),
        }
    }
}

/// Summarizer that returns a fixed digest for any non-empty batch.
pub struct FixedSummarizer {
    pub response: String,
}

#[async_trait]
impl Summarizer for FixedSummarizer {
    async fn analyze_articles(&self, articles: &[Article]) -> Result<String> {
        if articles.is_empty() {
            return Ok("No articles available for analysis.".to_string());
        }
        Ok(self.response.clone())
    }
}

/// Summarizer that always fails with an unclassified error.
pub struct FailingSummarizer;

#[async_trait]
impl Summarizer for FailingSummarizer {
    async fn analyze_articles(&self, _articles: &[Article]) -> Result<String> {
        Err(NewsbriefError::Summarization(
            "simulated backend outage".to_string(),
        ))
    }
}

/// Mailer that records calls and reports a configured outcome.
pub struct RecordingMailer {
    pub succeed: bool,
    pub calls: Arc<AtomicUsize>,
}

impl RecordingMailer {
    pub fn new(succeed: bool) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                succeed,
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_newsletter(
        &self,
        _summary: &str,
        _articles: &[Article],
        _recipients: &[String],
    ) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.succeed
    }
}
