use crate::types::FeedSpec;
use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub max_articles: usize,
    pub max_ai: usize,
    pub hours_back: i64,
    pub google_api_key: String,
    pub model: String,
    pub ai_tokens: u32,
    pub ai_temp: f32,
    pub email_enabled: bool,
    pub email_user: String,
    pub email_password: String,
    pub smtp_server: String,
    pub smtp_port: u16,
    pub mailing_list: Vec<String>,
}

impl AppConfig {
    /// Read configuration from the environment, falling back to the
    /// built-in defaults for anything unset.
    pub fn from_env() -> Self {
        Self {
            max_articles: 10,
            max_ai: 15,
            hours_back: env_parse("HOURS_BACK", 120),
            google_api_key: env::var("GOOGLE_API_KEY").unwrap_or_default(),
            model: "gemini-2.5-flash".to_string(),
            ai_tokens: 2000,
            ai_temp: 0.7,
            email_enabled: env::var("EMAIL_ENABLED")
                .map(|v| v.to_lowercase() == "true")
                .unwrap_or(false),
            email_user: env::var("EMAIL_USER").unwrap_or_default(),
            email_password: env::var("EMAIL_PASSWORD").unwrap_or_default(),
            smtp_server: env::var("SMTP_SERVER").unwrap_or_else(|_| "smtp.gmail.com".to_string()),
            smtp_port: env_parse("SMTP_PORT", 587),
            mailing_list: parse_mailing_list(&env::var("MAILING_LIST").unwrap_or_default()),
        }
    }

    /// Look-back window expressed in whole days, for display and prompts.
    pub fn days_back(&self) -> i64 {
        self.hours_back / 24
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Split a comma-separated recipient list, trimming whitespace and
/// dropping empty entries.
pub fn parse_mailing_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

/// The built-in feed roster. Order matters: it is the iteration order
/// for collection and the display order for reports.
pub fn default_feeds() -> Vec<FeedSpec> {
    vec![
        // Priority companies
        FeedSpec::new("NVIDIA", "https://nvidianews.nvidia.com/rss"),
        FeedSpec::new("Intel", "https://newsroom.intel.com/feed/"),
        // FeedSpec::new("AMD", "https://www.amd.com/en/corporate/news/rss.xml"),
        FeedSpec::new("Qualcomm", "https://www.qualcomm.com/news/rss"),
        FeedSpec::new("Broadcom", "https://www.broadcom.com/news/rss"),
        FeedSpec::new("OpenAI", "https://openai.com/blog/rss.xml"),
        // General tech press
        FeedSpec::new("TechCrunch", "https://techcrunch.com/feed/"),
        FeedSpec::new("Ars Technica", "http://feeds.arstechnica.com/arstechnica/index/"),
        FeedSpec::new("The Verge", "https://www.theverge.com/rss/index.xml"),
        FeedSpec::new("WIRED", "https://www.wired.com/feed/rss"),
        FeedSpec::new("VentureBeat", "https://venturebeat.com/feed/"),
        FeedSpec::new("CNET", "https://www.cnet.com/rss/news/"),
    ]
}
