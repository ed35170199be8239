pub mod types;
pub mod config;
pub mod fetcher;
pub mod normalizer;
pub mod collector;
pub mod report;
pub mod summarizer;
pub mod template;
pub mod email;
pub mod orchestrator;

pub use types::*;
pub use config::{default_feeds, parse_mailing_list, AppConfig};
pub use fetcher::{parse_entries, FeedFetcher, FetchFeed};
pub use normalizer::normalize;
pub use collector::CollectorAgent;
pub use report::{build_report, group_by_source};
pub use summarizer::{
    build_prompt, FailureKind, FinishReason, GenerateResponse, GeminiSummarizer, SummaryOutcome,
    Summarizer,
};
pub use template::newsletter_html;
pub use email::{EmailAgent, Mailer};
pub use orchestrator::{
    priority_mentions, Orchestrator, RunSummary, WorkflowStage, PRIORITY_COMPANIES,
};
