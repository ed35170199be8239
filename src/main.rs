use clap::Parser;
use newsbrief::{
    default_feeds, AppConfig, CollectorAgent, EmailAgent, FeedFetcher, FetchConfig,
    GeminiSummarizer, Orchestrator,
};
use tracing::error;

/// Collect tech news, summarize it with Gemini, and email the digest.
#[derive(Parser, Debug)]
#[command(name = "newsbrief", version, about)]
struct Cli {
    /// Look-back window in hours
    #[arg(long)]
    hours_back: Option<i64>,

    /// Cap on articles kept per run
    #[arg(long)]
    max_articles: Option<usize>,

    /// Skip email dispatch even if EMAIL_ENABLED is set
    #[arg(long)]
    no_email: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut config = AppConfig::from_env();
    if let Some(hours) = cli.hours_back {
        config.hours_back = hours;
    }
    if let Some(max) = cli.max_articles {
        config.max_articles = max;
    }
    if cli.no_email {
        config.email_enabled = false;
    }

    let fetcher = FeedFetcher::new(FetchConfig::default());
    let collector = CollectorAgent::new(
        default_feeds(),
        Box::new(fetcher),
        config.hours_back,
        config.max_articles,
    );
    let summarizer = GeminiSummarizer::new(&config);
    let mailer = EmailAgent::new(&config);

    let orchestrator = Orchestrator::new(config, collector, Box::new(summarizer), Box::new(mailer));

    let summary = orchestrator.run().await.map_err(|e| {
        error!("Workflow failed: {}", e);
        e
    })?;

    println!("{}", summary.report);
    println!("{}", summary.analysis);
    Ok(())
}
