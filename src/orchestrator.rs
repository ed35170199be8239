use crate::collector::CollectorAgent;
use crate::config::AppConfig;
use crate::email::Mailer;
use crate::report::{build_report, group_by_source};
use crate::summarizer::Summarizer;
use crate::types::{Article, NewsbriefError, Result};
use std::fmt;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Companies the digest tracks closely. Order breaks ties when ranking
/// coverage.
pub const PRIORITY_COMPANIES: [&str; 6] =
    ["NVIDIA", "Intel", "AMD", "Qualcomm", "Broadcom", "OpenAI"];

const DIALOG_TOP_COMPANIES: usize = 3;

/// Stages of one workflow run, in the order they execute. Dispatching
/// only runs when at least one recipient is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowStage {
    Init,
    Collecting,
    Reporting,
    Summarizing,
    Dialog,
    Dispatching,
    Done,
}

impl fmt::Display for WorkflowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkflowStage::Init => "INIT",
            WorkflowStage::Collecting => "COLLECTING",
            WorkflowStage::Reporting => "REPORTING",
            WorkflowStage::Summarizing => "SUMMARIZING",
            WorkflowStage::Dialog => "DIALOG",
            WorkflowStage::Dispatching => "DISPATCHING",
            WorkflowStage::Done => "DONE",
        };
        f.write_str(name)
    }
}

/// Everything a completed run produced, for display and inspection.
#[derive(Debug)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub articles: Vec<Article>,
    pub report: String,
    pub analysis: String,
    pub email_sent: bool,
}

/// Drives one end-to-end run: collect, report, summarize, narrate the
/// priority-company dialog, and optionally dispatch the newsletter.
pub struct Orchestrator {
    run_id: Uuid,
    config: AppConfig,
    collector: CollectorAgent,
    summarizer: Box<dyn Summarizer>,
    mailer: Box<dyn Mailer>,
}

impl Orchestrator {
    pub fn new(
        config: AppConfig,
        collector: CollectorAgent,
        summarizer: Box<dyn Summarizer>,
        mailer: Box<dyn Mailer>,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            config,
            collector,
            summarizer,
            mailer,
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    fn enter(&self, stage: WorkflowStage) {
        info!("[{}] stage: {}", self.run_id, stage);
    }

    /// A missing API key is fatal here, before any network work starts.
    fn validate(&self) -> Result<()> {
        if self.config.google_api_key.trim().is_empty() {
            return Err(NewsbriefError::Config(
                "GOOGLE_API_KEY is not set; summarization cannot run".to_string(),
            ));
        }
        if self.config.email_enabled && self.config.mailing_list.is_empty() {
            warn!("Email is enabled but MAILING_LIST is empty; nothing will be sent");
        }
        Ok(())
    }

    pub async fn run(&self) -> Result<RunSummary> {
        self.enter(WorkflowStage::Init);
        self.validate()?;
        info!(
            "Starting NewsBrief run over the last {} days",
            self.config.days_back()
        );

        self.enter(WorkflowStage::Collecting);
        let articles = self.collector.collect().await;

        self.enter(WorkflowStage::Reporting);
        let report = build_report(&articles, self.config.days_back());

        self.enter(WorkflowStage::Summarizing);
        let analysis = self.summarizer.analyze_articles(&articles).await?;

        self.enter(WorkflowStage::Dialog);
        self.narrate_dialog(&articles);

        let email_sent = if self.config.mailing_list.is_empty() {
            debug!("No recipients configured; skipping dispatch stage");
            false
        } else {
            self.enter(WorkflowStage::Dispatching);
            self.mailer
                .send_newsletter(&analysis, &articles, &self.config.mailing_list)
                .await
        };

        self.enter(WorkflowStage::Done);
        info!(
            "Run {} finished: {} articles, {} chars of analysis, email_sent={}",
            self.run_id,
            articles.len(),
            analysis.len(),
            email_sent
        );

        Ok(RunSummary {
            run_id: self.run_id,
            articles,
            report,
            analysis,
            email_sent,
        })
    }

    /// Agent dialog about priority-company coverage. Runs and logs
    /// only when at least one priority company appears in the batch.
    fn narrate_dialog(&self, articles: &[Article]) {
        let mentions = priority_mentions(articles);
        if mentions.is_empty() {
            debug!("No priority company coverage this run");
            return;
        }

        let coverage = mentions
            .iter()
            .map(|(company, count)| format!("{} ({})", company, count))
            .collect::<Vec<_>>()
            .join(", ");
        info!(
            "Collector: collected {} articles. Top companies: {}",
            articles.len(),
            coverage
        );
        info!("Summarizer: noted, weighting the digest toward {}", mentions[0].0);
    }
}

/// Article counts per priority company, read off the batch's source
/// grouping. Keeps the top three companies with any coverage; ties stay
/// in roster order.
pub fn priority_mentions(articles: &[Article]) -> Vec<(&'static str, usize)> {
    let groups = group_by_source(articles);
    let mut mentions: Vec<(&'static str, usize)> = PRIORITY_COMPANIES
        .iter()
        .filter_map(|&company| {
            groups
                .iter()
                .find(|(source, _)| *source == company)
                .map(|(_, group)| (company, group.len()))
        })
        .collect();

    mentions.sort_by(|a, b| b.1.cmp(&a.1));
    mentions.truncate(DIALOG_TOP_COMPANIES);
    mentions
}
