use crate::config::AppConfig;
use crate::fetcher::is_transient;
use crate::types::{Article, NewsbriefError, Result};
use async_trait::async_trait;
use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info, warn};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const REQUEST_ATTEMPTS: u32 = 2;
const RETRY_DELAY_SECONDS: u64 = 2;
const MAX_RETRY_DELAY_SECONDS: u64 = 10;

/// Trait for the summarization collaborator.
///
/// Implementations return the digest text on success, or an explanatory
/// text (not an error) for the known soft-failure classes: safety
/// blocks, quota and rate limits, bad API keys. Anything else is a real
/// error and propagates.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn analyze_articles(&self, articles: &[Article]) -> Result<String>;
}

/// Outcome of one summarization call, resolved once at the collaborator
/// boundary so downstream code never inspects response shape.
#[derive(Debug)]
pub enum SummaryOutcome {
    Success(String),
    Blocked(FinishReason),
    Failed(FailureKind),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    Safety,
    Recitation,
    MaxTokens,
    Other(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Quota,
    ApiKey,
}

impl FinishReason {
    pub fn from_code(code: &str) -> Self {
        match code {
            "STOP" => FinishReason::Stop,
            "SAFETY" => FinishReason::Safety,
            "RECITATION" => FinishReason::Recitation,
            "MAX_TOKENS" => FinishReason::MaxTokens,
            other => FinishReason::Other(other.to_string()),
        }
    }

    pub fn explanation(&self) -> String {
        match self {
            FinishReason::Stop => "STOP - normal completion, but the response was empty".to_string(),
            FinishReason::Safety => {
                "SAFETY - content filtered by safety settings. Try softening the prompt language."
                    .to_string()
            }
            FinishReason::Recitation => {
                "RECITATION - content blocked due to recitation. Try rephrasing the prompt."
                    .to_string()
            }
            FinishReason::MaxTokens => {
                "MAX_TOKENS - response too long. Increase the output token budget.".to_string()
            }
            FinishReason::Other(code) => format!("{} - unknown blocking reason", code),
        }
    }
}

impl FailureKind {
    pub fn message(&self) -> String {
        match self {
            FailureKind::Quota => "API quota or rate limit exceeded.\n\n\
                 Wait a few minutes and retry, or reduce the number of articles \
                 sent for analysis."
                .to_string(),
            FailureKind::ApiKey => {
                "API key error.\n\nCheck that GOOGLE_API_KEY is set to a valid key.".to_string()
            }
        }
    }
}

impl SummaryOutcome {
    /// Resolve a raw API response into a tagged outcome. An empty
    /// candidate list or a candidate with no text counts as blocked.
    pub fn from_response(response: GenerateResponse) -> Self {
        let candidate = match response.candidates.into_iter().next() {
            Some(c) => c,
            None => return SummaryOutcome::Blocked(FinishReason::Other("UNKNOWN".to_string())),
        };

        let text = candidate
            .content
            .parts
            .iter()
            .map(|p| p.text.as_str())
            .collect::<String>();

        if text.trim().is_empty() {
            let reason = candidate
                .finish_reason
                .as_deref()
                .map(FinishReason::from_code)
                .unwrap_or_else(|| FinishReason::Other("UNKNOWN".to_string()));
            return SummaryOutcome::Blocked(reason);
        }

        SummaryOutcome::Success(text.trim().to_string())
    }

    /// The workflow-facing text: the digest on success, an explanation
    /// the reader can act on otherwise.
    pub fn into_message(self) -> String {
        match self {
            SummaryOutcome::Success(text) => text,
            SummaryOutcome::Blocked(reason) => format!(
                "AI response was blocked.\nReason: {}\n\n\
                 Possible causes:\n\
                 - API quota exceeded\n\
                 - content safety filters triggered\n\
                 - rate limit reached\n\n\
                 Try reducing the number of articles sent for analysis, or retry later.",
                reason.explanation()
            ),
            SummaryOutcome::Failed(kind) => kind.message(),
        }
    }
}

// Wire types for the generateContent endpoint.

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<RequestContent>,
    generation_config: GenerationConfig,
    safety_settings: Vec<SafetySetting>,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct SafetySetting {
    category: String,
    threshold: String,
}

#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

fn safety_settings() -> Vec<SafetySetting> {
    [
        "HARM_CATEGORY_HARASSMENT",
        "HARM_CATEGORY_HATE_SPEECH",
        "HARM_CATEGORY_SEXUALLY_EXPLICIT",
        "HARM_CATEGORY_DANGEROUS_CONTENT",
    ]
    .iter()
    .map(|category| SafetySetting {
        category: category.to_string(),
        threshold: "BLOCK_NONE".to_string(),
    })
    .collect()
}

pub struct GeminiSummarizer {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    max_ai: usize,
    ai_tokens: u32,
    ai_temp: f32,
    days: i64,
}

impl GeminiSummarizer {
    pub fn new(config: &AppConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: config.google_api_key.clone(),
            model: config.model.clone(),
            max_ai: config.max_ai,
            ai_tokens: config.ai_tokens,
            ai_temp: config.ai_temp,
            days: config.days_back(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn generate(&self, prompt: &str) -> Result<SummaryOutcome> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let request = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: self.ai_tokens,
                temperature: self.ai_temp,
            },
            safety_settings: safety_settings(),
        };

        let mut backoff = ExponentialBackoff {
            current_interval: Duration::from_secs(RETRY_DELAY_SECONDS),
            initial_interval: Duration::from_secs(RETRY_DELAY_SECONDS),
            max_interval: Duration::from_secs(MAX_RETRY_DELAY_SECONDS),
            multiplier: 2.0,
            max_elapsed_time: None,
            ..Default::default()
        };

        let attempts = REQUEST_ATTEMPTS.max(1);
        let mut attempt = 0;
        let response = loop {
            attempt += 1;
            match self.client.post(&url).json(&request).send().await {
                Ok(response) => break response,
                Err(e) if is_transient(&e) && attempt < attempts => {
                    warn!(
                        "Summarization request attempt {}/{} failed: {}",
                        attempt, attempts, e
                    );
                    if let Some(delay) = backoff.next_backoff() {
                        tokio::time::sleep(delay).await;
                    }
                }
                Err(e) => return Err(NewsbriefError::Http(e)),
            }
        };
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if let Some(kind) = classify_api_failure(status, &body) {
                warn!("Summarization API failure ({}): {}", status, kind.message());
                return Ok(SummaryOutcome::Failed(kind));
            }
            return Err(NewsbriefError::Summarization(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        let body = response.text().await?;
        let parsed: GenerateResponse = serde_json::from_str(&body)?;
        Ok(SummaryOutcome::from_response(parsed))
    }
}

#[async_trait]
impl Summarizer for GeminiSummarizer {
    async fn analyze_articles(&self, articles: &[Article]) -> Result<String> {
        if articles.is_empty() {
            return Ok("No articles available for analysis.".to_string());
        }

        info!(
            "Generating AI summary with Gemini ({} of {} articles)",
            articles.len().min(self.max_ai),
            articles.len()
        );

        let prompt = build_prompt(articles, self.days, self.max_ai);
        let outcome = self.generate(&prompt).await?;

        match &outcome {
            SummaryOutcome::Success(text) => {
                info!("AI summary generated ({} chars)", text.len());
            }
            SummaryOutcome::Blocked(reason) => {
                warn!("AI response blocked: {}", reason.explanation());
            }
            SummaryOutcome::Failed(kind) => {
                error!("AI request failed: {:?}", kind);
            }
        }

        Ok(outcome.into_message())
    }
}

/// Classify an HTTP-level failure into one of the known soft-failure
/// classes, or None if it should propagate as a real error.
fn classify_api_failure(status: StatusCode, body: &str) -> Option<FailureKind> {
    let lower = body.to_lowercase();
    if status == StatusCode::TOO_MANY_REQUESTS || lower.contains("quota") || lower.contains("limit")
    {
        return Some(FailureKind::Quota);
    }
    if status == StatusCode::FORBIDDEN || (lower.contains("api") && lower.contains("key")) {
        return Some(FailureKind::ApiKey);
    }
    None
}

/// Build the summarization prompt: reader persona, priority companies,
/// the fixed section headings, and the article list capped at `max_ai`.
pub fn build_prompt(articles: &[Article], days: i64, max_ai: usize) -> String {
    let articles_text = articles
        .iter()
        .take(max_ai)
        .map(|a| format!("- {}: {}", a.source, a.title))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "I am a software engineer at NVIDIA, interested in the world of technology and networking details, AI, etc.\n\
I would be happy to receive an email update once a week on the updates at the leading technology companies -\n\
everything you need to know to stay up to date with what is happening in the world of technology.\n\
Be as concise as possible, but also include the details that are important to me.\n\
I am interested in the following companies: NVIDIA, Intel, AMD, Qualcomm, Broadcom, and OpenAI.\n\
Create a comprehensive tech news summary from the last {days} days, with special focus on these priority companies: NVIDIA, Intel, AMD, Qualcomm, Broadcom, and OpenAI.\n\
\n\
Structure the response as follows:\n\
\n\
**🚀 NEW TECHNOLOGIES & PRODUCTS:**\n\
- Breakthrough technologies and innovative products\n\
- AI/ML developments and applications\n\
- Semiconductor advances and new architectures\n\
- Networking and infrastructure innovations\n\
- [Include specific product launches, technical specifications, and competitive advantages]\n\
\n\
**📈 BUSINESS & CORPORATE NEWS:**\n\
- CEO changes and executive movements\n\
- Major partnerships and acquisitions\n\
- Legal proceedings and intellectual property matters\n\
- Regulatory developments and policy changes\n\
- [Include specific names, dates, and business implications]\n\
\n\
**💰 CAPITAL MARKETS & STOCKS:**\n\
- Stock price movements and market analysis\n\
- Earnings reports and financial performance\n\
- Investment announcements and funding rounds\n\
- Market cap changes and valuation updates\n\
- [Include specific percentages, reasons for movements, and market context]\n\
\n\
**🎯 PRIORITY COMPANY UPDATES:**\n\
- **NVIDIA**: [GPU innovations, AI datacenter news, automotive, gaming, professional visualization]\n\
- **Intel**: [Processor launches, foundry business, AI chips, competition analysis]\n\
- **AMD**: [CPU/GPU competition, data center wins, market share changes]\n\
- **Qualcomm**: [Mobile chips, automotive partnerships, 5G developments]\n\
- **Broadcom**: [Networking infrastructure, AI hardware, acquisition activity]\n\
- **OpenAI**: [Model releases, partnerships, business model changes, competition]\n\
\n\
**🔍 MARKET ANALYSIS:**\n\
- **NVIDIA Product Portfolio & Market Position:**\n\
- Gaming GPUs: compared to AMD Radeon, Intel Arc\n\
- Data Center GPUs: compared to AMD MI series, Intel Gaudi\n\
- AI/ML Platforms: compared to Google TPU, AWS Trainium\n\
- Automotive: compared to Mobileye, Qualcomm Snapdragon\n\
- Professional Visualization: compared to AMD Radeon Pro\n\
- **Market Leadership Overview**: Industry positioning by segment\n\
- **Technology Roadmaps**: Upcoming product launches and market trends\n\
\n\
**🌍 INDUSTRY TRENDS & ANALYSIS:**\n\
- AI/ML Developments: [Model advances, training costs, inference optimization]\n\
- Semiconductor Industry: [Supply chain, manufacturing advances, geopolitical factors]\n\
- Data Center Evolution: [Cloud computing, edge computing, sustainability]\n\
- Automotive Technology: [Autonomous driving, electric vehicles, connectivity]\n\
\n\
**🌐 REGULATORY & POLICY:**\n\
- International Trade: [Export controls, investment policies]\n\
- Government AI Policies: [Regulation, safety standards]\n\
- Supply Chain: [Semiconductor manufacturing, materials sourcing]\n\
\n\
**📊 WEEKLY INTELLIGENCE BRIEF:**\n\
- Key metrics and performance indicators\n\
- Competitive positioning changes\n\
- Strategic partnership announcements\n\
- Technology adoption trends\n\
- Market sentiment and analyst opinions\n\
\n\
News articles:\n\
{articles_text}\n\
\n\
Structured Summary:"
    )
}
