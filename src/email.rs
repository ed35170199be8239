use crate::config::AppConfig;
use crate::template::newsletter_html;
use crate::types::{Article, NewsbriefError, Result};
use async_trait::async_trait;
use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use chrono::Utc;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;
use tracing::{error, info, warn};

const SEND_ATTEMPTS: u32 = 2;
const SEND_RETRY_DELAY_SECONDS: u64 = 2;
const SEND_MAX_RETRY_DELAY_SECONDS: u64 = 10;
const SMTP_TIMEOUT_SECONDS: u64 = 30;

/// Trait for the outbound email collaborator. Dispatch is best-effort:
/// the return value reports whether a newsletter actually went out, and
/// a false never aborts the workflow.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_newsletter(
        &self,
        summary: &str,
        articles: &[Article],
        recipients: &[String],
    ) -> bool;
}

pub struct EmailAgent {
    enabled: bool,
    sender: String,
    password: String,
    server: String,
    port: u16,
}

impl EmailAgent {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            enabled: config.email_enabled,
            sender: config.email_user.clone(),
            password: config.email_password.clone(),
            server: config.smtp_server.clone(),
            port: config.smtp_port,
        }
    }

    async fn dispatch(
        &self,
        subject: &str,
        summary: &str,
        html: &str,
        recipients: &[&str],
    ) -> Result<()> {
        let mut builder = Message::builder()
            .from(self.sender.parse::<Mailbox>()?)
            .subject(subject);
        for recipient in recipients {
            builder = builder.to(recipient.parse::<Mailbox>()?);
        }
        // Plain part carries the bare summary for clients that skip HTML.
        let message = builder.multipart(MultiPart::alternative_plain_html(
            summary.to_string(),
            html.to_string(),
        ))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.server)?
            .port(self.port)
            .credentials(Credentials::new(self.sender.clone(), self.password.clone()))
            .timeout(Some(Duration::from_secs(SMTP_TIMEOUT_SECONDS)))
            .build();

        let mut backoff = ExponentialBackoff {
            current_interval: Duration::from_secs(SEND_RETRY_DELAY_SECONDS),
            initial_interval: Duration::from_secs(SEND_RETRY_DELAY_SECONDS),
            max_interval: Duration::from_secs(SEND_MAX_RETRY_DELAY_SECONDS),
            multiplier: 2.0,
            max_elapsed_time: None,
            ..Default::default()
        };

        let attempts = SEND_ATTEMPTS.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            match transport.send(message.clone()).await {
                Ok(_) => return Ok(()),
                Err(e) if is_retryable(&e) && attempt < attempts => {
                    warn!("SMTP send failed (attempt {}/{}): {}", attempt, attempts, e);
                    if let Some(delay) = backoff.next_backoff() {
                        tokio::time::sleep(delay).await;
                    }
                }
                Err(e) => return Err(NewsbriefError::Smtp(e)),
            }
        }
    }
}

// Timeouts, dropped connections, and 4xx replies retry; permanent
// rejections such as a refused login fail on the first attempt.
fn is_retryable(err: &lettre::transport::smtp::Error) -> bool {
    !(err.is_permanent() || err.is_client() || err.is_response() || err.is_tls())
}

#[async_trait]
impl Mailer for EmailAgent {
    async fn send_newsletter(
        &self,
        summary: &str,
        articles: &[Article],
        recipients: &[String],
    ) -> bool {
        if !self.enabled {
            info!("Email sending is disabled; skipping dispatch");
            return false;
        }

        if self.sender.is_empty() || self.password.is_empty() {
            warn!("Email credentials not configured; skipping dispatch");
            return false;
        }

        let recipients: Vec<&str> = recipients
            .iter()
            .map(|r| r.trim())
            .filter(|r| !r.is_empty())
            .collect();
        if recipients.is_empty() {
            warn!("No recipients configured; skipping dispatch");
            return false;
        }

        let subject = format!(
            "NewsBrief - Tech Newsletter {}",
            Utc::now().format("%B %d, %Y")
        );
        let html = newsletter_html(summary, articles);

        match self.dispatch(&subject, summary, &html, &recipients).await {
            Ok(()) => {
                info!("Newsletter sent to {} recipients", recipients.len());
                true
            }
            Err(e) => {
                error!("Failed to send newsletter: {}", e);
                false
            }
        }
    }
}
