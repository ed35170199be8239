use crate::types::{Article, NewsbriefError, RawEntry, Result};
use chrono::Utc;

/// Convert a raw feed entry into a canonical article record.
///
/// Entries without a structured publish time are stamped with the
/// current UTC time, so dateless sources always appear just published.
/// Missing title or link is a per-entry failure for the caller to log
/// and skip.
pub fn normalize(source: &str, entry: RawEntry) -> Result<Article> {
    let title = entry.title.ok_or(NewsbriefError::MissingField("title"))?;
    let link = entry.link.ok_or(NewsbriefError::MissingField("link"))?;

    Ok(Article {
        source: source.to_string(),
        title,
        link,
        summary: entry.summary.unwrap_or_default(),
        published: entry.published.unwrap_or_else(Utc::now),
    })
}
