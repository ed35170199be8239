use crate::types::Article;

/// Group a batch by source, preserving the first-occurrence order of
/// sources and the batch order of articles within each group.
pub fn group_by_source(articles: &[Article]) -> Vec<(&str, Vec<&Article>)> {
    let mut groups: Vec<(&str, Vec<&Article>)> = Vec::new();
    for article in articles {
        match groups.iter_mut().find(|(source, _)| *source == article.source) {
            Some((_, group)) => group.push(article),
            None => groups.push((article.source.as_str(), vec![article])),
        }
    }
    groups
}

/// Render the collected batch as a grouped text report: a header per
/// source with its article count, up to three titles, and an overflow
/// line for the rest. Pure, so the same batch always yields the same
/// text.
pub fn build_report(articles: &[Article], days: i64) -> String {
    if articles.is_empty() {
        return "No articles collected yet.".to_string();
    }

    let mut report = format!(
        "I've collected {} tech articles from the last {} days. Here's what I found:\n\n",
        articles.len(),
        days
    );

    for (source, group) in group_by_source(articles) {
        report.push_str(&format!("**{}** ({} articles):\n", source, group.len()));
        for article in group.iter().take(3) {
            report.push_str(&format!("- {}\n", article.title));
        }
        if group.len() > 3 {
            report.push_str(&format!("  ... and {} more articles\n", group.len() - 3));
        }
        report.push('\n');
    }

    report
}
