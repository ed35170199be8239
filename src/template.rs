use crate::types::Article;
use chrono::Utc;

/// Articles shown in the newsletter body below the summary.
const MAX_LISTED_ARTICLES: usize = 10;

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Render the HTML newsletter: branded header, the AI summary in a
/// preformatted block, then up to ten article cards with source and
/// publication time.
pub fn newsletter_html(summary: &str, articles: &[Article]) -> String {
    let date = Utc::now().format("%B %d, %Y").to_string();

    let mut cards = String::new();
    for article in articles.iter().take(MAX_LISTED_ARTICLES) {
        let published = article.published.format("%B %d, %Y at %H:%M");
        cards.push_str(&format!(
            r#"            <div class="article">
                <div class="article-title"><a href="{link}">{title}</a></div>
                <div class="article-meta">{source} &bull; {published}</div>
                <div class="article-link"><a href="{link}">Read more &rarr;</a></div>
            </div>
"#,
            link = escape_html(&article.link),
            title = escape_html(&article.title),
            source = escape_html(&article.source),
            published = published,
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>NewsBrief - Tech Newsletter</title>
    <style>
        body {{
            font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
            line-height: 1.6;
            color: #333;
            max-width: 800px;
            margin: 0 auto;
            padding: 20px;
            background-color: #f4f4f4;
        }}
        .container {{
            background-color: #ffffff;
            border-radius: 10px;
            overflow: hidden;
            box-shadow: 0 4px 6px rgba(0, 0, 0, 0.1);
        }}
        .header {{
            background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
            color: white;
            padding: 30px;
            text-align: center;
        }}
        .header h1 {{
            margin: 0;
            font-size: 28px;
        }}
        .header .date {{
            margin-top: 8px;
            opacity: 0.9;
            font-size: 14px;
        }}
        .content {{
            padding: 30px;
        }}
        .summary-content pre {{
            white-space: pre-wrap;
            font-family: inherit;
            background-color: #f8f9fa;
            border-left: 4px solid #667eea;
            border-radius: 4px;
            padding: 20px;
        }}
        .articles h2 {{
            color: #667eea;
            border-bottom: 2px solid #eee;
            padding-bottom: 8px;
        }}
        .article {{
            border-bottom: 1px solid #eee;
            padding: 15px 0;
        }}
        .article-title a {{
            color: #333;
            font-weight: 600;
            text-decoration: none;
        }}
        .article-title a:hover {{
            color: #667eea;
        }}
        .article-meta {{
            color: #888;
            font-size: 13px;
            margin: 4px 0;
        }}
        .article-link a {{
            color: #667eea;
            font-size: 14px;
            text-decoration: none;
        }}
        .footer {{
            background-color: #f8f9fa;
            color: #888;
            text-align: center;
            font-size: 13px;
            padding: 20px;
        }}
    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>&#129302; NewsBrief</h1>
            <div class="date">{date}</div>
        </div>
        <div class="content">
            <div class="summary-content">
                <pre>{summary}</pre>
            </div>
            <div class="articles">
                <h2>&#128240; Latest Articles</h2>
{cards}            </div>
        </div>
        <div class="footer">
            Generated by NewsBrief &bull; Automated tech news intelligence
        </div>
    </div>
</body>
</html>
"#,
        date = date,
        summary = escape_html(summary),
        cards = cards,
    )
}
