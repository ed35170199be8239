mod common;

use common::{article, test_config};
use newsbrief::{
    build_prompt, FinishReason, GenerateResponse, GeminiSummarizer, SummaryOutcome, Summarizer,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::info;

fn parse_response(json: &str) -> GenerateResponse {
    serde_json::from_str(json).unwrap()
}

/// Local API stub: answers every request with a canned status line and
/// JSON body. Returns the base URL to point the summarizer at.
async fn spawn_api_stub(status_line: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            if read_request(&mut socket).await.is_ok() {
                let response = format!(
                    "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    status_line,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        }
    });
    format!("http://127.0.0.1:{}/v1beta", port)
}

/// Drain one HTTP request: headers, then the declared body length.
async fn read_request(socket: &mut TcpStream) -> std::io::Result<()> {
    let mut request = Vec::new();
    let mut chunk = [0u8; 1024];
    let header_end = loop {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        request.extend_from_slice(&chunk[..n]);
        if let Some(pos) = request.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let headers = String::from_utf8_lossy(&request[..header_end]).to_lowercase();
    let content_length = headers
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(0);
    while request.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        request.extend_from_slice(&chunk[..n]);
    }
    Ok(())
}

#[test]
fn test_empty_candidate_list_resolves_to_blocked() {
    let response = parse_response(r#"{"candidates": []}"#);

    let outcome = SummaryOutcome::from_response(response);
    assert!(
        matches!(outcome, SummaryOutcome::Blocked(_)),
        "No candidates should resolve to a blocked outcome"
    );

    let message = outcome.into_message();
    assert!(
        message.contains("blocked"),
        "Blocked outcome should explain itself instead of erroring: {}",
        message
    );
}

#[test]
fn test_safety_block_names_the_reason() {
    let response = parse_response(
        r#"{"candidates": [{"content": {"parts": [], "role": "model"}, "finishReason": "SAFETY"}]}"#,
    );

    let outcome = SummaryOutcome::from_response(response);
    assert!(matches!(
        outcome,
        SummaryOutcome::Blocked(FinishReason::Safety)
    ));
    assert!(outcome.into_message().contains("SAFETY"));
}

#[test]
fn test_truncated_candidate_without_content_is_blocked() {
    let response = parse_response(r#"{"candidates": [{"finishReason": "MAX_TOKENS"}]}"#);

    let outcome = SummaryOutcome::from_response(response);
    assert!(matches!(
        outcome,
        SummaryOutcome::Blocked(FinishReason::MaxTokens)
    ));
    assert!(outcome.into_message().contains("MAX_TOKENS"));
}

#[test]
fn test_successful_response_extracts_trimmed_text() {
    let response = parse_response(
        r#"{"candidates": [{"content": {"parts": [{"text": "  Weekly digest body  "}], "role": "model"}, "finishReason": "STOP"}]}"#,
    );

    let outcome = SummaryOutcome::from_response(response);
    match outcome {
        SummaryOutcome::Success(text) => assert_eq!(text, "Weekly digest body"),
        other => panic!("Expected success, got {:?}", other),
    }
}

#[test]
fn test_finish_reason_codes_round_trip() {
    assert_eq!(FinishReason::from_code("STOP"), FinishReason::Stop);
    assert_eq!(FinishReason::from_code("SAFETY"), FinishReason::Safety);
    assert_eq!(FinishReason::from_code("RECITATION"), FinishReason::Recitation);
    assert_eq!(FinishReason::from_code("MAX_TOKENS"), FinishReason::MaxTokens);
    assert_eq!(
        FinishReason::from_code("BLOCKLIST"),
        FinishReason::Other("BLOCKLIST".to_string()),
        "Unrecognized codes should be preserved verbatim"
    );
}

#[tokio::test]
async fn test_empty_batch_short_circuits_before_any_request() {
    // Initialize tracing
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .try_init();

    let summarizer = GeminiSummarizer::new(&test_config());
    let result = summarizer.analyze_articles(&[]).await.unwrap();

    info!("Empty batch response: {}", result);
    assert_eq!(result, "No articles available for analysis.");
}

#[tokio::test]
async fn test_quota_exhaustion_resolves_to_explanatory_text() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .try_init();

    let base_url = spawn_api_stub(
        "429 Too Many Requests",
        r#"{"error": {"code": 429, "message": "Resource has been exhausted (e.g. check quota).", "status": "RESOURCE_EXHAUSTED"}}"#,
    )
    .await;

    let summarizer = GeminiSummarizer::new(&test_config()).with_base_url(base_url);
    let articles = vec![article("TechCrunch", "A story", 5)];

    let result = summarizer.analyze_articles(&articles).await.unwrap();

    info!("Quota response: {}", result);
    assert!(
        result.contains("quota or rate limit"),
        "Quota exhaustion should come back as explanatory text: {}",
        result
    );
}

#[tokio::test]
async fn test_bad_api_key_resolves_to_explanatory_text() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .try_init();

    let base_url = spawn_api_stub(
        "403 Forbidden",
        r#"{"error": {"code": 403, "message": "API key not valid. Please pass a valid API key.", "status": "PERMISSION_DENIED"}}"#,
    )
    .await;

    let summarizer = GeminiSummarizer::new(&test_config()).with_base_url(base_url);
    let articles = vec![article("TechCrunch", "A story", 5)];

    let result = summarizer.analyze_articles(&articles).await.unwrap();

    info!("Key failure response: {}", result);
    assert!(
        result.contains("GOOGLE_API_KEY"),
        "A key failure should name the setting to fix: {}",
        result
    );
}

#[tokio::test]
async fn test_successful_generation_extracts_digest_over_http() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .try_init();

    let base_url = spawn_api_stub(
        "200 OK",
        r#"{"candidates": [{"content": {"parts": [{"text": "Weekly digest body"}], "role": "model"}, "finishReason": "STOP"}]}"#,
    )
    .await;

    let summarizer = GeminiSummarizer::new(&test_config()).with_base_url(base_url);
    let articles = vec![article("NVIDIA", "GPU news", 3)];

    let result = summarizer.analyze_articles(&articles).await.unwrap();

    assert_eq!(result, "Weekly digest body");
}

#[test]
fn test_prompt_lists_articles_and_fixed_sections() {
    let articles: Vec<_> = (0..17)
        .map(|i| article("TechCrunch", &format!("Headline {}", i), i))
        .collect();

    let prompt = build_prompt(&articles, 5, 15);

    assert!(prompt.contains("last 5 days"), "Prompt should state the window in days");
    assert!(prompt.contains("- TechCrunch: Headline 0"));
    assert!(prompt.contains("- TechCrunch: Headline 14"));
    assert!(
        !prompt.contains("Headline 15"),
        "Prompt should cap the article list at max_ai"
    );
    assert!(prompt.contains("NVIDIA, Intel, AMD, Qualcomm, Broadcom, and OpenAI"));
    assert!(prompt.contains("PRIORITY COMPANY UPDATES"));
    assert!(prompt.contains("WEEKLY INTELLIGENCE BRIEF"));
    assert!(
        prompt.trim_end().ends_with("Structured Summary:"),
        "Prompt should end with the completion cue"
    );
}
