//! Chat-completion categorizer against a mock endpoint
//!
//! 1. Successful categorization with request shape and usage accounting
//! 2. Invalid JSON in a 200 response is a parse error
//! 3. Non-success status is an API error
//! 4. Unreachable endpoint is a transport error
//! 5. Validation and cancellation never reach the network
//! 6. Cancellation abandons a request already in flight

use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};

use logger_redacted::{PiiRedactor, RedactionConfig};
use mockito::{Matcher, Server};
use note_categorizer::llm::{categorize_until, ChatCompletionCategorizer, LlmCategorizer};
use note_categorizer::*;
use serde_json::json;

const PATH: &str = "/v1/chat/completions";
const TRANSCRIPTION: &str = "Patient reports a throbbing headache since yesterday. Assessment is migraine.";

fn config(base_url: &str) -> LlmConfig {
    LlmConfig {
        api_url: format!("{base_url}{PATH}"),
        api_key: Some("test-key".to_string()),
        model: "gpt-4o-mini".to_string(),
        request_timeout_secs: 5,
    }
}

fn template() -> Template {
    Template::new("visit", "Visit")
        .with_section(TemplateSection::new("symptoms", "Symptoms", SectionType::Symptoms))
        .with_section(TemplateSection::new("assessment", "Assessment", SectionType::Diagnosis))
}

fn completion(content: &str) -> String {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
    .to_string()
}

// ============================================================================
// Success path
// ============================================================================

#[tokio::test]
async fn test_successful_categorization() {
    let mut server = Server::new_async().await;
    let content = json!({
        "categorizations": [
            {"sectionId": "symptoms", "content": "Throbbing headache since yesterday", "confidence": 0.9},
            {
                "sectionId": "assessment",
                "content": "Migraine",
                "confidence": 0.85,
                "icd10Codes": [{"code": "G43.909", "description": "Migraine, unspecified"}]
            }
        ],
        "summary": "Migraine presentation"
    })
    .to_string();

    let mock = server
        .mock("POST", PATH)
        .match_header("authorization", "Bearer test-key")
        .match_body(Matcher::PartialJson(json!({
            "model": "gpt-4o-mini",
            "max_tokens": 2000
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion(&content))
        .create_async()
        .await;

    let usage = Arc::new(InMemoryUsageTracker::new());
    let categorizer = ChatCompletionCategorizer::new(&config(&server.url()), usage.clone()).unwrap();

    let response = categorizer.categorize(TRANSCRIPTION, &template()).await.unwrap();

    mock.assert_async().await;
    assert_eq!(response.summary, "Migraine presentation");
    assert_eq!(response.categorizations.len(), 2);
    assert_eq!(
        response.categorizations[1].icd10_codes.as_ref().unwrap()[0].code,
        "G43.909"
    );

    assert_eq!(usage.calls(), 1);
    assert_eq!(usage.characters(), TRANSCRIPTION.chars().count() as u64);
    assert_eq!(categorizer.model(), "gpt-4o-mini");
}

#[tokio::test]
async fn test_prompt_carries_transcription_and_sections() {
    let mut server = Server::new_async().await;
    let content = json!({"categorizations": [], "summary": ""}).to_string();

    let mock = server
        .mock("POST", PATH)
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex("throbbing headache since yesterday".to_string()),
            Matcher::Regex("assessment".to_string()),
        ]))
        .with_status(200)
        .with_body(completion(&content))
        .create_async()
        .await;

    let categorizer =
        ChatCompletionCategorizer::new(&config(&server.url()), Arc::new(NoopUsageTracker)).unwrap();
    let response = categorizer.categorize(TRANSCRIPTION, &template()).await.unwrap();

    mock.assert_async().await;
    assert!(response.categorizations.is_empty());
}

#[tokio::test]
async fn test_out_of_range_confidence_is_clamped() {
    let mut server = Server::new_async().await;
    let content = json!({
        "categorizations": [
            {"sectionId": "symptoms", "content": "Headache", "confidence": 1.7},
            {"sectionId": "assessment", "content": "Migraine", "confidence": -0.3}
        ],
        "summary": "x"
    })
    .to_string();

    let mock = server
        .mock("POST", PATH)
        .with_status(200)
        .with_body(completion(&content))
        .create_async()
        .await;

    let categorizer =
        ChatCompletionCategorizer::new(&config(&server.url()), Arc::new(NoopUsageTracker)).unwrap();
    let response = categorizer.categorize(TRANSCRIPTION, &template()).await.unwrap();

    mock.assert_async().await;
    assert_eq!(response.categorizations[0].confidence, 1.0);
    assert_eq!(response.categorizations[1].confidence, 0.0);
}

// ============================================================================
// Failure categories
// ============================================================================

#[tokio::test]
async fn test_invalid_json_body_is_parse_error() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("this is not json {")
        .create_async()
        .await;

    let usage = Arc::new(InMemoryUsageTracker::new());
    let categorizer = ChatCompletionCategorizer::new(&config(&server.url()), usage.clone()).unwrap();

    let result = categorizer.categorize(TRANSCRIPTION, &template()).await;

    mock.assert_async().await;
    assert!(matches!(result, Err(CategorizerError::Parse(_))));
    assert_eq!(usage.calls(), 0);
}

#[tokio::test]
async fn test_model_content_outside_contract_is_parse_error() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", PATH)
        .with_status(200)
        .with_body(completion("```json\n{\"categorizations\": []}\n```"))
        .create_async()
        .await;

    let categorizer =
        ChatCompletionCategorizer::new(&config(&server.url()), Arc::new(NoopUsageTracker)).unwrap();
    let result = categorizer.categorize(TRANSCRIPTION, &template()).await;

    mock.assert_async().await;
    let err = result.unwrap_err();
    assert_eq!(err.kind(), "parse");
    assert!(err.is_fallback_eligible());
}

#[tokio::test]
async fn test_error_status_is_api_error() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", PATH)
        .with_status(503)
        .with_body(r#"{"error": {"message": "upstream overloaded"}}"#)
        .create_async()
        .await;

    let categorizer =
        ChatCompletionCategorizer::new(&config(&server.url()), Arc::new(NoopUsageTracker)).unwrap();
    let result = categorizer.categorize(TRANSCRIPTION, &template()).await;

    mock.assert_async().await;
    match result {
        Err(CategorizerError::Api { status, message }) => {
            assert_eq!(status, 503);
            assert!(message.contains("upstream overloaded"));
        }
        other => panic!("expected API error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_error_body_redaction_follows_redactor() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", PATH)
        .with_status(429)
        .with_body("Quota exceeded for jane.doe@example.com")
        .expect(2)
        .create_async()
        .await;

    let redacting =
        ChatCompletionCategorizer::new(&config(&server.url()), Arc::new(NoopUsageTracker)).unwrap();
    let verbatim = ChatCompletionCategorizer::new(&config(&server.url()), Arc::new(NoopUsageTracker))
        .unwrap()
        .with_redactor(PiiRedactor::new(RedactionConfig::disabled()));

    let redacted = redacting.categorize(TRANSCRIPTION, &template()).await.unwrap_err();
    let raw = verbatim.categorize(TRANSCRIPTION, &template()).await.unwrap_err();

    mock.assert_async().await;
    assert_eq!(redacted.to_string(), "API error (429): Quota exceeded for [EMAIL]");
    assert_eq!(raw.to_string(), "API error (429): Quota exceeded for jane.doe@example.com");
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport_error() {
    let categorizer = ChatCompletionCategorizer::new(&config("http://127.0.0.1:1"), Arc::new(NoopUsageTracker)).unwrap();

    let result = categorizer.categorize(TRANSCRIPTION, &template()).await;

    assert!(matches!(result, Err(CategorizerError::Transport(_))));
}

// ============================================================================
// Requests that never reach the network
// ============================================================================

#[tokio::test]
async fn test_empty_transcription_is_rejected_locally() {
    let mut server = Server::new_async().await;
    let mock = server.mock("POST", PATH).expect(0).create_async().await;

    let categorizer =
        ChatCompletionCategorizer::new(&config(&server.url()), Arc::new(NoopUsageTracker)).unwrap();
    let result = categorizer.categorize("   ", &template()).await;

    mock.assert_async().await;
    assert!(matches!(result, Err(CategorizerError::Validation(_))));
}

#[tokio::test]
async fn test_cancelled_before_request() {
    let mut server = Server::new_async().await;
    let mock = server.mock("POST", PATH).expect(0).create_async().await;

    let categorizer =
        ChatCompletionCategorizer::new(&config(&server.url()), Arc::new(NoopUsageTracker)).unwrap();
    let result = categorize_until(&categorizer, TRANSCRIPTION, &template(), std::future::ready(())).await;

    mock.assert_async().await;
    assert!(matches!(result, Err(CategorizerError::Cancelled)));
}

// ============================================================================
// In-flight cancellation
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_cancel_while_response_pending() {
    let mut server = Server::new_async().await;
    let content = json!({"categorizations": [], "summary": "late"}).to_string();
    let body = completion(&content);
    let _mock = server
        .mock("POST", PATH)
        .with_status(200)
        .with_chunked_body(move |writer| {
            std::thread::sleep(Duration::from_secs(3));
            writer.write_all(body.as_bytes())
        })
        .create_async()
        .await;

    let usage = Arc::new(InMemoryUsageTracker::new());
    let categorizer = ChatCompletionCategorizer::new(&config(&server.url()), usage.clone()).unwrap();

    let started = Instant::now();
    let result = categorize_until(
        &categorizer,
        TRANSCRIPTION,
        &template(),
        tokio::time::sleep(Duration::from_millis(200)),
    )
    .await;

    assert!(matches!(result, Err(CategorizerError::Cancelled)));
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(usage.calls(), 0);
}

#[test]
fn test_missing_api_key_is_configuration_error() {
    let config = LlmConfig {
        api_key: None,
        ..config("http://127.0.0.1:1")
    };

    let result = ChatCompletionCategorizer::new(&config, Arc::new(NoopUsageTracker));
    assert!(matches!(result, Err(CategorizerError::Configuration(_))));
}
