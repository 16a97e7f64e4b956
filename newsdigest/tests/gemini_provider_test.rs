use mockito::Matcher;
use newsdigest::llm::gemini::GeminiProvider;
use newsdigest::llm::{CompletionError, CompletionProvider, CompletionRequest};
use std::time::Duration;

const PATH: &str = "/models/gemini-2.5-flash:generateContent";

fn provider(url: String) -> GeminiProvider {
    GeminiProvider::new(url, "fake-api-key", "gemini-2.5-flash", Duration::from_secs(5))
        .expect("provider")
}

fn request(prompt: &str) -> CompletionRequest {
    CompletionRequest {
        prompt: prompt.to_string(),
        max_output_tokens: Some(256),
    }
}

#[tokio::test]
async fn test_gemini_provider_with_mock() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", PATH)
        .match_header("x-goog-api-key", "fake-api-key")
        .match_body(Matcher::PartialJsonString(
            r#"{
                "contents": [{"role": "user", "parts": [{"text": "Test prompt"}]}],
                "generationConfig": {"maxOutputTokens": 256}
            }"#
            .to_string(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "candidates": [{
                    "content": {
                        "role": "model",
                        "parts": [{"text": "摘要：費率上升。"}, {"text": "\n影響：成本增加。"}]
                    },
                    "finishReason": "STOP"
                }],
                "usageMetadata": {"promptTokenCount": 10, "candidatesTokenCount": 5, "totalTokenCount": 15}
            }"#,
        )
        .create_async()
        .await;

    let text = provider(server.url())
        .generate(request("Test prompt"))
        .await
        .expect("completion");

    assert_eq!(text, "摘要：費率上升。\n影響：成本增加。");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_gemini_provider_quota_error_is_classified() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", PATH)
        .with_status(429)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"error": {"code": 429, "message": "Resource has been exhausted", "status": "RESOURCE_EXHAUSTED"}}"#,
        )
        .create_async()
        .await;

    let err = provider(server.url())
        .generate(request("Test"))
        .await
        .unwrap_err();

    match &err {
        CompletionError::Api { code, status, message } => {
            assert_eq!(*code, 429);
            assert_eq!(status.as_deref(), Some("RESOURCE_EXHAUSTED"));
            assert_eq!(message, "Resource has been exhausted");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(err.to_string().contains("429"));

    mock.assert_async().await;
}

#[tokio::test]
async fn test_gemini_provider_non_json_error_keeps_body() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("POST", PATH)
        .with_status(503)
        .with_body("upstream overloaded")
        .create_async()
        .await;

    let err = provider(server.url())
        .generate(request("Test"))
        .await
        .unwrap_err();

    match err {
        CompletionError::Api { code, status, message } => {
            assert_eq!(code, 503);
            assert_eq!(status, None);
            assert_eq!(message, "upstream overloaded");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_gemini_provider_without_candidates_is_malformed() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("POST", PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#)
        .create_async()
        .await;

    let err = provider(server.url())
        .generate(request("Test"))
        .await
        .unwrap_err();

    assert!(matches!(err, CompletionError::Malformed(_)));
}

#[tokio::test]
async fn test_gemini_provider_timeout() {
    let mut server = mockito::Server::new_async().await;

    // Mock slow response
    let _mock = server
        .mock("POST", PATH)
        .with_status(200)
        .with_chunked_body(|w| {
            std::thread::sleep(std::time::Duration::from_secs(3));
            w.write_all(b"too late")
        })
        .create_async()
        .await;

    let provider = GeminiProvider::new(
        server.url(),
        "fake-api-key",
        "gemini-2.5-flash",
        Duration::from_secs(1),
    )
    .expect("provider");

    let err = provider.generate(request("Test")).await.unwrap_err();
    assert!(matches!(err, CompletionError::Transport(_)));
}
