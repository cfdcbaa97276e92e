//! OpenAI client tests against a mocked chat-completions endpoint.

#![cfg(feature = "openai")]

use callfacts::llm::{LLMClientFactory, LLMClientFactoryTrait, Provider};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============= Helper Functions =============

fn mock_completion(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "created": 1_704_067_200,
        "model": "gpt-4",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 10, "completion_tokens": 12, "total_tokens": 22 }
    })
}

fn provider_for(server: &MockServer) -> Provider {
    Provider::OpenAI {
        api_key: "sk-test".to_string(),
        api_base: server.uri(),
        model: "gpt-4".to_string(),
    }
}

// ============= Tests =============

#[tokio::test]
async fn test_generate_sends_single_user_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-4",
            "n": 1,
            "messages": [{ "role": "user", "content": "What did we decide?" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(mock_completion(
            "The team has decided to ship on Friday",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let client = provider_for(&server).create_client().await.unwrap();
    assert_eq!(client.model_name(), "gpt-4");

    let completion = client.generate("What did we decide?").await.unwrap();
    assert_eq!(completion, "The team has decided to ship on Friday");
}

#[tokio::test]
async fn test_factory_client_sends_configured_model() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({ "model": "gpt-4o-mini" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(mock_completion("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let factory = LLMClientFactory::new(Provider::OpenAI {
        api_key: "sk-test".to_string(),
        api_base: server.uri(),
        model: "gpt-4o-mini".to_string(),
    });
    let client = factory.create_default().await.unwrap();

    assert_eq!(client.model_name(), "gpt-4o-mini");
    assert_eq!(client.generate("What did we decide?").await.unwrap(), "ok");
}

#[tokio::test]
async fn test_unauthorized_is_llm_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {
                "message": "Incorrect API key provided",
                "type": "invalid_request_error",
                "param": null,
                "code": "invalid_api_key"
            }
        })))
        .mount(&server)
        .await;

    let client = provider_for(&server).create_client().await.unwrap();
    let err = client.generate("What did we decide?").await.unwrap_err();

    assert!(matches!(err, callfacts::AppError::LLM(_)));
    assert!(err.to_string().contains("Incorrect API key"));
}

#[tokio::test]
async fn test_empty_choices_is_llm_error() {
    let server = MockServer::start().await;

    let mut body = mock_completion("");
    body["choices"] = json!([]);

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let client = provider_for(&server).create_client().await.unwrap();
    let err = client.generate("What did we decide?").await.unwrap_err();

    assert!(err.to_string().contains("No response"));
}
