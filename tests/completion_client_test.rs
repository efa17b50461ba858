//! HTTP completion client and completion-backed generators against a mock
//! OpenAI-compatible server.

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path as url_path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use topicswipe::application::services::{LlmArticleGenerator, LlmChildGenerator};
use topicswipe::application::{ArticleGenerator, ChildGenerator};
use topicswipe::domain::{NewTopic, PathEntry, TopicId};
use topicswipe::infrastructure::traits::{ChatMessage, CompletionClient};
use topicswipe::infrastructure::{ApiCompletionClient, ApiCompletionConfig, CompletionError};
use topicswipe::util::testing::init_test_setup;

fn client(server: &MockServer, max_retries: u32) -> ApiCompletionClient {
    init_test_setup();
    let config = ApiCompletionConfig {
        base_url: format!("{}/v1", server.uri()),
        model: "test-model".to_string(),
        api_key: SecretString::from("sk-test".to_string()),
        timeout: Duration::from_secs(5),
        max_retries,
    };
    ApiCompletionClient::new(config).unwrap()
}

fn reply(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{"message": {"role": "assistant", "content": content}}]
    }))
}

fn path() -> Vec<PathEntry> {
    vec![
        PathEntry {
            prompt: "Movies".into(),
            id: TopicId::root(0),
        },
        PathEntry {
            prompt: "Sci-Fi".into(),
            id: TopicId::root(0).child(0),
        },
    ]
}

#[tokio::test]
async fn given_ok_response_when_completing_then_returns_first_choice() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(url_path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({"model": "test-model"})))
        .respond_with(reply("hello"))
        .expect(1)
        .mount(&server)
        .await;

    let text = client(&server, 1)
        .complete(&[ChatMessage::user("hi")])
        .await
        .unwrap();

    assert_eq!(text, "hello");
}

#[tokio::test]
async fn given_rate_limit_when_completing_then_rate_limited_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429))
        .expect(1)
        .mount(&server)
        .await;

    let result = client(&server, 1).complete(&[ChatMessage::user("hi")]).await;

    assert!(matches!(result, Err(CompletionError::RateLimited)));
}

#[tokio::test]
async fn given_transient_failure_when_completing_then_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(reply("recovered"))
        .expect(1)
        .mount(&server)
        .await;

    let text = client(&server, 2)
        .complete(&[ChatMessage::user("hi")])
        .await
        .unwrap();

    assert_eq!(text, "recovered");
}

#[tokio::test]
async fn given_server_error_when_retries_exhausted_then_api_error_with_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("down"))
        .expect(1)
        .mount(&server)
        .await;

    let result = client(&server, 1).complete(&[ChatMessage::user("hi")]).await;

    match result {
        Err(CompletionError::Api(message)) => assert!(message.contains("503")),
        other => panic!("expected api error, got {other:?}"),
    }
}

#[tokio::test]
async fn given_unparseable_body_when_completing_then_parse_error_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .expect(1)
        .mount(&server)
        .await;

    let result = client(&server, 3).complete(&[ChatMessage::user("hi")]).await;

    assert!(matches!(result, Err(CompletionError::Parse(_))));
}

#[tokio::test]
async fn given_fenced_topics_reply_when_generating_children_then_parsed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(url_path("/v1/chat/completions"))
        .respond_with(reply(
            "```json\n{\"children\": [{\"prompt\": \"Space Opera\", \"children\": []}, {\"prompt\": \"Cyberpunk\", \"children\": []}]}\n```",
        ))
        .mount(&server)
        .await;
    let generator = LlmChildGenerator::new(Arc::new(client(&server, 1)), 2, 3);

    let topics = generator
        .generate_children("Sci-Fi", &TopicId::root(0).child(0), &path())
        .await
        .unwrap();

    assert_eq!(
        topics,
        vec![NewTopic::new("Space Opera"), NewTopic::new("Cyberpunk")]
    );
    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let user_prompt = body["messages"][1]["content"].as_str().unwrap();
    assert!(user_prompt.contains("Movies > Sci-Fi"));
}

#[tokio::test]
async fn given_markdown_reply_when_generating_article_then_returned() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(reply("# Sci-Fi\n\nSpeculative fiction."))
        .mount(&server)
        .await;
    let generator = LlmArticleGenerator::new(Arc::new(client(&server, 1)));

    let markdown = generator.generate_article(&path()).await.unwrap();

    assert!(markdown.starts_with("# Sci-Fi"));
}

#[tokio::test]
async fn given_client_error_when_completing_then_rejected_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
        .expect(1)
        .mount(&server)
        .await;

    let result = client(&server, 3).complete(&[ChatMessage::user("hi")]).await;

    match result {
        Err(CompletionError::Rejected(message)) => assert!(message.contains("401")),
        other => panic!("expected rejected error, got {other:?}"),
    }
}
