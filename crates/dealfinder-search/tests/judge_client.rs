//! Integration tests for `ChatCompletionsJudge` using wiremock HTTP mocks.

use dealfinder_search::{ChatCompletionsJudge, JudgeError, TextJudge};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_judge(base_url: &str) -> ChatCompletionsJudge {
    ChatCompletionsJudge::new("pplx-test", base_url, "sonar", 5, "dealfinder-test/0.1")
        .expect("judge construction should not fail")
}

#[tokio::test]
async fn complete_posts_prompt_and_returns_first_choice() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer pplx-test"))
        .and(body_partial_json(json!({
            "model": "sonar",
            "messages": [{ "role": "user", "content": "filter these" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [
                { "message": { "role": "assistant", "content": "```json\n[]\n```" } }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = test_judge(&server.uri())
        .complete("filter these", 0.2)
        .await
        .expect("completion should succeed");
    assert_eq!(reply, "```json\n[]\n```");
}

#[tokio::test]
async fn server_error_is_unexpected_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = test_judge(&server.uri())
        .complete("filter these", 0.2)
        .await
        .expect_err("503 should fail");
    assert!(matches!(err, JudgeError::UnexpectedStatus { status: 503 }));
}

#[tokio::test]
async fn empty_choices_is_missing_content() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let err = test_judge(&server.uri())
        .complete("filter these", 0.2)
        .await
        .expect_err("no choices should fail");
    assert!(matches!(err, JudgeError::MissingContent));
}

#[tokio::test]
async fn malformed_body_is_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = test_judge(&server.uri())
        .complete("filter these", 0.2)
        .await
        .expect_err("bad body should fail");
    assert!(matches!(err, JudgeError::Deserialize(_)));
}
