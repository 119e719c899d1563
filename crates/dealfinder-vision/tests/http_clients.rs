//! Cloudinary and Gemini clients against wiremock servers.

use std::io::Write;

use dealfinder_core::{CloudinarySettings, VisionSettings};
use dealfinder_vision::{
    CloudinaryStore, DurableImageStore, GeminiLabeler, LabelTarget, VisionError, VisionLabeler,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn cloudinary(base_url: &str) -> CloudinaryStore {
    let settings = CloudinarySettings {
        cloud_name: "demo".to_string(),
        api_key: "cloud-key".to_string(),
        api_secret: "cloud-secret".to_string(),
        base_url: base_url.to_string(),
        folder: "dealfinder".to_string(),
    };
    CloudinaryStore::new(&settings, 5, "dealfinder-test/0.1").expect("store construction")
}

fn gemini(base_url: &str) -> GeminiLabeler {
    let settings = VisionSettings {
        api_key: "gemini-key".to_string(),
        base_url: base_url.to_string(),
        model: "gemini-1.5-pro".to_string(),
    };
    GeminiLabeler::new(&settings, 5, "dealfinder-test/0.1").expect("labeler construction")
}

fn image_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"not-really-a-jpeg").unwrap();
    file
}

#[tokio::test]
async fn cloudinary_upload_returns_secure_url() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1_1/demo/image/upload"))
        .and(body_string_contains("name=\"api_key\""))
        .and(body_string_contains("cloud-key"))
        .and(body_string_contains("name=\"signature_algorithm\""))
        .and(body_string_contains("not-really-a-jpeg"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "public_id": "dealfinder/abc",
            "secure_url": "https://res.cloudinary.com/demo/image/upload/dealfinder/abc.jpg"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let file = image_file();
    let url = cloudinary(&server.uri())
        .upload(file.path(), "image/jpeg")
        .await
        .expect("upload should succeed");
    assert_eq!(
        url,
        "https://res.cloudinary.com/demo/image/upload/dealfinder/abc.jpg"
    );
}

#[tokio::test]
async fn cloudinary_error_carries_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1_1/demo/image/upload"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "message": "Invalid Signature" }
        })))
        .mount(&server)
        .await;

    let file = image_file();
    let err = cloudinary(&server.uri())
        .upload(file.path(), "image/jpeg")
        .await
        .expect_err("401 should fail");
    assert!(
        matches!(err, VisionError::UnexpectedStatus { status: 401, ref detail } if detail == "Invalid Signature"),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn cloudinary_response_without_url_is_missing_field() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1_1/demo/image/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "public_id": "x" })))
        .mount(&server)
        .await;

    let file = image_file();
    let err = cloudinary(&server.uri())
        .upload(file.path(), "image/jpeg")
        .await
        .unwrap_err();
    assert!(matches!(err, VisionError::MissingField("secure_url")));
}

#[tokio::test]
async fn cloudinary_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = cloudinary("http://127.0.0.1:1")
        .upload(&dir.path().join("gone.jpg"), "image/jpeg")
        .await
        .unwrap_err();
    assert!(matches!(err, VisionError::Io(_)));
}

#[tokio::test]
async fn gemini_sends_prompt_and_inline_image() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-1.5-pro:generateContent"))
        .and(query_param("key", "gemini-key"))
        .and(body_partial_json(json!({
            "contents": [{
                "role": "user",
                "parts": [
                    { "text": "what is this" },
                    { "inline_data": { "mime_type": "image/png", "data": "aGVsbG8=" } }
                ]
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Sony " }, { "text": "WH-1000XM5\n" }] }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let target = LabelTarget {
        url: "https://cdn.example.com/1.png",
        bytes: b"hello",
        mime_type: "image/png",
    };
    let label = gemini(&server.uri())
        .label(&target, "what is this")
        .await
        .expect("label should succeed");
    assert_eq!(label, "Sony WH-1000XM5\n");
}

#[tokio::test]
async fn gemini_without_candidates_is_missing_field() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-1.5-pro:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&server)
        .await;

    let target = LabelTarget {
        url: "https://cdn.example.com/1.jpg",
        bytes: b"x",
        mime_type: "image/jpeg",
    };
    let err = gemini(&server.uri())
        .label(&target, "what is this")
        .await
        .unwrap_err();
    assert!(matches!(err, VisionError::MissingField("candidates")));
}

#[tokio::test]
async fn gemini_error_does_not_leak_key() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-1.5-pro:generateContent"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "code": 400, "message": "API key not valid." }
        })))
        .mount(&server)
        .await;

    let target = LabelTarget {
        url: "https://cdn.example.com/1.jpg",
        bytes: b"x",
        mime_type: "image/jpeg",
    };
    let err = gemini(&server.uri())
        .label(&target, "what is this")
        .await
        .unwrap_err();
    assert!(
        matches!(err, VisionError::UnexpectedStatus { status: 400, ref detail } if detail == "API key not valid."),
        "got: {err:?}"
    );

    let transport = gemini("http://127.0.0.1:1")
        .label(&target, "what is this")
        .await
        .unwrap_err();
    assert!(!transport.to_string().contains("gemini-key"));
}
