//! Vision labeling: ask a multimodal model what product an image shows.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use dealfinder_core::VisionSettings;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::VisionError;

/// What the labeler may look at: the stored image's URL and its raw bytes.
#[derive(Debug, Clone, Copy)]
pub struct LabelTarget<'a> {
    pub url: &'a str,
    pub bytes: &'a [u8],
    pub mime_type: &'a str,
}

#[async_trait]
pub trait VisionLabeler: Send + Sync {
    /// Returns the model's raw answer. Callers trim it.
    ///
    /// # Errors
    ///
    /// Returns [`VisionError`] if the call fails or the reply has no text.
    async fn label(&self, target: &LabelTarget<'_>, prompt: &str) -> Result<String, VisionError>;
}

/// Gemini `generateContent` with the image sent as inline data.
pub struct GeminiLabeler {
    client: Client,
    endpoint: Url,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [Part<'a>; 2],
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text { text: &'a str },
    Inline { inline_data: InlineData<'a> },
}

#[derive(Serialize)]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GeminiLabeler {
    /// # Errors
    ///
    /// Returns [`VisionError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`VisionError::InvalidBaseUrl`] if the base URL does not
    /// parse.
    pub fn new(
        settings: &VisionSettings,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, VisionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let raw = format!(
            "{}/v1beta/models/{}:generateContent",
            settings.base_url.trim_end_matches('/'),
            settings.model
        );
        let mut endpoint = Url::parse(&raw).map_err(|e| VisionError::InvalidBaseUrl {
            url: settings.base_url.clone(),
            reason: e.to_string(),
        })?;
        endpoint
            .query_pairs_mut()
            .append_pair("key", &settings.api_key);

        Ok(Self { client, endpoint })
    }

    fn error_message(body: &str) -> Option<String> {
        serde_json::from_str::<Value>(body)
            .ok()?
            .pointer("/error/message")
            .and_then(Value::as_str)
            .map(str::to_owned)
    }
}

#[async_trait]
impl VisionLabeler for GeminiLabeler {
    async fn label(&self, target: &LabelTarget<'_>, prompt: &str) -> Result<String, VisionError> {
        let request = GenerateRequest {
            contents: [Content {
                role: "user",
                parts: [
                    Part::Text { text: prompt },
                    Part::Inline {
                        inline_data: InlineData {
                            mime_type: target.mime_type,
                            data: STANDARD.encode(target.bytes),
                        },
                    },
                ],
            }],
        };

        // The endpoint carries the API key, so URLs are stripped from errors.
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(reqwest::Error::without_url)?;
        if !status.is_success() {
            let detail = Self::error_message(&body)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string());
            return Err(VisionError::UnexpectedStatus {
                status: status.as_u16(),
                detail,
            });
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&body).map_err(VisionError::Deserialize)?;
        let content = parsed
            .candidates
            .into_iter()
            .next()
            .ok_or(VisionError::MissingField("candidates"))?
            .content
            .ok_or(VisionError::MissingField("content"))?;

        Ok(content
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect::<String>())
    }
}
