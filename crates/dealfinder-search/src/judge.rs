//! Text-completion capability used by the relevance filter, plus an
//! OpenAI-compatible chat-completions implementation (Perplexity by default).

use std::time::Duration;

use async_trait::async_trait;
use dealfinder_core::JudgeSettings;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::error::JudgeError;

/// Prompt-in, text-out LLM capability.
#[async_trait]
pub trait TextJudge: Send + Sync {
    /// # Errors
    ///
    /// Returns [`JudgeError`] if the completion cannot be obtained.
    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String, JudgeError>;
}

/// Client for `POST {base}/chat/completions`.
pub struct ChatCompletionsJudge {
    client: Client,
    api_key: String,
    endpoint: Url,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatCompletionsJudge {
    /// # Errors
    ///
    /// Returns [`JudgeError::Http`] if the `reqwest::Client` cannot be
    /// constructed, or [`JudgeError::InvalidBaseUrl`] if `base_url` does not
    /// parse.
    pub fn new(
        api_key: &str,
        base_url: &str,
        model: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, JudgeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let raw = format!("{}/chat/completions", base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&raw).map_err(|e| JudgeError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            endpoint,
            model: model.to_owned(),
        })
    }

    /// # Errors
    ///
    /// See [`ChatCompletionsJudge::new`].
    pub fn from_settings(
        settings: &JudgeSettings,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, JudgeError> {
        Self::new(
            &settings.api_key,
            &settings.base_url,
            &settings.model,
            timeout_secs,
            user_agent,
        )
    }
}

#[async_trait]
impl TextJudge for ChatCompletionsJudge {
    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String, JudgeError> {
        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature,
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(JudgeError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let parsed: ChatResponse = serde_json::from_str(&body).map_err(JudgeError::Deserialize)?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(JudgeError::MissingContent)
    }
}
