//! Durable image storage: upload a local file, get back a public URL.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use dealfinder_core::CloudinarySettings;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::VisionError;

#[async_trait]
pub trait DurableImageStore: Send + Sync {
    /// Uploads the file at `path` and returns its durable URL.
    ///
    /// # Errors
    ///
    /// Returns [`VisionError`] if the file cannot be read or the upload
    /// fails.
    async fn upload(&self, path: &Path, mime_type: &str) -> Result<String, VisionError>;
}

/// Signed uploads to `POST {base}/v1_1/{cloud}/image/upload`.
pub struct CloudinaryStore {
    client: Client,
    endpoint: Url,
    api_key: String,
    api_secret: String,
    folder: String,
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
}

impl CloudinaryStore {
    /// # Errors
    ///
    /// Returns [`VisionError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`VisionError::InvalidBaseUrl`] if the base URL does not
    /// parse.
    pub fn new(
        settings: &CloudinarySettings,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, VisionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let raw = format!(
            "{}/v1_1/{}/image/upload",
            settings.base_url.trim_end_matches('/'),
            settings.cloud_name
        );
        let endpoint = Url::parse(&raw).map_err(|e| VisionError::InvalidBaseUrl {
            url: settings.base_url.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            endpoint,
            api_key: settings.api_key.clone(),
            api_secret: settings.api_secret.clone(),
            folder: settings.folder.clone(),
        })
    }

    fn error_message(body: &str) -> Option<String> {
        serde_json::from_str::<Value>(body)
            .ok()?
            .pointer("/error/message")
            .and_then(Value::as_str)
            .map(str::to_owned)
    }
}

/// Cloudinary request signature: the signed parameters sorted by name,
/// joined as `k=v&k=v`, with the API secret appended, hashed with SHA-256
/// and hex encoded.
#[must_use]
pub fn sign_params(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_unstable();
    let joined = sorted
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("&");

    let digest = Sha256::digest(format!("{joined}{api_secret}").as_bytes());
    format!("{digest:x}")
}

#[async_trait]
impl DurableImageStore for CloudinaryStore {
    async fn upload(&self, path: &Path, mime_type: &str) -> Result<String, VisionError> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();

        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign_params(
            &[("folder", &self.folder), ("timestamp", &timestamp)],
            &self.api_secret,
        );

        let file = Part::bytes(bytes).file_name(file_name).mime_str(mime_type)?;
        let form = Form::new()
            .text("api_key", self.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", self.folder.clone())
            .text("signature", signature)
            .text("signature_algorithm", "sha256")
            .part("file", file);

        tracing::debug!(folder = %self.folder, "uploading image to Cloudinary");
        let response = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let detail = Self::error_message(&body)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string());
            return Err(VisionError::UnexpectedStatus {
                status: status.as_u16(),
                detail,
            });
        }

        let parsed: UploadResponse = serde_json::from_str(&body).map_err(VisionError::Deserialize)?;
        parsed
            .secure_url
            .filter(|url| !url.is_empty())
            .ok_or(VisionError::MissingField("secure_url"))
    }
}
