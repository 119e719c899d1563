//! HTTP client for SerpAPI's Google Shopping engine.

use std::time::Duration;

use async_trait::async_trait;
use dealfinder_core::{AppConfig, RegionDescriptor};
use reqwest::{Client, Url};
use serde_json::Value;

use crate::error::ProviderError;
use crate::provider::ShoppingSearchProvider;
use crate::types::{decode_shopping_results, RawListing};

const DEFAULT_BASE_URL: &str = "https://serpapi.com";
const ENGINE: &str = "google_shopping";

/// Client for `GET /search.json?engine=google_shopping`.
///
/// Use [`SerpApiClient::new`] for production or
/// [`SerpApiClient::with_base_url`] to point at a mock server in tests.
/// No retries: a failed call is reported to the caller immediately.
pub struct SerpApiClient {
    client: Client,
    api_key: String,
    base_url: Url,
}

impl SerpApiClient {
    /// Creates a client pointed at the production SerpAPI host.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, ProviderError> {
        Self::with_base_url(api_key, timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the `reqwest::Client` cannot be
    /// constructed, or [`ProviderError::InvalidBaseUrl`] if `base_url` does
    /// not parse.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let normalised = format!("{}/search.json", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| ProviderError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
        })
    }

    /// Builds a client from the shared application config.
    ///
    /// # Errors
    ///
    /// See [`SerpApiClient::with_base_url`].
    pub fn from_config(config: &AppConfig) -> Result<Self, ProviderError> {
        Self::with_base_url(
            &config.serpapi_api_key,
            config.request_timeout_secs,
            &config.user_agent,
            &config.serpapi_base_url,
        )
    }

    /// Builds the request URL with all query parameters percent-encoded.
    fn build_url(&self, query: &str, locale: &RegionDescriptor) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("engine", ENGINE)
            .append_pair("q", query)
            .append_pair("google_domain", &locale.search_domain)
            .append_pair("hl", &locale.locale)
            .append_pair("api_key", &self.api_key);
        url
    }

    /// Pulls SerpAPI's `error` message out of a response body, if any.
    fn error_message(body: &str) -> Option<String> {
        serde_json::from_str::<Value>(body)
            .ok()?
            .get("error")
            .and_then(Value::as_str)
            .map(str::to_owned)
    }
}

#[async_trait]
impl ShoppingSearchProvider for SerpApiClient {
    async fn search(
        &self,
        query: &str,
        locale: &RegionDescriptor,
    ) -> Result<Vec<RawListing>, ProviderError> {
        let url = self.build_url(query, locale);

        let response = self
            .client
            .get(url)
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
            return Err(ProviderError::UnexpectedStatus {
                status: status.as_u16(),
                detail,
            });
        }

        let parsed: Value =
            serde_json::from_str(&body).map_err(|e| ProviderError::Deserialize {
                context: format!("google_shopping results for \"{query}\""),
                source: e,
            })?;

        if parsed.get("shopping_results").is_none() {
            if let Some(message) = parsed.get("error").and_then(Value::as_str) {
                tracing::warn!(query, message, "SerpAPI returned no shopping results");
            }
        }

        let listings = decode_shopping_results(&parsed);
        tracing::debug!(query, count = listings.len(), "SerpAPI listings received");
        Ok(listings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> SerpApiClient {
        SerpApiClient::with_base_url("test-key", 30, "dealfinder-test/0.1", base_url)
            .expect("client construction should not fail")
    }

    fn uk_locale() -> RegionDescriptor {
        RegionDescriptor {
            search_domain: "google.co.uk".to_string(),
            locale: "en-GB".to_string(),
        }
    }

    #[test]
    fn build_url_constructs_correct_query_string() {
        let client = test_client("https://serpapi.com");
        let url = client.build_url("headphones", &uk_locale());
        assert_eq!(
            url.as_str(),
            "https://serpapi.com/search.json?engine=google_shopping&q=headphones&google_domain=google.co.uk&hl=en-GB&api_key=test-key"
        );
    }

    #[test]
    fn build_url_strips_trailing_slash() {
        let client = test_client("https://serpapi.com/");
        let url = client.build_url("x", &uk_locale());
        assert!(url.as_str().starts_with("https://serpapi.com/search.json?"));
    }

    #[test]
    fn build_url_encodes_special_characters() {
        let client = test_client("https://serpapi.com");
        let url = client.build_url("AT&T phone #1", &uk_locale());
        assert!(
            url.as_str().contains("q=AT%26T+phone+%231"),
            "query param should be percent-encoded: {url}"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let result = SerpApiClient::with_base_url("k", 30, "ua", "not a url");
        assert!(matches!(
            result,
            Err(ProviderError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn error_message_reads_error_field() {
        assert_eq!(
            SerpApiClient::error_message(r#"{"error":"Invalid API key."}"#).as_deref(),
            Some("Invalid API key.")
        );
        assert!(SerpApiClient::error_message("<html>").is_none());
    }
}
