use thiserror::Error;

/// Errors from the shopping-search provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network or TLS failure. The request URL is stripped because it
    /// carries the API key.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider returned HTTP {status}: {detail}")]
    UnexpectedStatus { status: u16, detail: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid provider base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// Errors from the relevance judge. These never reach callers of
/// [`crate::SearchService`]; they are logged and the unfiltered list is used.
#[derive(Debug, Error)]
pub enum JudgeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("judge returned HTTP {status}")]
    UnexpectedStatus { status: u16 },

    #[error("judge response contained no message content")]
    MissingContent,

    #[error("JSON deserialization error for judge response: {0}")]
    Deserialize(#[source] serde_json::Error),

    #[error("invalid judge base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// Errors surfaced by [`crate::SearchService::search`].
#[derive(Debug, Error)]
pub enum SearchError {
    /// The request was rejected before any external call was made.
    #[error("invalid search request: {0}")]
    InvalidRequest(String),

    /// The provider call failed; no results can be produced.
    #[error("shopping search failed: {0}")]
    UpstreamSearchFailure(#[source] ProviderError),

    #[error("failed to build {component} client: {reason}")]
    ClientSetup {
        component: &'static str,
        reason: String,
    },
}
