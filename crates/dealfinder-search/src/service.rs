//! Search orchestration: region resolution, provider query, normalization,
//! and the optional judge pass.

use std::sync::Arc;

use dealfinder_core::{AppConfig, DataSource, RegionTable, SearchRequest, SearchResponse};

use crate::error::SearchError;
use crate::filter::RelevanceFilter;
use crate::judge::ChatCompletionsJudge;
use crate::normalize::normalize_listings;
use crate::provider::ShoppingSearchProvider;
use crate::serpapi::SerpApiClient;

/// Runs searches against one provider with an optional relevance filter.
///
/// Holds no mutable state, so a single instance is shared across
/// concurrent requests behind an `Arc`.
pub struct SearchService {
    regions: Arc<RegionTable>,
    provider: Arc<dyn ShoppingSearchProvider>,
    filter: Option<RelevanceFilter>,
}

impl SearchService {
    /// `filter` is `None` when no judge is configured; exact-match requests
    /// then return provider results with [`DataSource::Provider`].
    #[must_use]
    pub fn new(
        regions: Arc<RegionTable>,
        provider: Arc<dyn ShoppingSearchProvider>,
        filter: Option<RelevanceFilter>,
    ) -> Self {
        Self {
            regions,
            provider,
            filter,
        }
    }

    /// Wires the SerpAPI provider and, when configured, the chat-completions
    /// judge from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::ClientSetup`] if either HTTP client cannot be
    /// built.
    pub fn from_config(config: &AppConfig, regions: Arc<RegionTable>) -> Result<Self, SearchError> {
        let provider = SerpApiClient::from_config(config).map_err(|e| SearchError::ClientSetup {
            component: "serpapi",
            reason: e.to_string(),
        })?;

        let filter = match &config.judge {
            Some(settings) => {
                let judge = ChatCompletionsJudge::from_settings(
                    settings,
                    config.request_timeout_secs,
                    &config.user_agent,
                )
                .map_err(|e| SearchError::ClientSetup {
                    component: "judge",
                    reason: e.to_string(),
                })?;
                Some(RelevanceFilter::new(Arc::new(judge), settings.temperature))
            }
            None => {
                tracing::warn!("no judge configured; exact-match searches return provider results");
                None
            }
        };

        Ok(Self::new(regions, Arc::new(provider), filter))
    }

    /// The region table this service resolves against.
    #[must_use]
    pub fn regions(&self) -> &RegionTable {
        &self.regions
    }

    /// Runs one search.
    ///
    /// # Errors
    ///
    /// - [`SearchError::InvalidRequest`] if the query is empty or blank. No
    ///   provider call is made.
    /// - [`SearchError::UpstreamSearchFailure`] if the provider call fails.
    ///   Judge failures are not errors; they only change `data_source`.
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, SearchError> {
        if request.query.trim().is_empty() {
            tracing::warn!(region = %request.region, "rejecting search with empty query");
            return Err(SearchError::InvalidRequest(
                "query must not be empty".to_string(),
            ));
        }

        tracing::info!(
            query = %request.query,
            exact = request.exact_match,
            region = %request.region,
            "search request received"
        );

        let locale = self.regions.resolve(request.region.as_str());
        let raw = self
            .provider
            .search(&request.query, locale)
            .await
            .map_err(|e| {
                tracing::error!(query = %request.query, error = %e, "shopping provider call failed");
                SearchError::UpstreamSearchFailure(e)
            })?;

        let products = normalize_listings(raw, &request.region);
        tracing::debug!(count = products.len(), "normalized provider listings");

        if !request.exact_match {
            return Ok(SearchResponse {
                products,
                search_term: request.query.clone(),
                region: request.region.clone(),
                data_source: DataSource::Provider,
            });
        }

        let (products, data_source) = match &self.filter {
            Some(filter) => {
                let filtered = filter
                    .filter(&request.query, &request.region, products)
                    .await;
                let source = if filtered.used_judge {
                    DataSource::ProviderAndJudge
                } else {
                    DataSource::Provider
                };
                (filtered.products, source)
            }
            None => {
                tracing::warn!(
                    query = %request.query,
                    "exact match requested but no judge configured"
                );
                (products, DataSource::Provider)
            }
        };

        Ok(SearchResponse {
            products,
            search_term: request.query.clone(),
            region: request.region.clone(),
            data_source,
        })
    }
}
