//! Shopping search pipeline for dealfinder.
//!
//! Queries a shopping-search provider for a region, normalizes the top
//! listings into [`dealfinder_core::Product`] records, and optionally
//! narrows them with an LLM relevance judge. Judge failures never reduce
//! the result set; provider failures abort the request.

pub mod error;
pub mod filter;
pub mod judge;
pub mod normalize;
pub mod provider;
pub mod serpapi;
pub mod service;
pub mod types;

pub use error::{JudgeError, ProviderError, SearchError};
pub use filter::{FilteredProducts, JudgeVerdict, RelevanceFilter};
pub use judge::{ChatCompletionsJudge, TextJudge};
pub use normalize::normalize_listings;
pub use provider::ShoppingSearchProvider;
pub use serpapi::SerpApiClient;
pub use service::SearchService;
pub use types::RawListing;
