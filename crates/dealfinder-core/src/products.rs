use serde::{Deserialize, Serialize};

use crate::regions::RegionCode;

/// Availability text used when the provider does not report delivery info.
pub const DEFAULT_AVAILABILITY: &str = "Check site";

/// Number of provider results kept per search, applied before filtering.
pub const MAX_PRODUCTS: usize = 10;

/// A shopping listing in the shape returned to callers.
///
/// Every field is always present when serialized; absent optional values
/// serialize as `null`, and absent strings as `""`. Deserialization is
/// lenient (missing fields take the defaults below) because judged lists
/// come back from an LLM and are accepted as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Product {
    pub title: String,
    /// Display price exactly as the provider formats it, e.g. `"$29.99"`.
    pub price: String,
    /// Numeric price extracted by the provider, when supplied.
    pub original_price: Option<f64>,
    pub image: Option<String>,
    pub rating: Option<f64>,
    pub review_count: Option<u64>,
    /// Seller name; empty when unknown.
    pub retailer: String,
    /// Product link; empty when unknown.
    pub url: String,
    /// First promotional annotation attached by the provider.
    pub discount: Option<String>,
    pub availability: String,
    pub region: RegionCode,
}

impl Default for Product {
    fn default() -> Self {
        Self {
            title: String::new(),
            price: String::new(),
            original_price: None,
            image: None,
            rating: None,
            review_count: None,
            retailer: String::new(),
            url: String::new(),
            discount: None,
            availability: DEFAULT_AVAILABILITY.to_string(),
            region: RegionCode::global(),
        }
    }
}

/// One search call's input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub exact_match: bool,
    pub region: RegionCode,
}

impl SearchRequest {
    #[must_use]
    pub fn new(query: impl Into<String>, exact_match: bool, region: RegionCode) -> Self {
        Self {
            query: query.into(),
            exact_match,
            region,
        }
    }
}

/// Records which stages actually produced the returned list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    /// Provider results only: exact matching was not requested, or the judge
    /// was unavailable or its answer unusable.
    #[serde(rename = "provider")]
    Provider,
    /// Provider results narrowed by a successful judge pass.
    #[serde(rename = "provider+judge")]
    ProviderAndJudge,
}

impl DataSource {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DataSource::Provider => "provider",
            DataSource::ProviderAndJudge => "provider+judge",
        }
    }
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub products: Vec<Product>,
    pub search_term: String,
    pub region: RegionCode,
    pub data_source: DataSource,
}

/// Result of an image scan: the composite keyword derived from the images
/// plus the search envelope it produced, flattened into one object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageScanResult {
    pub detected_keyword: String,
    #[serde(flatten)]
    pub search: SearchResponse,
}
