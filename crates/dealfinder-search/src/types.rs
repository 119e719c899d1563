//! Raw Google Shopping result types as returned by SerpAPI's
//! `engine=google_shopping` endpoint.
//!
//! ### Observed shape
//! Results live under `shopping_results`, which is absent (not `[]`) when the
//! query matched nothing; in that case SerpAPI also sets a top-level `error`
//! string such as `"Google hasn't returned any results for this query."`
//! with a 2xx status.
//!
//! Every per-listing field is optional in practice. `price` is a display
//! string (`"$29.99"`, `"£24.00"`), `extracted_price` its numeric form.
//! `extensions` holds promotional snippets (`"SALE"`, `"20% off"`) and may be
//! missing.

use serde_json::{Map, Value};

/// A single shopping listing before normalization.
#[derive(Debug, Clone, Default)]
pub struct RawListing {
    pub title: Option<String>,
    pub price: Option<String>,
    pub extracted_price: Option<f64>,
    pub thumbnail: Option<String>,
    pub rating: Option<f64>,
    /// Review count. Observed as an integer.
    pub reviews: Option<u64>,
    /// Seller / merchant name.
    pub source: Option<String>,
    pub product_link: Option<String>,
    pub extensions: Vec<String>,
    /// Delivery text, e.g. `"Free delivery by Fri"`.
    pub delivery: Option<String>,
}

impl RawListing {
    /// Reads each field on its own. A missing or oddly typed field becomes
    /// `None` (or empty) without affecting the rest of the listing.
    #[must_use]
    pub fn from_object(fields: &Map<String, Value>) -> Self {
        let text = |key: &str| fields.get(key).and_then(Value::as_str).map(str::to_owned);
        let number = |key: &str| fields.get(key).and_then(Value::as_f64);

        Self {
            title: text("title"),
            price: text("price"),
            extracted_price: number("extracted_price"),
            thumbnail: text("thumbnail"),
            rating: number("rating"),
            reviews: fields.get("reviews").and_then(Value::as_u64),
            source: text("source"),
            product_link: text("product_link"),
            extensions: fields
                .get("extensions")
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_owned)
                        .collect()
                })
                .unwrap_or_default(),
            delivery: text("delivery"),
        }
    }
}

/// Extracts the listing array from a SerpAPI response body.
///
/// A missing or non-array `shopping_results` yields an empty list. Only
/// entries that are not JSON objects are skipped; provider order is kept.
#[must_use]
pub fn decode_shopping_results(body: &Value) -> Vec<RawListing> {
    let Some(entries) = body.get("shopping_results").and_then(Value::as_array) else {
        return Vec::new();
    };

    entries
        .iter()
        .enumerate()
        .filter_map(|(position, entry)| match entry.as_object() {
            Some(fields) => Some(RawListing::from_object(fields)),
            None => {
                tracing::debug!(position, "skipping non-object shopping result");
                None
            }
        })
        .collect()
}
