//! Relevance filter: asks an LLM judge to drop listings that do not match
//! the query.
//!
//! The judge can only narrow results. Any failure (call error, unparseable
//! reply, a reply that is not an array of product objects) produces
//! [`JudgeVerdict::Rejected`], and [`RelevanceFilter::filter`] then returns
//! the candidates unchanged. A parsed reply is trusted as-is: entries are
//! not checked against the candidate list, and the judge may reorder or
//! reshape them.

use std::sync::Arc;

use dealfinder_core::{Product, RegionCode};
use serde_json::Value;

use crate::judge::TextJudge;

/// Default sampling temperature for judge calls; kept low so repeated
/// searches filter the same way.
pub const DEFAULT_JUDGE_TEMPERATURE: f32 = 0.2;

/// Outcome of one judge pass.
#[derive(Debug, Clone, PartialEq)]
pub enum JudgeVerdict {
    Accepted(Vec<Product>),
    Rejected { reason: String },
}

/// Products returned by [`RelevanceFilter::filter`], and whether the judge
/// actually shaped them.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredProducts {
    pub products: Vec<Product>,
    pub used_judge: bool,
}

pub struct RelevanceFilter {
    judge: Arc<dyn TextJudge>,
    temperature: f32,
}

impl RelevanceFilter {
    #[must_use]
    pub fn new(judge: Arc<dyn TextJudge>, temperature: f32) -> Self {
        Self { judge, temperature }
    }

    /// Runs the judge and classifies its reply.
    pub async fn judge(
        &self,
        query: &str,
        region: &RegionCode,
        candidates: &[Product],
    ) -> JudgeVerdict {
        let prompt = match build_judge_prompt(query, region, candidates) {
            Ok(prompt) => prompt,
            Err(e) => {
                return JudgeVerdict::Rejected {
                    reason: format!("could not serialize candidates: {e}"),
                }
            }
        };

        match self.judge.complete(&prompt, self.temperature).await {
            Ok(reply) => parse_judge_reply(&reply, region),
            Err(e) => JudgeVerdict::Rejected {
                reason: e.to_string(),
            },
        }
    }

    /// Narrows `candidates` to the listings the judge considers relevant,
    /// or returns them untouched if the judge pass fails.
    pub async fn filter(
        &self,
        query: &str,
        region: &RegionCode,
        candidates: Vec<Product>,
    ) -> FilteredProducts {
        tracing::info!(
            query,
            region = %region,
            candidates = candidates.len(),
            "sending candidates to relevance judge"
        );

        match self.judge(query, region, &candidates).await {
            JudgeVerdict::Accepted(products) => {
                tracing::info!(
                    query,
                    kept = products.len(),
                    candidates = candidates.len(),
                    "relevance judge accepted"
                );
                FilteredProducts {
                    products,
                    used_judge: true,
                }
            }
            JudgeVerdict::Rejected { reason } => {
                tracing::warn!(
                    query,
                    reason = %reason,
                    "relevance judge unavailable; returning unfiltered products"
                );
                FilteredProducts {
                    products: candidates,
                    used_judge: false,
                }
            }
        }
    }
}

/// Builds the judge instruction with the literal query, the region code, and
/// the candidate list as pretty-printed JSON.
///
/// # Errors
///
/// Returns the `serde_json` error if the candidates cannot be serialized.
pub fn build_judge_prompt(
    query: &str,
    region: &RegionCode,
    candidates: &[Product],
) -> Result<String, serde_json::Error> {
    let products_json = serde_json::to_string_pretty(candidates)?;
    Ok(format!(
        "You filter shopping search results. Using the query, the region, and the product list \
below, remove products that are unrelated to the query.\n\
Keep listings for the same product in a different size, color, or variant.\n\
Only keep products that are relevant to shoppers in region: {region}.\n\
\n\
Query: \"{query}\"\n\
\n\
Products (JSON):\n\
{products_json}\n\
\n\
Respond with only a JSON array of the relevant products, using the same fields. No explanation."
    ))
}

/// Removes every markdown code-fence marker (the `json`-tagged opener and
/// bare fences) that judges like to wrap JSON in, then trims.
#[must_use]
pub fn strip_code_fences(reply: &str) -> String {
    reply.replace("```json", "").replace("```", "").trim().to_string()
}

/// Parses a judge reply into products.
///
/// Usable means a JSON array whose every element is an object that fits the
/// [`Product`] shape (missing fields take their defaults). Entries with a
/// missing or null `region` get the request's region, matching what the
/// normalizer stamps.
#[must_use]
pub fn parse_judge_reply(reply: &str, region: &RegionCode) -> JudgeVerdict {
    let cleaned = strip_code_fences(reply);

    let parsed: Value = match serde_json::from_str(&cleaned) {
        Ok(value) => value,
        Err(e) => {
            return JudgeVerdict::Rejected {
                reason: format!("reply is not valid JSON: {e}"),
            }
        }
    };

    let Value::Array(entries) = parsed else {
        return JudgeVerdict::Rejected {
            reason: "reply is not a JSON array".to_string(),
        };
    };

    let mut products = Vec::with_capacity(entries.len());
    for (position, entry) in entries.into_iter().enumerate() {
        let Value::Object(mut fields) = entry else {
            return JudgeVerdict::Rejected {
                reason: format!("entry {position} is not an object"),
            };
        };
        if fields.get("region").is_none_or(Value::is_null) {
            fields.insert(
                "region".to_string(),
                Value::String(region.as_str().to_string()),
            );
        }

        match serde_json::from_value::<Product>(Value::Object(fields)) {
            Ok(product) => products.push(product),
            Err(e) => {
                return JudgeVerdict::Rejected {
                    reason: format!("entry {position} is not product-shaped: {e}"),
                }
            }
        }
    }

    JudgeVerdict::Accepted(products)
}
