use async_trait::async_trait;
use dealfinder_core::RegionDescriptor;

use crate::error::ProviderError;
use crate::types::RawListing;

/// A shopping-search backend. Returns the provider's top listings in rank
/// order; no pagination.
#[async_trait]
pub trait ShoppingSearchProvider: Send + Sync {
    /// # Errors
    ///
    /// Returns [`ProviderError`] on transport, auth, rate-limit, or other
    /// upstream failures.
    async fn search(
        &self,
        query: &str,
        locale: &RegionDescriptor,
    ) -> Result<Vec<RawListing>, ProviderError>;
}
