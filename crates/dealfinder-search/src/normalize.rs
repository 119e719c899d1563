//! Normalization from raw provider listings to [`dealfinder_core::Product`].
//!
//! Pure and infallible: every field the provider omits maps to its fixed
//! default so downstream consumers (including the judge's JSON round-trip)
//! always see a uniform record.

use dealfinder_core::{Product, RegionCode, DEFAULT_AVAILABILITY, MAX_PRODUCTS};

use crate::types::RawListing;

/// Normalizes the top [`MAX_PRODUCTS`] listings in provider rank order,
/// stamping `region` onto each.
#[must_use]
pub fn normalize_listings(raw: Vec<RawListing>, region: &RegionCode) -> Vec<Product> {
    raw.into_iter()
        .take(MAX_PRODUCTS)
        .map(|listing| normalize_listing(listing, region))
        .collect()
}

fn normalize_listing(listing: RawListing, region: &RegionCode) -> Product {
    // Only the first promotional annotation is kept.
    let discount = listing.extensions.into_iter().next();

    Product {
        title: listing.title.unwrap_or_default(),
        price: listing.price.unwrap_or_default(),
        original_price: listing.extracted_price,
        image: listing.thumbnail.filter(|s| !s.is_empty()),
        rating: listing.rating,
        review_count: listing.reviews,
        retailer: listing.source.unwrap_or_default(),
        url: listing.product_link.unwrap_or_default(),
        discount,
        availability: listing
            .delivery
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_AVAILABILITY.to_string()),
        region: region.clone(),
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
