//! Integration tests for `SerpApiClient` using wiremock HTTP mocks.

use dealfinder_core::{RegionCode, RegionDescriptor};
use dealfinder_search::{
    normalize_listings, ProviderError, SerpApiClient, ShoppingSearchProvider,
};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> SerpApiClient {
    SerpApiClient::with_base_url("test-key", 5, "dealfinder-test/0.1", base_url)
        .expect("client construction should not fail")
}

fn uk_locale() -> RegionDescriptor {
    RegionDescriptor {
        search_domain: "google.co.uk".to_string(),
        locale: "en-GB".to_string(),
    }
}

#[tokio::test]
async fn search_sends_engine_locale_and_key() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param("engine", "google_shopping"))
        .and(query_param("q", "wireless headphones"))
        .and(query_param("google_domain", "google.co.uk"))
        .and(query_param("hl", "en-GB"))
        .and(query_param("api_key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "shopping_results": [
                {
                    "title": "Sony WH-1000XM5",
                    "price": "£279.00",
                    "extracted_price": 279.0,
                    "thumbnail": "https://img.example.com/xm5.jpg",
                    "rating": 4.7,
                    "reviews": 3120,
                    "source": "Argos",
                    "product_link": "https://www.google.co.uk/shopping/product/1",
                    "extensions": ["SALE"],
                    "delivery": "Free delivery"
                },
                { "title": "Bose QC45", "price": "£199.00" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let listings = test_client(&server.uri())
        .search("wireless headphones", &uk_locale())
        .await
        .expect("search should succeed");

    assert_eq!(listings.len(), 2);
    assert_eq!(listings[0].title.as_deref(), Some("Sony WH-1000XM5"));
    assert_eq!(listings[0].reviews, Some(3120));
    assert_eq!(listings[0].extensions, vec!["SALE".to_string()]);
    assert_eq!(listings[1].title.as_deref(), Some("Bose QC45"));
    assert!(listings[1].delivery.is_none());
}

#[tokio::test]
async fn no_results_error_on_success_status_is_empty_list() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "search_metadata": { "status": "Success" },
            "error": "Google hasn't returned any results for this query."
        })))
        .mount(&server)
        .await;

    let listings = test_client(&server.uri())
        .search("zzzz-no-such-thing", &uk_locale())
        .await
        .expect("empty results are not an error");
    assert!(listings.is_empty());
}

#[tokio::test]
async fn unauthorized_surfaces_provider_detail() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "error": "Invalid API key." })),
        )
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .search("headphones", &uk_locale())
        .await
        .expect_err("401 should fail");

    match err {
        ProviderError::UnexpectedStatus { status, detail } => {
            assert_eq!(status, 401);
            assert_eq!(detail, "Invalid API key.");
        }
        other => panic!("expected UnexpectedStatus, got: {other:?}"),
    }
}

#[tokio::test]
async fn rate_limit_without_json_body_uses_status_reason() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .search("headphones", &uk_locale())
        .await
        .expect_err("429 should fail");

    assert!(
        matches!(err, ProviderError::UnexpectedStatus { status: 429, ref detail } if detail == "Too Many Requests"),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn invalid_json_body_is_a_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .search("headphones", &uk_locale())
        .await
        .expect_err("non-JSON should fail");
    assert!(matches!(err, ProviderError::Deserialize { .. }), "got: {err:?}");
}

#[tokio::test]
async fn transport_error_does_not_leak_api_key() {
    // Nothing listens on port 1.
    let client = test_client("http://127.0.0.1:1");
    let err = client
        .search("headphones", &uk_locale())
        .await
        .expect_err("connection should fail");
    assert!(matches!(err, ProviderError::Http(_)));
    assert!(!err.to_string().contains("test-key"), "leaked: {err}");
}

#[tokio::test]
async fn mistyped_fields_keep_their_rank_in_the_top_ten() {
    let server = MockServer::start().await;

    let mut results: Vec<_> = (0..11)
        .map(|i| json!({ "title": format!("item-{i}") }))
        .collect();
    results[0] = json!({ "title": "item-0", "extensions": null });
    results[3] = json!({ "title": "item-3", "reviews": "1.2K", "price": 12 });

    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "shopping_results": results })),
        )
        .mount(&server)
        .await;

    let listings = test_client(&server.uri())
        .search("kettle", &uk_locale())
        .await
        .expect("search should succeed");
    assert_eq!(listings.len(), 11);

    let products = normalize_listings(listings, &RegionCode::new("UK"));
    let titles: Vec<_> = products.iter().map(|p| p.title.as_str()).collect();
    let expected: Vec<String> = (0..10).map(|i| format!("item-{i}")).collect();
    assert_eq!(titles, expected);
    assert!(products[0].discount.is_none());
    assert!(products[3].review_count.is_none());
    assert!(products[3].price.is_empty());
}
