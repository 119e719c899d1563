mod scan;
mod search;

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use dealfinder_search::{SearchError, SearchService};
use dealfinder_vision::{ImageScanner, ScanError};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{request_id, RequestId, REQUEST_ID_HEADER};

use scan::{MAX_IMAGES, MAX_IMAGE_BYTES};

#[derive(Clone)]
pub struct AppState {
    pub search: Arc<SearchService>,
    /// `None` when vision or storage credentials are missing.
    pub scanner: Option<Arc<ImageScanner>>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    scan: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
                details: None,
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }

    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.error.details = Some(details.into());
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "bad_request" => StatusCode::BAD_REQUEST,
            "no_product_detected" => StatusCode::UNPROCESSABLE_ENTITY,
            "upstream_error" => StatusCode::BAD_GATEWAY,
            "scan_unavailable" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn map_search_error(request_id: String, error: &SearchError) -> ApiError {
    match error {
        SearchError::InvalidRequest(reason) => ApiError::new(request_id, "bad_request", reason),
        SearchError::UpstreamSearchFailure(source) => {
            tracing::error!(error = %source, "search provider failed");
            ApiError::new(request_id, "upstream_error", "shopping search provider failed")
                .with_details(source.to_string())
        }
        SearchError::ClientSetup { .. } => {
            tracing::error!(error = %error, "search client misconfigured");
            ApiError::new(request_id, "internal_error", "search is misconfigured")
        }
    }
}

pub(super) fn map_scan_error(request_id: String, error: &ScanError) -> ApiError {
    match error {
        ScanError::NoImagesProvided => {
            ApiError::new(request_id, "bad_request", "no images uploaded")
        }
        ScanError::ImageProcessingFailure { .. } => {
            tracing::error!(error = %error, "image scan failed");
            ApiError::new(request_id, "image_processing_failed", "image processing failed")
                .with_details(error.to_string())
        }
        ScanError::NoProductDetected => ApiError::new(
            request_id,
            "no_product_detected",
            "no product could be identified in the uploaded images",
        ),
        ScanError::Search(inner) => map_search_error(request_id, inner),
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)])
}

pub fn build_app(state: AppState) -> Router {
    // Leaves headroom for multipart framing around the largest allowed batch.
    let scan_body_limit = MAX_IMAGES * MAX_IMAGE_BYTES + 64 * 1024;

    Router::new()
        .route("/api/health", get(health))
        .route("/api/search", get(search::search_products))
        .route(
            "/api/scan-image",
            post(scan::scan_image).layer(DefaultBodyLimit::max(scan_body_limit)),
        )
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(request_id))
                .layer(TraceLayer::new_for_http())
                .layer(build_cors()),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    Json(ApiResponse {
        data: HealthData {
            status: "ok",
            scan: if state.scanner.is_some() {
                "enabled"
            } else {
                "disabled"
            },
        },
        meta: ResponseMeta::new(req_id.0),
    })
}
