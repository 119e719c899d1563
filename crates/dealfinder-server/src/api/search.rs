use axum::{
    extract::{Query, State},
    Extension, Json,
};
use dealfinder_core::{RegionCode, SearchRequest, SearchResponse};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{map_search_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct SearchQuery {
    pub q: Option<String>,
    pub exact: Option<String>,
    pub region: Option<String>,
}

impl SearchQuery {
    /// Only the literal `exact=true` enables exact matching.
    fn into_request(self) -> SearchRequest {
        SearchRequest::new(
            self.q.unwrap_or_default(),
            self.exact.as_deref() == Some("true"),
            RegionCode::from_param(self.region.as_deref()),
        )
    }
}

pub(super) async fn search_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<SearchResponse>>, ApiError> {
    let request = query.into_request();
    let data = state
        .search
        .search(&request)
        .await
        .map_err(|e| map_search_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
