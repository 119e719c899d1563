use axum::{
    extract::{Multipart, Query, State},
    Extension, Json,
};
use dealfinder_core::{ImageScanResult, RegionCode};
use dealfinder_vision::ImageBlob;
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{map_scan_error, ApiError, ApiResponse, AppState, ResponseMeta};

pub const MAX_IMAGES: usize = 3;
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;
const IMAGE_FIELDS: [&str; MAX_IMAGES] = ["image1", "image2", "image3"];

#[derive(Debug, Deserialize)]
pub(super) struct ScanQuery {
    pub region: Option<String>,
}

pub(super) async fn scan_image(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ScanQuery>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<ImageScanResult>>, ApiError> {
    let Some(scanner) = state.scanner.clone() else {
        return Err(ApiError::new(
            req_id.0,
            "scan_unavailable",
            "image scanning is not configured",
        ));
    };

    let images = read_images(&req_id.0, multipart).await?;

    let region = RegionCode::from_param(query.region.as_deref());
    let data = scanner
        .scan(&images, region)
        .await
        .map_err(|e| map_scan_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// Reads `image1..image3` file parts in field order. Empty parts (a file
/// input left blank) are skipped.
async fn read_images(
    request_id: &str,
    mut multipart: Multipart,
) -> Result<Vec<ImageBlob>, ApiError> {
    let bad_request = |message: String| ApiError::new(request_id, "bad_request", message);
    let mut images = Vec::with_capacity(MAX_IMAGES);
    let mut seen: Vec<String> = Vec::with_capacity(MAX_IMAGES);

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| {
            bad_request("malformed multipart body".to_string()).with_details(e.body_text())
        })?
    {
        let name = field.name().unwrap_or_default().to_string();
        if !IMAGE_FIELDS.contains(&name.as_str()) {
            return Err(bad_request(format!(
                "unexpected field \"{name}\"; expected image1, image2, or image3"
            )));
        }
        if seen.contains(&name) {
            return Err(bad_request(format!("field \"{name}\" was sent more than once")));
        }

        let mime_type = field.content_type().map(str::to_owned);
        let file_name = field.file_name().map(str::to_owned);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| {
                bad_request(format!("could not read field \"{name}\"")).with_details(e.body_text())
            })?;

        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(bad_request(format!("field \"{name}\" exceeds the 10 MiB limit")));
        }
        seen.push(name);
        if bytes.is_empty() {
            continue;
        }

        images.push(ImageBlob::new(bytes.to_vec(), mime_type.as_deref(), file_name));
    }

    tracing::debug!(count = images.len(), "multipart images received");
    Ok(images)
}
