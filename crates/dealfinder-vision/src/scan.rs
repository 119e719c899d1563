use std::sync::Arc;

use dealfinder_core::{AppConfig, ImageScanResult, RegionCode, SearchRequest};
use dealfinder_search::SearchService;

use crate::error::{ScanError, VisionError};
use crate::image::ImageBlob;
use crate::labeler::GeminiLabeler;
use crate::resolver::KeywordResolver;
use crate::store::CloudinaryStore;

/// Turns product photos into a search: resolve a keyword, then run it as a
/// non-exact query so the relevance judge is never consulted.
pub struct ImageScanner {
    resolver: KeywordResolver,
    search: Arc<SearchService>,
}

impl ImageScanner {
    #[must_use]
    pub fn new(resolver: KeywordResolver, search: Arc<SearchService>) -> Self {
        Self { resolver, search }
    }

    /// Builds the Cloudinary + Gemini scanner. Returns `Ok(None)` when image
    /// scanning is not configured.
    ///
    /// # Errors
    ///
    /// Returns [`VisionError`] if either HTTP client cannot be built.
    pub fn from_config(
        config: &AppConfig,
        search: Arc<SearchService>,
    ) -> Result<Option<Self>, VisionError> {
        let Some(scan) = &config.scan else {
            tracing::warn!("image scanning disabled: vision or storage credentials not configured");
            return Ok(None);
        };

        let store = CloudinaryStore::new(
            &scan.storage,
            config.request_timeout_secs,
            &config.user_agent,
        )?;
        let labeler =
            GeminiLabeler::new(&scan.vision, config.request_timeout_secs, &config.user_agent)?;
        let resolver = KeywordResolver::new(
            Arc::new(store),
            Arc::new(labeler),
            config.upload_dir.clone(),
        );

        Ok(Some(Self::new(resolver, search)))
    }

    /// # Errors
    ///
    /// - [`ScanError::NoImagesProvided`] / [`ScanError::ImageProcessingFailure`]
    ///   from keyword resolution.
    /// - [`ScanError::NoProductDetected`] if every label came back empty.
    /// - [`ScanError::Search`] if the follow-up search fails.
    pub async fn scan(
        &self,
        images: &[ImageBlob],
        region: RegionCode,
    ) -> Result<ImageScanResult, ScanError> {
        tracing::info!(images = images.len(), region = %region, "image scan received");

        let keyword = self.resolver.resolve_keywords(images).await?;
        if keyword.is_empty() {
            return Err(ScanError::NoProductDetected);
        }
        tracing::info!(keyword = %keyword, "resolved image keyword");

        let request = SearchRequest::new(keyword.clone(), false, region);
        let search = self.search.search(&request).await?;

        Ok(ImageScanResult {
            detected_keyword: keyword,
            search,
        })
    }
}
