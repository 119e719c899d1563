//! Image keyword resolution: store each image, label it, and join the
//! labels into one search query.

use std::path::PathBuf;
use std::sync::Arc;

use futures::future::try_join_all;

use crate::error::{ImageStage, ScanError, VisionError};
use crate::image::{ImageBlob, TempImage};
use crate::labeler::{LabelTarget, VisionLabeler};
use crate::store::DurableImageStore;

pub const LABEL_PROMPT: &str = "Identify the exact product brand and model in this image. \
Only return the name (e.g. 'Sony WH-1000XM5'). No extra words. \
If you cannot detect the exact model, return the closest model you can identify.";

pub struct KeywordResolver {
    store: Arc<dyn DurableImageStore>,
    labeler: Arc<dyn VisionLabeler>,
    upload_dir: PathBuf,
}

impl KeywordResolver {
    #[must_use]
    pub fn new(
        store: Arc<dyn DurableImageStore>,
        labeler: Arc<dyn VisionLabeler>,
        upload_dir: PathBuf,
    ) -> Self {
        Self {
            store,
            labeler,
            upload_dir,
        }
    }

    /// Labels every image and joins the non-empty labels with single spaces,
    /// in input order. Images are processed concurrently; the first failure
    /// aborts the batch.
    ///
    /// The result may be empty when no image produced a label.
    ///
    /// # Errors
    ///
    /// - [`ScanError::NoImagesProvided`] for an empty slice, before any
    ///   external call.
    /// - [`ScanError::ImageProcessingFailure`] naming the first failing
    ///   image and stage.
    pub async fn resolve_keywords(&self, images: &[ImageBlob]) -> Result<String, ScanError> {
        if images.is_empty() {
            return Err(ScanError::NoImagesProvided);
        }

        let labels = try_join_all(
            images
                .iter()
                .enumerate()
                .map(|(index, blob)| self.label_one(index, blob)),
        )
        .await?;

        Ok(join_labels(&labels))
    }

    async fn label_one(&self, index: usize, blob: &ImageBlob) -> Result<String, ScanError> {
        // The temp file is deleted when `temp` drops at the end of this
        // block, whether or not the upload succeeded.
        let url = {
            let temp = TempImage::write(&self.upload_dir, blob)
                .map_err(|e| failure(index, ImageStage::TempFile)(e.into()))?;
            tracing::debug!(
                index,
                file_name = blob.file_name.as_deref().unwrap_or(""),
                bytes = blob.bytes.len(),
                "uploading image"
            );
            self.store
                .upload(temp.path(), &blob.mime_type)
                .await
                .map_err(failure(index, ImageStage::Upload))?
        };
        tracing::debug!(index, url = %url, "image stored");

        let target = LabelTarget {
            url: &url,
            bytes: &blob.bytes,
            mime_type: &blob.mime_type,
        };
        let label = self
            .labeler
            .label(&target, LABEL_PROMPT)
            .await
            .map_err(failure(index, ImageStage::Labeling))?;

        let label = label.trim().to_string();
        if label.is_empty() {
            tracing::info!(index, "vision labeler returned no product for image");
        } else {
            tracing::info!(index, label = %label, "image labeled");
        }
        Ok(label)
    }
}

fn failure(index: usize, stage: ImageStage) -> impl FnOnce(VisionError) -> ScanError {
    move |source| ScanError::ImageProcessingFailure {
        index,
        stage,
        source,
    }
}

/// Joins labels with single spaces, skipping blank ones.
#[must_use]
pub fn join_labels(labels: &[String]) -> String {
    labels
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
