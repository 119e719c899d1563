use dealfinder_search::SearchError;
use thiserror::Error;

/// Failure of one external image call (store or labeler) or of the local
/// temp-file step.
#[derive(Debug, Error)]
pub enum VisionError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("local image file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unexpected status {status}: {detail}")]
    UnexpectedStatus { status: u16, detail: String },

    #[error("response is missing field `{0}`")]
    MissingField(&'static str),

    #[error("failed to deserialize response: {0}")]
    Deserialize(#[source] serde_json::Error),

    #[error("invalid base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// Which per-image step failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageStage {
    TempFile,
    Upload,
    Labeling,
}

impl ImageStage {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TempFile => "temp_file",
            Self::Upload => "upload",
            Self::Labeling => "labeling",
        }
    }
}

impl std::fmt::Display for ImageStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("no images provided")]
    NoImagesProvided,

    /// Any single image failing aborts the whole batch.
    #[error("image {index} failed during {stage}: {source}")]
    ImageProcessingFailure {
        index: usize,
        stage: ImageStage,
        #[source]
        source: VisionError,
    },

    #[error("no product could be identified in the supplied images")]
    NoProductDetected,

    #[error(transparent)]
    Search(#[from] SearchError),
}
