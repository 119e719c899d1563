//! Image-to-keyword resolution for dealfinder.
//!
//! Each image is written to a scoped temp file, uploaded to durable storage,
//! and labeled by a vision model. The non-empty labels form one search query
//! that is run through [`dealfinder_search::SearchService`] without the
//! relevance judge.

pub mod error;
pub mod image;
pub mod labeler;
pub mod resolver;
pub mod scan;
pub mod store;

pub use error::{ImageStage, ScanError, VisionError};
pub use image::{mime_type_for_path, ImageBlob, TempImage, DEFAULT_MIME_TYPE};
pub use labeler::{GeminiLabeler, LabelTarget, VisionLabeler};
pub use resolver::{join_labels, KeywordResolver, LABEL_PROMPT};
pub use scan::ImageScanner;
pub use store::{sign_params, CloudinaryStore, DurableImageStore};
