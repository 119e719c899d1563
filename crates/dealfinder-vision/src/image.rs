//! In-memory image payloads and the scoped temporary file each one is
//! written to while it is being stored.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

pub const DEFAULT_MIME_TYPE: &str = "image/jpeg";

/// One uploaded image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBlob {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    /// Client-supplied name, used only for logging.
    pub file_name: Option<String>,
}

impl ImageBlob {
    /// An empty or missing MIME type is treated as JPEG.
    #[must_use]
    pub fn new(bytes: Vec<u8>, mime_type: Option<&str>, file_name: Option<String>) -> Self {
        let mime_type = mime_type
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_MIME_TYPE)
            .to_string();
        Self {
            bytes,
            mime_type,
            file_name,
        }
    }
}

/// Guesses an image MIME type from a file extension (case-insensitive).
#[must_use]
pub fn mime_type_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("heic") => "image/heic",
        Some("heif") => "image/heif",
        _ => DEFAULT_MIME_TYPE,
    }
}

fn suffix_for_mime(mime_type: &str) -> &'static str {
    match mime_type {
        "image/png" => ".png",
        "image/webp" => ".webp",
        "image/gif" => ".gif",
        "image/heic" => ".heic",
        "image/heif" => ".heif",
        _ => ".jpg",
    }
}

/// A blob written to disk for the duration of one upload. The file is
/// deleted when the guard drops, on success and error paths alike.
#[derive(Debug)]
pub struct TempImage {
    file: NamedTempFile,
}

impl TempImage {
    /// Writes `blob` to a fresh file inside `dir`.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be created or written.
    pub fn write(dir: &Path, blob: &ImageBlob) -> std::io::Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("dealfinder-")
            .suffix(suffix_for_mime(&blob.mime_type))
            .tempfile_in(dir)?;
        file.write_all(&blob.bytes)?;
        file.flush()?;
        Ok(Self { file })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}
