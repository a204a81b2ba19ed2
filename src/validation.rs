//! Input validation performed before any request is sent.
//!
//! Both validators are pure: they inspect declared metadata and text shape only.
//! Nothing here touches the network.

use crate::error::ValidationError;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Default upload limit: 500 MiB, inclusive
pub const MAX_VIDEO_FILE_SIZE: u64 = 500 * 1024 * 1024;

#[allow(clippy::expect_used)]
static YOUTUBE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(https?://)?(www\.)?(youtube\.com|youtu\.be)/.+").expect("valid regex")
});

/// Content types for the extensions the processing service accepts
const VIDEO_EXTENSIONS: &[(&str, &str)] = &[
    ("mp4", "video/mp4"),
    ("avi", "video/x-msvideo"),
    ("mov", "video/quicktime"),
    ("mkv", "video/x-matroska"),
    ("webm", "video/webm"),
];

/// A local video file selected for upload
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoFile {
    /// Location on disk
    pub path: PathBuf,
    /// Name sent in the multipart `filename` parameter
    pub file_name: String,
    /// Declared content type
    pub content_type: String,
    /// Size in bytes
    pub size: u64,
}

impl VideoFile {
    /// Describe a file with explicit metadata
    pub fn new(
        path: impl Into<PathBuf>,
        content_type: impl Into<String>,
        size: u64,
    ) -> Self {
        let path = path.into();
        let file_name = file_name_of(&path);
        Self {
            path,
            file_name,
            content_type: content_type.into(),
            size,
        }
    }

    /// Read size from the filesystem and infer the content type from the extension
    ///
    /// Unknown extensions get `application/octet-stream`, which validation then rejects.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await?;
        if !metadata.is_file() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", path.display()),
            ));
        }
        Ok(Self::new(path, content_type_for(path), metadata.len()))
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("video")
        .to_string()
}

/// Content type for a path based on its extension
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    ext.and_then(|ext| {
        VIDEO_EXTENSIONS
            .iter()
            .find(|(known, _)| *known == ext)
            .map(|(_, mime)| *mime)
    })
    .unwrap_or("application/octet-stream")
}

/// Check that a file declares a video content type and fits the upload limit
///
/// Returns the file unchanged on success.
pub fn validate_video_file(file: VideoFile, max_size: u64) -> Result<VideoFile, ValidationError> {
    if !file.content_type.starts_with("video/") {
        return Err(ValidationError::InvalidType {
            content_type: file.content_type,
        });
    }

    if file.size > max_size {
        return Err(ValidationError::TooLarge {
            size: file.size,
            limit: max_size,
        });
    }

    Ok(file)
}

/// Check that the text is a YouTube link
///
/// Scheme and `www.` are optional; anything after the host's slash is accepted.
/// Returns the trimmed URL.
pub fn validate_url(text: &str) -> Result<&str, ValidationError> {
    let url = text.trim();
    if url.is_empty() {
        return Err(ValidationError::EmptyInput);
    }
    if !YOUTUBE_URL.is_match(url) {
        return Err(ValidationError::InvalidUrl(url.to_string()));
    }
    Ok(url)
}
