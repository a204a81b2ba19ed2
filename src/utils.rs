//! Utility functions for artifact file naming and HTTP response handling

use crate::config::FileCollisionAction;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Maximum number of rename attempts when resolving file collisions
const MAX_RENAME_ATTEMPTS: u32 = 9999;

/// Longest response body kept in error messages
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Get a unique path for a file, handling collisions according to the specified action
///
/// For `Rename`, a ` (n)` suffix is inserted before the extension until a free name is
/// found. `Skip` fails if the file exists; `Overwrite` always returns the path unchanged.
///
/// # Examples
///
/// ```
/// use vidtrans_client::utils::get_unique_path;
/// use vidtrans_client::config::FileCollisionAction;
/// use std::path::Path;
///
/// let path = Path::new("/tmp/processed_video.mp4");
/// let unique = get_unique_path(path, FileCollisionAction::Rename).unwrap();
/// // If /tmp/processed_video.mp4 exists, returns /tmp/processed_video (1).mp4
/// ```
pub fn get_unique_path(path: &Path, action: FileCollisionAction) -> Result<PathBuf> {
    match action {
        FileCollisionAction::Overwrite => Ok(path.to_path_buf()),
        FileCollisionAction::Skip => {
            if path.exists() {
                return Err(Error::FileCollision {
                    path: path.to_path_buf(),
                    reason: "file already exists and collision action is skip".to_string(),
                });
            }
            Ok(path.to_path_buf())
        }
        FileCollisionAction::Rename => {
            if !path.exists() {
                return Ok(path.to_path_buf());
            }

            let stem = path.file_stem().and_then(|s| s.to_str()).ok_or_else(|| {
                Error::InvalidPath {
                    path: path.to_path_buf(),
                    reason: "cannot extract file stem".to_string(),
                }
            })?;

            let extension = path.extension().and_then(|e| e.to_str());

            let parent = path.parent().ok_or_else(|| Error::InvalidPath {
                path: path.to_path_buf(),
                reason: "cannot extract parent directory".to_string(),
            })?;

            for i in 1..=MAX_RENAME_ATTEMPTS {
                let new_name = match extension {
                    Some(ext) => format!("{} ({}).{}", stem, i, ext),
                    None => format!("{} ({})", stem, i),
                };
                let new_path = parent.join(new_name);
                if !new_path.exists() {
                    return Ok(new_path);
                }
            }

            Err(Error::FileCollision {
                path: path.to_path_buf(),
                reason: format!(
                    "could not find unique filename after {} attempts",
                    MAX_RENAME_ATTEMPTS
                ),
            })
        }
    }
}

/// Filename suggested by a `Content-Disposition` header, if any
///
/// Handles both `filename="x.mp4"` and RFC 5987 `filename*=UTF-8''x.mp4`. Directory
/// components are stripped so the name is always safe to join onto a directory.
pub fn filename_from_content_disposition(value: &str) -> Option<String> {
    let mut plain = None;

    for part in value.split(';') {
        let part = part.trim();
        if let Some(encoded) = part.strip_prefix("filename*=") {
            // Format is: charset'lang'encoded-filename
            let encoded = encoded.rsplit('\'').next().unwrap_or(encoded);
            if let Ok(decoded) = urlencoding::decode(encoded)
                && let Some(name) = sanitize_filename(&decoded)
            {
                // The extended form wins over the plain one
                return Some(name);
            }
        } else if let Some(name) = part.strip_prefix("filename=") {
            plain = sanitize_filename(name.trim_matches('"'));
        }
    }

    plain
}

/// Filename for a downloaded artifact: from the response headers, else `fallback`
pub fn filename_from_response(response: &reqwest::Response, fallback: &str) -> String {
    response
        .headers()
        .get(reqwest::header::CONTENT_DISPOSITION)
        .and_then(|value| value.to_str().ok())
        .and_then(filename_from_content_disposition)
        .unwrap_or_else(|| fallback.to_string())
}

fn sanitize_filename(name: &str) -> Option<String> {
    let base = Path::new(name.trim())
        .file_name()
        .and_then(|n| n.to_str())?
        .to_string();
    if base.is_empty() || base == "." || base == ".." {
        None
    } else {
        Some(base)
    }
}

/// Shorten a response body for inclusion in an error message
pub fn truncate_body(body: &str) -> String {
    if body.chars().count() <= MAX_ERROR_BODY_CHARS {
        return body.to_string();
    }
    let mut truncated: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
    truncated.push('…');
    truncated
}
