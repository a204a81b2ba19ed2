//! Saving the processed video of a completed job to disk.

use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use super::Session;
use crate::error::{Error, Result};
use crate::types::JobId;
use crate::utils::{filename_from_response, get_unique_path};

/// File name used when the service does not suggest one
pub const DEFAULT_ARTIFACT_NAME: &str = "processed_video.mp4";

impl Session {
    /// Download a job's processed video into `dest_dir`
    ///
    /// The file name comes from the response's `Content-Disposition` header, falling back
    /// to [`DEFAULT_ARTIFACT_NAME`]; existing files are handled per
    /// [`DownloadConfig::file_collision`](crate::config::DownloadConfig::file_collision).
    /// The body is streamed to a `.part` file that is renamed into place once complete,
    /// so a failed download never leaves a truncated video under the final name.
    /// The transfer fails with [`Error::Timeout`] only when no bytes arrive for
    /// [`DownloadConfig::stall_timeout`](crate::config::DownloadConfig::stall_timeout).
    pub async fn download_artifact(
        &self,
        job_id: &JobId,
        dest_dir: impl AsRef<Path>,
    ) -> Result<PathBuf> {
        let dest_dir = dest_dir.as_ref();
        tokio::fs::create_dir_all(dest_dir).await?;

        let response = self.client.open_download(job_id).await?;
        let file_name = filename_from_response(&response, DEFAULT_ARTIFACT_NAME);
        let dest = get_unique_path(&dest_dir.join(&file_name), self.config.download.file_collision)?;
        let partial = partial_path(&dest);

        debug!(job_id = %job_id, dest = %dest.display(), "downloading artifact");

        let stall_timeout = self.config.download.stall_timeout;
        let written = match stream_to_file(response, &partial, stall_timeout).await {
            Ok(written) => written,
            Err(e) => {
                if let Err(cleanup) = tokio::fs::remove_file(&partial).await {
                    debug!(path = %partial.display(), error = %cleanup, "no partial file to remove");
                }
                warn!(job_id = %job_id, error = %e, "artifact download failed");
                return Err(e);
            }
        };

        tokio::fs::rename(&partial, &dest).await?;
        info!(job_id = %job_id, path = %dest.display(), bytes = written, "artifact saved");
        Ok(dest)
    }
}

async fn stream_to_file(
    response: reqwest::Response,
    path: &Path,
    stall_timeout: Duration,
) -> Result<u64> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut stream = response.bytes_stream();
    let mut written = 0u64;

    while let Some(chunk) = tokio::time::timeout(stall_timeout, stream.next())
        .await
        .map_err(|_| Error::Timeout(stall_timeout))?
    {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }

    file.flush().await?;
    Ok(written)
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}
