//! HTTP access to the processing service.
//!
//! One method per endpoint. Submission methods return the parsed [`SubmitResponse`] even
//! when the service refused the job; deciding what a refusal means is up to the caller.

use reqwest::multipart::{Form, Part};
use std::time::Duration;
use tokio_util::io::ReaderStream;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::types::{JobId, JobSnapshot, ProcessUrlRequest, SubmitResponse, UploadOptions};
use crate::utils::truncate_body;
use crate::validation::VideoFile;

const UPLOAD_PATH: &str = "/api/upload-video";
const PROCESS_PATH: &str = "/api/process-video";

/// Typed client for the processing service (cheap to clone)
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    submit_timeout: Duration,
    status_timeout: Duration,
    download_stall_timeout: Duration,
}

impl ApiClient {
    /// Build a client from configuration
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.server.connect_timeout)
            .user_agent(concat!("vidtrans-client/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url().to_string(),
            submit_timeout: config.server.submit_timeout,
            status_timeout: config.polling.request_timeout,
            download_stall_timeout: config.download.stall_timeout,
        })
    }

    /// Service base URL without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `POST /api/upload-video` with the file streamed as the `video` part
    pub async fn upload_video(
        &self,
        file: &VideoFile,
        options: UploadOptions,
    ) -> Result<SubmitResponse> {
        let handle = tokio::fs::File::open(&file.path).await?;
        let body = reqwest::Body::wrap_stream(ReaderStream::new(handle));
        let video = Part::stream_with_length(body, file.size)
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)?;

        let form = Form::new()
            .part("video", video)
            .text("add_subtitles", options.add_subtitles.to_string())
            .text("audio_mode", options.audio_mode.as_str());

        tracing::debug!(
            file = %file.file_name,
            size = file.size,
            audio_mode = options.audio_mode.as_str(),
            "uploading video"
        );

        let request = self
            .http
            .post(self.endpoint(UPLOAD_PATH))
            .multipart(form)
            .timeout(self.submit_timeout);
        self.send_submission(request).await
    }

    /// `POST /api/process-video` with a JSON body
    pub async fn process_video_url(
        &self,
        video_url: &str,
        options: UploadOptions,
    ) -> Result<SubmitResponse> {
        let body = ProcessUrlRequest {
            video_url,
            add_subtitles: options.add_subtitles,
            audio_mode: options.audio_mode,
        };

        tracing::debug!(url = %video_url, "submitting video URL");

        let request = self
            .http
            .post(self.endpoint(PROCESS_PATH))
            .json(&body)
            .timeout(self.submit_timeout);
        self.send_submission(request).await
    }

    /// `GET /api/status/{id}`
    ///
    /// Any non-2xx status (including 404 for an unknown job) is an error.
    pub async fn fetch_status(&self, job_id: &JobId) -> Result<JobSnapshot> {
        let url = self.job_url("/api/status/", job_id);
        let response = self
            .http
            .get(&url)
            .timeout(self.status_timeout)
            .send()
            .await
            .map_err(|e| self.map_send_error(e, self.status_timeout))?;

        let status = response.status();
        let bytes = response.bytes().await?;
        if !status.is_success() {
            return Err(Error::UnexpectedStatus {
                status: status.as_u16(),
                body: truncate_body(&String::from_utf8_lossy(&bytes)),
            });
        }

        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Locator of the processed video for a job
    pub fn download_url(&self, job_id: &JobId) -> String {
        self.job_url("/api/download/", job_id)
    }

    /// Start `GET /api/download/{id}` and check the status line
    ///
    /// Only the wait for the response headers is bounded (by the download stall timeout).
    /// The body has no overall deadline; callers bound each chunk instead.
    pub async fn open_download(&self, job_id: &JobId) -> Result<reqwest::Response> {
        let request = self.http.get(self.download_url(job_id)).send();
        let response = tokio::time::timeout(self.download_stall_timeout, request)
            .await
            .map_err(|_| Error::Timeout(self.download_stall_timeout))?
            .map_err(|e| self.map_send_error(e, self.download_stall_timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::UnexpectedStatus {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }
        Ok(response)
    }

    // Submissions are judged by the JSON body, not the HTTP status: the service sends
    // `{success: false, error}` with 4xx/5xx codes.
    async fn send_submission(&self, request: reqwest::RequestBuilder) -> Result<SubmitResponse> {
        let response = request
            .send()
            .await
            .map_err(|e| self.map_send_error(e, self.submit_timeout))?;

        let status = response.status();
        let bytes = response.bytes().await?;
        match serde_json::from_slice::<SubmitResponse>(&bytes) {
            Ok(parsed) => Ok(parsed),
            Err(_) if !status.is_success() => Err(Error::UnexpectedStatus {
                status: status.as_u16(),
                body: truncate_body(&String::from_utf8_lossy(&bytes)),
            }),
            Err(e) => Err(Error::Serialization(e)),
        }
    }

    fn map_send_error(&self, error: reqwest::Error, timeout: Duration) -> Error {
        if error.is_timeout() {
            Error::Timeout(timeout)
        } else {
            Error::Network(error)
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn job_url(&self, prefix: &str, job_id: &JobId) -> String {
        format!(
            "{}{}{}",
            self.base_url,
            prefix,
            urlencoding::encode(job_id.as_str())
        )
    }
}
