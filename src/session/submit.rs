//! Job submission: validate, send, then hand the job id to the poller.

use tracing::{debug, info, warn};

use super::Session;
use crate::error::{Error, Result, ValidationError};
use crate::types::{Event, JobId, SubmitResponse, UploadOptions};
use crate::validation::{VideoFile, validate_url, validate_video_file};

/// Which endpoint a submission went to; picks the user-facing texts
#[derive(Clone, Copy, Debug)]
enum SubmissionKind {
    Upload,
    Url,
}

impl SubmissionKind {
    fn accepted_text(self) -> &'static str {
        match self {
            SubmissionKind::Upload => "Upload complete, processing started",
            SubmissionKind::Url => "Processing started",
        }
    }

    fn failure_text(self) -> &'static str {
        match self {
            SubmissionKind::Upload => "Upload failed",
            SubmissionKind::Url => "Processing failed",
        }
    }
}

impl Session {
    /// Validate and upload a local video file, then start polling the new job
    ///
    /// Invalid input is reported through an error notification and returned as
    /// [`Error::Validation`] without any request being sent. The loading indicator is shown
    /// for the duration of the request and hidden on every exit path.
    pub async fn submit_file(&self, file: VideoFile, options: UploadOptions) -> Result<JobId> {
        let file = match validate_video_file(file, self.config.upload.max_file_size) {
            Ok(file) => file,
            Err(e) => return Err(self.reject_input(e)),
        };

        info!(
            file = %file.file_name,
            size = file.size,
            content_type = %file.content_type,
            "submitting video upload"
        );

        let response = {
            let _loading = self.loading.show();
            self.client.upload_video(&file, options).await
        };

        self.finish_submission(response, SubmissionKind::Upload)
    }

    /// Validate and submit a YouTube link, then start polling the new job
    ///
    /// Leading and trailing whitespace is ignored.
    pub async fn submit_url(&self, url: &str, options: UploadOptions) -> Result<JobId> {
        let url = match validate_url(url) {
            Ok(url) => url,
            Err(e) => return Err(self.reject_input(e)),
        };

        info!(url = %url, "submitting video URL");

        let response = {
            let _loading = self.loading.show();
            self.client.process_video_url(url, options).await
        };

        self.finish_submission(response, SubmissionKind::Url)
    }

    fn reject_input(&self, error: ValidationError) -> Error {
        debug!(error = %error, "submission rejected before sending");
        self.notifier.error(error.user_message());
        Error::Validation(error)
    }

    fn finish_submission(
        &self,
        response: Result<SubmitResponse>,
        kind: SubmissionKind,
    ) -> Result<JobId> {
        let reason = match response {
            Ok(SubmitResponse {
                success: true,
                task_id: Some(task_id),
                ..
            }) if !task_id.trim().is_empty() => {
                let job_id = JobId::from(task_id);
                info!(job_id = %job_id, "job accepted");

                self.start(job_id.clone());
                self.emit(Event::Submitted {
                    job_id: job_id.clone(),
                });
                self.notifier.success(kind.accepted_text());
                return Ok(job_id);
            }
            Ok(SubmitResponse { success: true, .. }) => {
                "service accepted the job but returned no task id".to_string()
            }
            Ok(SubmitResponse { error, .. }) => error
                .map(|e| e.trim().to_string())
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| kind.failure_text().to_string()),
            Err(e) => format!("{}: {}", kind.failure_text(), e),
        };

        warn!(reason = %reason, "submission failed");
        self.notifier.error(reason.clone());
        Err(Error::SubmissionFailed { reason })
    }
}
