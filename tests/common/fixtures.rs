//! Mock processing service and sample inputs

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use vidtrans_client::{Config, RetryConfig};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Polling interval for integration tests
pub const FAST_INTERVAL: Duration = Duration::from_millis(40);

/// Config pointed at `base_url` with fast polling and no per-tick retries
pub fn fast_config(base_url: &str) -> Config {
    let mut config = Config::with_base_url(base_url);
    config.polling.interval = FAST_INTERVAL;
    config.polling.request_timeout = Duration::from_millis(200);
    config.polling.retry = RetryConfig::none();
    config
}

/// Responds with each template in turn, repeating the last one
pub struct Sequence {
    responses: Vec<ResponseTemplate>,
    calls: AtomicUsize,
}

impl Sequence {
    pub fn new(responses: Vec<ResponseTemplate>) -> Self {
        Self {
            responses,
            calls: AtomicUsize::new(0),
        }
    }
}

impl Respond for Sequence {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses[call.min(self.responses.len() - 1)].clone()
    }
}

/// Status payload response
pub fn status(body: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}

/// Submission response accepting the job as `task_id`
pub fn accepted(task_id: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "success": true,
        "task_id": task_id,
        "message": "Processing started"
    }))
}

/// Mock of the processing service's four endpoints
pub struct MockService {
    pub server: MockServer,
}

impl MockService {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    pub async fn on_process_video(&self, response: impl Respond + 'static) {
        Mock::given(method("POST"))
            .and(path("/api/process-video"))
            .respond_with(response)
            .mount(&self.server)
            .await;
    }

    pub async fn on_upload_video(&self, response: impl Respond + 'static) {
        Mock::given(method("POST"))
            .and(path("/api/upload-video"))
            .respond_with(response)
            .mount(&self.server)
            .await;
    }

    pub async fn on_status(&self, job_id: &str, responses: Vec<ResponseTemplate>) {
        Mock::given(method("GET"))
            .and(path(format!("/api/status/{}", job_id)))
            .respond_with(Sequence::new(responses))
            .mount(&self.server)
            .await;
    }

    pub async fn on_download(&self, job_id: &str, bytes: &[u8]) {
        Mock::given(method("GET"))
            .and(path(format!("/api/download/{}", job_id)))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "video/mp4")
                    .insert_header(
                        "content-disposition",
                        "attachment; filename=\"processed_video.mp4\"",
                    )
                    .set_body_bytes(bytes.to_vec()),
            )
            .mount(&self.server)
            .await;
    }

    /// Requests received on `request_path`
    pub async fn hits(&self, request_path: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.url.path() == request_path)
            .count()
    }
}

/// Write a small fake video file and return its path
pub async fn write_sample_video(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    tokio::fs::write(&path, b"\x00\x00\x00\x18ftypmp42 fake video payload")
        .await
        .unwrap();
    path
}
