//! Shared test helpers for creating Session instances against a mock service.

use crate::config::{Config, RetryConfig};
use crate::session::Session;
use crate::types::Event;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::broadcast;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Polling interval used by test sessions
pub(crate) const TEST_INTERVAL: Duration = Duration::from_millis(50);

/// Upper bound for waiting on any single event
const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

/// Config with fast polling and no per-tick retries
pub(crate) fn fast_config(base_url: &str) -> Config {
    let mut config = Config::with_base_url(base_url);
    config.polling.interval = TEST_INTERVAL;
    config.polling.request_timeout = Duration::from_millis(150);
    config.polling.retry = RetryConfig::none();
    // Long enough that no notification expires mid-test
    config.notifications.lifetime = Duration::from_secs(30);
    config
}

/// Helper to create a test Session bound to a fresh mock server.
/// Returns the session and the server (which must be kept alive).
pub(crate) async fn create_test_session() -> (Session, MockServer) {
    let server = MockServer::start().await;
    let session = Session::new(fast_config(&server.uri())).unwrap();
    (session, server)
}

/// Same as [`create_test_session`] with a config tweak applied first
pub(crate) async fn create_test_session_with(
    tweak: impl FnOnce(&mut Config),
) -> (Session, MockServer) {
    let server = MockServer::start().await;
    let mut config = fast_config(&server.uri());
    tweak(&mut config);
    let session = Session::new(config).unwrap();
    (session, server)
}

/// JSON response for a status check
pub(crate) fn status_body(body: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}

/// Responds with each template in turn, repeating the last one forever
pub(crate) struct Sequence {
    responses: Vec<ResponseTemplate>,
    calls: AtomicUsize,
}

impl Sequence {
    pub(crate) fn new(responses: Vec<ResponseTemplate>) -> Self {
        assert!(!responses.is_empty(), "sequence needs at least one response");
        Self {
            responses,
            calls: AtomicUsize::new(0),
        }
    }
}

impl Respond for Sequence {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let index = call.min(self.responses.len() - 1);
        self.responses[index].clone()
    }
}

/// Mount a status endpoint for `job_id` answering with `responses` in order
pub(crate) async fn mount_status(server: &MockServer, job_id: &str, responses: Vec<ResponseTemplate>) {
    Mock::given(method("GET"))
        .and(path(format!("/api/status/{}", job_id)))
        .respond_with(Sequence::new(responses))
        .mount(server)
        .await;
}

/// Number of requests the server received for `request_path`
pub(crate) async fn request_count(server: &MockServer, request_path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == request_path)
        .count()
}

/// Receive events until one matches, returning every event seen (the match is last)
pub(crate) async fn collect_until(
    rx: &mut broadcast::Receiver<Event>,
    mut done: impl FnMut(&Event) -> bool,
) -> Vec<Event> {
    let mut seen = Vec::new();
    let deadline = tokio::time::Instant::now() + EVENT_TIMEOUT;
    loop {
        match tokio::time::timeout_at(deadline, rx.recv()).await {
            Ok(Ok(event)) => {
                let finished = done(&event);
                seen.push(event);
                if finished {
                    return seen;
                }
            }
            Ok(Err(broadcast::error::RecvError::Lagged(_))) => continue,
            Ok(Err(broadcast::error::RecvError::Closed)) => panic!("event channel closed"),
            Err(_) => panic!("timed out waiting for event; saw {:?}", seen_summary(&seen)),
        }
    }
}

/// Events already queued on the receiver
pub(crate) fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn seen_summary(events: &[Event]) -> Vec<String> {
    events.iter().map(|e| format!("{:?}", e)).collect()
}
