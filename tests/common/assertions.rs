//! Event-driven wait helpers

use std::time::Duration;
use vidtrans_client::{Event, JobId, ResultView, Session};

/// Result of waiting for a job to end
#[derive(Debug)]
pub enum WaitResult {
    /// Job completed and its result was rendered
    Completed(ResultView),
    /// Service reported `error`
    Failed(String),
    /// Polling gave up after repeated transport failures
    Abandoned(u32),
    /// Timeout waiting for an outcome
    Timeout,
    /// Channel closed unexpectedly
    ChannelClosed,
}

/// Wait for the observed job to reach an outcome, listening on a receiver created
/// before the job was started
pub async fn wait_for_outcome(
    events: &mut tokio::sync::broadcast::Receiver<Event>,
    job_id: &JobId,
    timeout: Duration,
) -> WaitResult {
    let result = tokio::time::timeout(timeout, async {
        loop {
            match events.recv().await {
                Ok(Event::Completed { job_id: id, view }) if id == *job_id => {
                    return WaitResult::Completed(view);
                }
                Ok(Event::JobFailed { job_id: id, message }) if id == *job_id => {
                    return WaitResult::Failed(message);
                }
                Ok(Event::PollAbandoned {
                    job_id: id,
                    consecutive_failures,
                }) if id == *job_id => {
                    return WaitResult::Abandoned(consecutive_failures);
                }
                Ok(_) => continue,
                Err(_) => return WaitResult::ChannelClosed,
            }
        }
    })
    .await;

    result.unwrap_or(WaitResult::Timeout)
}

/// Collect events from a fresh subscription until the predicate matches or the timeout expires
pub async fn collect_events_until<F>(session: &Session, timeout: Duration, stop_predicate: F) -> Vec<Event>
where
    F: Fn(&Event) -> bool,
{
    let mut events = session.subscribe();
    let mut collected = Vec::new();

    let _ = tokio::time::timeout(timeout, async {
        while let Ok(event) = events.recv().await {
            let should_stop = stop_predicate(&event);
            collected.push(event);
            if should_stop {
                break;
            }
        }
    })
    .await;

    collected
}

/// Poll a condition until it holds or the timeout expires
pub async fn eventually(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
