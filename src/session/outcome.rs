//! Awaiting the end of an observed job.

use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

use super::Session;
use crate::error::{Error, Result};
use crate::renderer::ResultView;
use crate::types::{Event, JobId, PollOutcome, PollState};

impl Session {
    /// Wait until the poller for `job_id` ends and return the rendered result
    ///
    /// Returns [`Error::JobFailed`] if the service reported `error`, and
    /// [`Error::PollingStopped`] if observation ended first (replaced by another job,
    /// [`stop`](Session::stop) called, or too many failed status checks). A job that is
    /// not being observed at all also yields `PollingStopped`.
    pub async fn wait_for_result(&self, job_id: &JobId) -> Result<ResultView> {
        // Subscribe before inspecting state so no terminal event slips between the two
        let mut events = self.subscribe();
        if let Some(settled) = self.settled(job_id) {
            return settled;
        }

        loop {
            match events.recv().await {
                Ok(Event::Completed { job_id: id, view }) if id == *job_id => return Ok(view),
                Ok(Event::JobFailed { job_id: id, message }) if id == *job_id => {
                    return Err(Error::JobFailed { job_id: id, message });
                }
                Ok(Event::PollAbandoned {
                    job_id: id,
                    consecutive_failures,
                }) if id == *job_id => {
                    return Err(abandoned(id, consecutive_failures));
                }
                Ok(Event::PollCancelled { job_id: id }) if id == *job_id => {
                    return Err(Error::PollingStopped {
                        job_id: id,
                        reason: "observation was cancelled".to_string(),
                    });
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!(job_id = %job_id, skipped, "event receiver lagged while waiting for result");
                    if let Some(settled) = self.settled(job_id) {
                        return settled;
                    }
                }
                Err(RecvError::Closed) => {
                    return Err(Error::PollingStopped {
                        job_id: job_id.clone(),
                        reason: "session closed".to_string(),
                    });
                }
            }
        }
    }

    /// Outcome of `job_id` if its poller already ended, None while it is still polled
    fn settled(&self, job_id: &JobId) -> Option<Result<ResultView>> {
        let state = self.lock_state();
        match &state.poll_state {
            PollState::Polling { job_id: active } if active == job_id => None,
            PollState::Terminated {
                job_id: finished,
                outcome,
            } if finished == job_id => Some(match outcome {
                PollOutcome::Completed => state.result.clone().ok_or_else(|| Error::PollingStopped {
                    job_id: job_id.clone(),
                    reason: "result is no longer available".to_string(),
                }),
                PollOutcome::Failed => Err(Error::JobFailed {
                    job_id: job_id.clone(),
                    message: state.failure.clone().unwrap_or_default(),
                }),
                // The failure count is not retained once the event has passed
                PollOutcome::Abandoned => Err(Error::PollingStopped {
                    job_id: job_id.clone(),
                    reason: "too many failed status checks".to_string(),
                }),
            }),
            _ => Some(Err(Error::PollingStopped {
                job_id: job_id.clone(),
                reason: "job is not being observed".to_string(),
            })),
        }
    }
}

fn abandoned(job_id: JobId, consecutive_failures: u32) -> Error {
    Error::PollingStopped {
        job_id,
        reason: format!("gave up after {} failed status checks", consecutive_failures),
    }
}
