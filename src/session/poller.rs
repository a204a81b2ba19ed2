//! Status polling for the active job.
//!
//! `Idle -> Polling` on [`Session::start`]; every tick fetches the job status and folds it
//! into the status view; `completed` or `error` moves to `Terminated` and the timer stops.
//! Transport failures on a tick are logged and swallowed, up to the configured limit of
//! consecutive failures.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{ActivePoll, Session};
use crate::presenter::StatusView;
use crate::renderer::render_result;
use crate::retry::with_retry;
use crate::types::{Event, JobId, JobSnapshot, JobStatus, PollOutcome, PollState};

/// Fallback text when the service reports `error` without a message
const JOB_FAILED_FALLBACK: &str = "Processing failed";
const JOB_COMPLETED_TEXT: &str = "Video processing complete";

/// What the poller should do after a tick was applied
#[derive(Debug, PartialEq, Eq)]
enum TickOutcome {
    Continue,
    Terminated,
    /// A newer start/stop superseded this poller
    Superseded,
}

/// Decrements the live poller count when the polling task exits, however it exits
struct LiveGuard(Arc<AtomicUsize>);

impl LiveGuard {
    fn new(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter.clone())
    }
}

impl Drop for LiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Session {
    /// Start observing a job, replacing any job currently observed
    ///
    /// The first status check happens one polling interval after this call. Returns the
    /// job whose timer was cancelled, if one was live. The replaced job gets no terminal
    /// notification and keeps running on the server.
    ///
    /// Must be called within a tokio runtime.
    pub fn start(&self, job_id: JobId) -> Option<JobId> {
        let replaced = {
            let mut state = self.lock_state();
            let replaced = state.active.take().map(|previous| {
                previous.cancel.cancel();
                previous.job_id
            });

            state.generation += 1;
            let generation = state.generation;
            let cancel = CancellationToken::new();

            state.active = Some(ActivePoll {
                job_id: job_id.clone(),
                cancel: cancel.clone(),
            });
            state.poll_state = PollState::Polling {
                job_id: job_id.clone(),
            };
            state.status = Some(StatusView::for_job(job_id.clone()));
            state.result = None;
            state.failure = None;

            let session = self.clone();
            let task_job_id = job_id.clone();
            tokio::spawn(async move {
                session.run_poller(task_job_id, generation, cancel).await;
            });

            replaced
        };

        if let Some(previous) = &replaced {
            info!(job_id = %previous, replaced_by = %job_id, "stopped polling replaced job");
            self.emit(Event::PollCancelled {
                job_id: previous.clone(),
            });
        }
        debug!(job_id = %job_id, interval_ms = self.config.polling.interval.as_millis(), "polling started");

        replaced
    }

    /// Stop observing the active job
    ///
    /// Returns true if a timer was live. Only client-side observation stops.
    pub fn stop(&self) -> bool {
        let stopped = {
            let mut state = self.lock_state();
            state.generation += 1;
            let stopped = state.active.take().map(|active| {
                active.cancel.cancel();
                active.job_id
            });
            if stopped.is_some() {
                state.poll_state = PollState::Idle;
            }
            stopped
        };

        match stopped {
            Some(job_id) => {
                info!(job_id = %job_id, "polling stopped");
                self.emit(Event::PollCancelled { job_id });
                true
            }
            None => false,
        }
    }

    /// Number of polling tasks still running (cancelled ones exit at their next await)
    pub(crate) fn live_pollers(&self) -> usize {
        self.live_pollers.load(Ordering::SeqCst)
    }

    async fn run_poller(self, job_id: JobId, generation: u64, cancel: CancellationToken) {
        let _live = LiveGuard::new(&self.live_pollers);

        let period = self.config.polling.interval;
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let started = Instant::now();
        let mut consecutive_failures: u32 = 0;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let client = &self.client;
            let bound_id = &job_id;
            let fetched = tokio::select! {
                _ = cancel.cancelled() => break,
                result = with_retry(&self.config.polling.retry, move || client.fetch_status(bound_id)) => result,
            };

            match fetched {
                Ok(snapshot) => {
                    consecutive_failures = 0;
                    match self.apply_snapshot(generation, &job_id, &snapshot, started.elapsed()) {
                        TickOutcome::Continue => {}
                        TickOutcome::Terminated | TickOutcome::Superseded => break,
                    }
                }
                Err(e) => {
                    consecutive_failures += 1;
                    warn!(
                        job_id = %job_id,
                        error = %e,
                        consecutive_failures,
                        "status check failed"
                    );
                    self.emit(Event::PollFailed {
                        job_id: job_id.clone(),
                        error: e.to_string(),
                        consecutive_failures,
                    });

                    if let Some(max) = self.config.polling.max_consecutive_failures
                        && consecutive_failures >= max
                    {
                        self.abandon(generation, &job_id, consecutive_failures);
                        break;
                    }
                }
            }
        }

        debug!(job_id = %job_id, "poller exited");
    }

    fn apply_snapshot(
        &self,
        generation: u64,
        job_id: &JobId,
        snapshot: &JobSnapshot,
        elapsed: Duration,
    ) -> TickOutcome {
        let (view, result) = {
            let mut state = self.lock_state();
            if state.generation != generation {
                return TickOutcome::Superseded;
            }

            let status = state
                .status
                .get_or_insert_with(|| StatusView::for_job(job_id.clone()));
            status.apply(snapshot, elapsed);
            let view = status.clone();

            let result = match snapshot.status {
                JobStatus::Completed => {
                    let rendered = render_result(self.client.base_url(), job_id, snapshot);
                    state.result = Some(rendered.clone());
                    Some(Ok(rendered))
                }
                JobStatus::Error => {
                    let message = failure_message(snapshot);
                    state.failure = Some(message.clone());
                    Some(Err(message))
                }
                _ => None,
            };

            if let Some(outcome) = &result {
                state.active = None;
                state.poll_state = PollState::Terminated {
                    job_id: job_id.clone(),
                    outcome: if outcome.is_ok() {
                        PollOutcome::Completed
                    } else {
                        PollOutcome::Failed
                    },
                };
            }

            (view, result)
        };

        debug!(
            job_id = %job_id,
            status = %snapshot.status,
            progress = snapshot.progress,
            "status updated"
        );
        self.emit(Event::StatusUpdated {
            job_id: job_id.clone(),
            view,
        });

        match result {
            None => TickOutcome::Continue,
            Some(Ok(rendered)) => {
                info!(job_id = %job_id, "job completed");
                self.loading.dismiss();
                self.notifier.success(JOB_COMPLETED_TEXT);
                self.emit(Event::Completed {
                    job_id: job_id.clone(),
                    view: rendered,
                });
                TickOutcome::Terminated
            }
            Some(Err(message)) => {
                warn!(job_id = %job_id, error = %message, "job failed");
                self.loading.dismiss();
                self.notifier.error(message.clone());
                self.emit(Event::JobFailed {
                    job_id: job_id.clone(),
                    message,
                });
                TickOutcome::Terminated
            }
        }
    }

    fn abandon(&self, generation: u64, job_id: &JobId, consecutive_failures: u32) {
        {
            let mut state = self.lock_state();
            if state.generation != generation {
                return;
            }
            state.active = None;
            state.poll_state = PollState::Terminated {
                job_id: job_id.clone(),
                outcome: PollOutcome::Abandoned,
            };
        }

        warn!(job_id = %job_id, consecutive_failures, "giving up on status checks");
        self.notifier.error(format!(
            "Lost contact with the server after {} failed status checks",
            consecutive_failures
        ));
        self.emit(Event::PollAbandoned {
            job_id: job_id.clone(),
            consecutive_failures,
        });
    }
}

fn failure_message(snapshot: &JobSnapshot) -> String {
    snapshot
        .error
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .unwrap_or(JOB_FAILED_FALLBACK)
        .to_string()
}
