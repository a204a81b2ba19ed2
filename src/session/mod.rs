//! Session: the single owner of the active job and its polling timer.
//!
//! The `Session` struct and its methods are organized by concern:
//! - [`submit`] - Validating input and submitting jobs
//! - [`poller`] - The repeating status check for the active job
//! - [`outcome`] - Awaiting the end of a job
//! - [`download`] - Saving the processed video to disk
//!
//! At most one job is observed at a time. Starting a new one cancels the previous
//! timer; the abandoned job keeps running on the server, only observation stops.

mod download;
mod outcome;
mod poller;
mod submit;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

pub use download::DEFAULT_ARTIFACT_NAME;

use std::sync::atomic::AtomicUsize;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::client::ApiClient;
use crate::config::Config;
use crate::error::Result;
use crate::loading::LoadingIndicator;
use crate::notifier::Notifier;
use crate::presenter::StatusView;
use crate::renderer::ResultView;
use crate::types::{Event, JobId, Notification, PollState};

/// Handle of the live polling task
pub(crate) struct ActivePoll {
    pub(crate) job_id: JobId,
    pub(crate) cancel: CancellationToken,
}

/// Everything the submitter and poller write, behind one lock
#[derive(Default)]
pub(crate) struct SessionState {
    /// Bumped on every start/stop; a poller only writes while its generation is current
    pub(crate) generation: u64,
    /// The live timer, if any
    pub(crate) active: Option<ActivePoll>,
    /// Poller lifecycle state
    pub(crate) poll_state: PollState,
    /// Status surface (None until the first job starts)
    pub(crate) status: Option<StatusView>,
    /// Result surface of the last completed job
    pub(crate) result: Option<ResultView>,
    /// Failure message of the last job that ended in `error`
    pub(crate) failure: Option<String>,
}

/// Client session for the processing service (cloneable - all fields are Arc-wrapped)
///
/// # Example
///
/// ```no_run
/// use vidtrans_client::{Config, Event, Session, UploadOptions};
///
/// # async fn example() -> vidtrans_client::Result<()> {
/// let session = Session::new(Config::with_base_url("http://127.0.0.1:5000"))?;
/// let mut events = session.subscribe();
///
/// session
///     .submit_url("https://youtu.be/abc123", UploadOptions::default())
///     .await?;
///
/// while let Ok(event) = events.recv().await {
///     match event {
///         Event::StatusUpdated { view, .. } => println!("{} {}", view.progress_label(), view.message),
///         Event::Completed { view, .. } => {
///             println!("download: {}", view.download_url);
///             break;
///         }
///         Event::JobFailed { message, .. } => {
///             eprintln!("failed: {message}");
///             break;
///         }
///         _ => {}
///     }
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Session {
    /// Configuration (wrapped in Arc for sharing with the polling task)
    pub(crate) config: Arc<Config>,
    /// HTTP access to the service
    pub(crate) client: ApiClient,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: broadcast::Sender<Event>,
    /// User-facing notifications
    pub(crate) notifier: Notifier,
    /// Submission loading indicator
    pub(crate) loading: LoadingIndicator,
    /// Active job, timer handle and view models
    pub(crate) state: Arc<Mutex<SessionState>>,
    /// Number of polling tasks that have not exited yet
    pub(crate) live_pollers: Arc<AtomicUsize>,
}

impl Session {
    /// Create a session after validating the configuration
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let client = ApiClient::new(&config)?;
        let (event_tx, _rx) = broadcast::channel(1000);
        let notifier = Notifier::new(config.notifications.clone(), event_tx.clone());
        let loading = LoadingIndicator::new(event_tx.clone());

        Ok(Self {
            config: Arc::new(config),
            client,
            event_tx,
            notifier,
            loading,
            state: Arc::new(Mutex::new(SessionState::default())),
            live_pollers: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Subscribe to session events
    ///
    /// Each subscriber receives every event emitted after it subscribed.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Session configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The job currently being polled
    pub fn active_job(&self) -> Option<JobId> {
        self.lock_state().active.as_ref().map(|a| a.job_id.clone())
    }

    /// Whether a polling timer is live
    pub fn is_polling(&self) -> bool {
        self.lock_state().active.is_some()
    }

    /// Poller lifecycle state
    pub fn poll_state(&self) -> PollState {
        self.lock_state().poll_state.clone()
    }

    /// Current status surface, if a job has been started
    pub fn status_view(&self) -> Option<StatusView> {
        self.lock_state().status.clone()
    }

    /// Result surface of the last completed job
    pub fn result_view(&self) -> Option<ResultView> {
        self.lock_state().result.clone()
    }

    /// Visible notifications, oldest first
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifier.active()
    }

    /// Notification queue
    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Loading indicator
    pub fn loading(&self) -> &LoadingIndicator {
        &self.loading
    }

    /// Download link for a job's processed video
    pub fn download_url(&self, job_id: &JobId) -> String {
        self.client.download_url(job_id)
    }

    // Poisoning is ignored: every writer leaves SessionState consistent between statements.
    pub(crate) fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(crate) fn emit(&self, event: Event) {
        // No subscribers is fine
        self.event_tx.send(event).ok();
    }
}
