//! Core types for vidtrans-client

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::presenter::StatusView;
use crate::renderer::ResultView;

/// Opaque identifier the service assigns to a processing job
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Create a new JobId
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for JobId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for JobId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl PartialEq<&str> for JobId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Job status as reported by `GET /api/status/{id}`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Accepted, waiting for a worker
    #[default]
    Queued,
    /// Being processed
    #[serde(alias = "processing")]
    Running,
    /// Finished; the artifact is available for download
    Completed,
    /// Finished with a failure
    Error,
    /// A status value this client does not know about
    #[serde(other)]
    Unknown,
}

impl JobStatus {
    /// `completed` and `error` end the job; no further transitions occur
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Error)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Error => "error",
            JobStatus::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Which audio track the processed video carries
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioMode {
    /// Replace the audio with synthesized speech of the translated text (default)
    #[default]
    Synth,
    /// Keep the original audio track
    Original,
}

impl AudioMode {
    /// Wire value sent in the `audio_mode` field
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioMode::Synth => "synth",
            AudioMode::Original => "original",
        }
    }
}

/// Options sent along with every submission
///
/// Constructed fresh per submission and never mutated once sent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadOptions {
    /// Burn translated subtitles into the output video (default: true)
    #[serde(default = "default_true")]
    pub add_subtitles: bool,

    /// Audio track selection
    #[serde(default)]
    pub audio_mode: AudioMode,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            add_subtitles: true,
            audio_mode: AudioMode::Synth,
        }
    }
}

fn default_true() -> bool {
    true
}

/// JSON body of `POST /api/process-video`
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProcessUrlRequest<'a> {
    /// The video page URL
    pub video_url: &'a str,
    /// Burn subtitles
    pub add_subtitles: bool,
    /// Audio track selection
    pub audio_mode: AudioMode,
}

/// Response of both submission endpoints
///
/// The service omits `success` on some 4xx responses, so a missing flag counts as failure.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct SubmitResponse {
    /// Whether the job was accepted
    #[serde(default)]
    pub success: bool,
    /// Identifier of the accepted job
    #[serde(default)]
    pub task_id: Option<String>,
    /// Failure description
    #[serde(default)]
    pub error: Option<String>,
    /// Informational message
    #[serde(default)]
    pub message: Option<String>,
}

/// Status payload returned by `GET /api/status/{id}`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSnapshot {
    /// Current status
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: JobStatus,
    /// Progress percentage (0-100)
    #[serde(default, deserialize_with = "deserialize_progress")]
    pub progress: u8,
    /// Human-readable description of the current step
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    /// Steps reached so far, oldest first
    #[serde(default, deserialize_with = "null_as_default")]
    pub steps: Vec<String>,
    /// Failure description (terminal `error` only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Original transcript
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    /// Translated transcript
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translated: Option<String>,
    /// Rewritten, polished translation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimized: Option<String>,
}

// The service reports progress as an integer but nothing stops it from sending
// a float, an out-of-range value or null (read as 0).
fn deserialize_progress<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0);
    Ok(value.clamp(0.0, 100.0).round() as u8)
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Textual and binary by-products of a completed job
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobResult {
    /// Locator of the processed video
    pub download_url: String,
    /// Original transcript
    pub transcript: Option<String>,
    /// Translated transcript
    pub translated: Option<String>,
    /// Rewritten translation
    pub optimized: Option<String>,
}

/// Lifecycle state of the status poller
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PollState {
    /// No job has been observed yet, or observation was stopped
    #[default]
    Idle,
    /// A timer is live for this job
    Polling {
        /// The observed job
        job_id: JobId,
    },
    /// The job reached an end state (or observation gave up)
    Terminated {
        /// The observed job
        job_id: JobId,
        /// How observation ended
        outcome: PollOutcome,
    },
}

impl PollState {
    /// The job id bound to the poller, if any
    pub fn job_id(&self) -> Option<&JobId> {
        match self {
            PollState::Idle => None,
            PollState::Polling { job_id } | PollState::Terminated { job_id, .. } => Some(job_id),
        }
    }
}

/// How a poller ended
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollOutcome {
    /// The job completed and its result was rendered
    Completed,
    /// The service reported a terminal error
    Failed,
    /// Too many consecutive status checks failed at the transport level
    Abandoned,
}

/// Identifier of a posted notification
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(pub u64);

impl std::fmt::Display for NotificationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Notification flavour
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// Positive confirmation
    Success,
    /// Something went wrong
    Error,
}

/// A transient user-facing message
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Identifier used for dismissal
    pub id: NotificationId,
    /// Message text
    pub text: String,
    /// Success or error
    pub kind: NotificationKind,
    /// When the notification was posted
    pub created_at: DateTime<Utc>,
}

/// Event emitted by a [`Session`](crate::Session)
///
/// A presentation layer subscribes to these and redraws; the session never renders anything itself.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Loading indicator shown or hidden
    Loading {
        /// True while a submission request is outstanding
        visible: bool,
    },

    /// A job was accepted by the service and polling started
    Submitted {
        /// The new job
        job_id: JobId,
    },

    /// Observation of a job stopped without a terminal status (replaced or stopped)
    PollCancelled {
        /// The job that is no longer observed
        job_id: JobId,
    },

    /// The status view changed
    StatusUpdated {
        /// The observed job
        job_id: JobId,
        /// New status view
        view: StatusView,
    },

    /// A status check failed at the transport level; polling continues
    PollFailed {
        /// The observed job
        job_id: JobId,
        /// Error description
        error: String,
        /// Number of consecutive failed checks including this one
        consecutive_failures: u32,
    },

    /// The job completed and its result was rendered
    Completed {
        /// The finished job
        job_id: JobId,
        /// Rendered result
        view: ResultView,
    },

    /// The job reached the terminal `error` status
    JobFailed {
        /// The failed job
        job_id: JobId,
        /// Failure message
        message: String,
    },

    /// Polling gave up after repeated transport failures
    PollAbandoned {
        /// The job that is no longer observed
        job_id: JobId,
        /// Consecutive failures observed
        consecutive_failures: u32,
    },

    /// A notification became visible
    Notified {
        /// The notification
        notification: Notification,
    },

    /// A notification was removed
    NotificationDismissed {
        /// The removed notification
        id: NotificationId,
    },
}
