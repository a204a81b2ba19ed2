//! Configuration types for vidtrans-client

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Connection settings for the processing service
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the service, e.g. "http://127.0.0.1:5000" (default: "http://127.0.0.1:5000")
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Timeout for submission requests, including the upload body (default: 10 minutes)
    #[serde(default = "default_submit_timeout", with = "duration_serde")]
    pub submit_timeout: Duration,

    /// Timeout for establishing a TCP connection (default: 10 seconds)
    #[serde(default = "default_connect_timeout", with = "duration_serde")]
    pub connect_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            submit_timeout: default_submit_timeout(),
            connect_timeout: default_connect_timeout(),
        }
    }
}

/// Status polling behavior
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Interval between status checks (default: 2000 ms)
    #[serde(default = "default_poll_interval", with = "duration_ms_serde")]
    pub interval: Duration,

    /// Timeout for a single status request (default: 10 seconds)
    #[serde(default = "default_status_timeout", with = "duration_ms_serde")]
    pub request_timeout: Duration,

    /// Retry policy applied to each status check
    ///
    /// Status requests are idempotent, so transient failures within a tick are retried
    /// before the tick is counted as failed.
    #[serde(default = "default_poll_retry")]
    pub retry: RetryConfig,

    /// Give up after this many consecutive failed ticks (default: 30, None = never)
    #[serde(default = "default_max_consecutive_failures")]
    pub max_consecutive_failures: Option<u32>,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval: default_poll_interval(),
            request_timeout: default_status_timeout(),
            retry: default_poll_retry(),
            max_consecutive_failures: default_max_consecutive_failures(),
        }
    }
}

/// Retry behavior configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (default: 2)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Initial delay before first retry (default: 250 ms)
    #[serde(default = "default_initial_delay", with = "duration_ms_serde")]
    pub initial_delay: Duration,

    /// Maximum delay between retries (default: 1 second)
    #[serde(default = "default_max_delay", with = "duration_ms_serde")]
    pub max_delay: Duration,

    /// Multiplier for exponential backoff (default: 2.0)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to delays (default: true)
    #[serde(default = "default_true")]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay: default_initial_delay(),
            max_delay: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// A policy that never retries
    pub fn none() -> Self {
        Self {
            max_attempts: 0,
            ..Default::default()
        }
    }
}

/// Client-side upload checks
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Largest accepted file in bytes, inclusive (default: 500 MiB)
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
        }
    }
}

/// User-facing notification behavior
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// How long a notification stays visible (default: 5 seconds)
    #[serde(default = "default_notification_lifetime", with = "duration_ms_serde")]
    pub lifetime: Duration,

    /// Maximum notifications visible at once; the oldest is dropped first (default: 5)
    #[serde(default = "default_max_visible")]
    pub max_visible: usize,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            lifetime: default_notification_lifetime(),
            max_visible: default_max_visible(),
        }
    }
}

/// Artifact download behavior
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// What to do when the destination file already exists
    #[serde(default)]
    pub file_collision: FileCollisionAction,

    /// Longest wait for the response headers or for the next body chunk (default: 60s)
    ///
    /// There is no limit on the download as a whole; a large artifact may take as long
    /// as it needs while bytes keep arriving.
    #[serde(default = "default_stall_timeout", with = "duration_serde")]
    pub stall_timeout: Duration,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            file_collision: FileCollisionAction::default(),
            stall_timeout: default_stall_timeout(),
        }
    }
}

/// File collision handling
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileCollisionAction {
    /// Append (1), (2), etc. to the filename (default)
    #[default]
    Rename,
    /// Overwrite the existing file
    Overwrite,
    /// Fail instead of touching the existing file
    Skip,
}

/// Main configuration for a [`Session`](crate::Session)
///
/// Every section has working defaults, so `Config::default()` talks to a service on
/// localhost, polling every two seconds.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Service connection
    #[serde(default)]
    pub server: ServerConfig,

    /// Status polling
    #[serde(default)]
    pub polling: PollingConfig,

    /// Upload checks
    #[serde(default)]
    pub upload: UploadConfig,

    /// Notifications
    #[serde(default)]
    pub notifications: NotificationConfig,

    /// Artifact download
    #[serde(default)]
    pub download: DownloadConfig,
}

impl Config {
    /// Configuration pointing at the given service base URL, everything else default
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            server: ServerConfig {
                base_url: base_url.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Check the configuration for values that cannot work
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.server.base_url).map_err(|e| Error::Config {
            message: format!("invalid base URL '{}': {}", self.server.base_url, e),
            key: Some("server.base_url".to_string()),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Config {
                message: format!("base URL must use http or https, got '{}'", url.scheme()),
                key: Some("server.base_url".to_string()),
            });
        }

        if self.polling.interval.is_zero() {
            return Err(Error::Config {
                message: "polling interval must be greater than zero".to_string(),
                key: Some("polling.interval".to_string()),
            });
        }

        if self.polling.request_timeout.is_zero() {
            return Err(Error::Config {
                message: "status request timeout must be greater than zero".to_string(),
                key: Some("polling.request_timeout".to_string()),
            });
        }

        if self.polling.max_consecutive_failures == Some(0) {
            return Err(Error::Config {
                message: "max_consecutive_failures must be at least 1 (use null to disable)"
                    .to_string(),
                key: Some("polling.max_consecutive_failures".to_string()),
            });
        }

        let multiplier = self.polling.retry.backoff_multiplier;
        if !multiplier.is_finite() || multiplier < 1.0 {
            return Err(Error::Config {
                message: format!(
                    "retry backoff multiplier must be a finite number >= 1.0, got {multiplier}"
                ),
                key: Some("polling.retry.backoff_multiplier".to_string()),
            });
        }

        if self.download.stall_timeout.is_zero() {
            return Err(Error::Config {
                message: "download stall timeout must be greater than zero".to_string(),
                key: Some("download.stall_timeout".to_string()),
            });
        }

        if self.notifications.max_visible == 0 {
            return Err(Error::Config {
                message: "at least one notification must be visible".to_string(),
                key: Some("notifications.max_visible".to_string()),
            });
        }

        Ok(())
    }

    /// Base URL without a trailing slash
    pub(crate) fn base_url(&self) -> &str {
        self.server.base_url.trim_end_matches('/')
    }
}

// Default value functions
fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_submit_timeout() -> Duration {
    Duration::from_secs(600)
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_poll_interval() -> Duration {
    Duration::from_millis(2000)
}

fn default_status_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_poll_retry() -> RetryConfig {
    RetryConfig::default()
}

fn default_max_consecutive_failures() -> Option<u32> {
    Some(30)
}

fn default_max_attempts() -> u32 {
    2
}

fn default_initial_delay() -> Duration {
    Duration::from_millis(250)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_true() -> bool {
    true
}

fn default_max_file_size() -> u64 {
    500 * 1024 * 1024
}

fn default_notification_lifetime() -> Duration {
    Duration::from_secs(5)
}

fn default_stall_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_max_visible() -> usize {
    5
}

// Duration serialization helper (whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// Duration serialization helper (milliseconds, for sub-second timings)
mod duration_ms_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
