//! # vidtrans-client
//!
//! Async client for a video translation service: submit a video (file upload or
//! YouTube link), follow the job's progress, and render the finished result.
//!
//! ## Design Philosophy
//!
//! vidtrans-client is designed to be:
//! - **Headless** - No UI; a presentation layer subscribes to events and redraws
//! - **One job at a time** - Submitting a new job replaces observation of the previous one
//! - **Forgiving** - Transient network failures during polling never reach the user
//! - **Library-first** - No CLI, no logging subscriber; embed it and wire up your own
//!
//! ## Quick Start
//!
//! ```no_run
//! use vidtrans_client::{Config, Event, Session, UploadOptions, VideoFile};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let session = Session::new(Config::with_base_url("http://127.0.0.1:5000"))?;
//!
//!     // Subscribe to events
//!     let mut events = session.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             if let Event::StatusUpdated { view, .. } = event {
//!                 println!("{} {}", view.progress_label(), view.message);
//!             }
//!         }
//!     });
//!
//!     let file = VideoFile::from_path("lecture.mp4").await?;
//!     let job_id = session.submit_file(file, UploadOptions::default()).await?;
//!
//!     let result = session.wait_for_result(&job_id).await?;
//!     println!("watch at {}", result.video_src);
//!     session.download_artifact(&job_id, "downloads").await?;
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// HTTP access to the processing service
pub mod client;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Loading indicator with drop-guard semantics
pub mod loading;
/// Transient user-facing notifications
pub mod notifier;
/// Status view model and display formatting
pub mod presenter;
/// Result view model
pub mod renderer;
/// Retry logic with exponential backoff
pub mod retry;
/// Session: submission, polling and download (decomposed into focused submodules)
pub mod session;
/// Core types and events
pub mod types;
/// Utility functions
pub mod utils;
/// Input validation
pub mod validation;

// Re-export commonly used types
pub use client::ApiClient;
pub use config::{Config, FileCollisionAction, PollingConfig, RetryConfig, ServerConfig};
pub use error::{Error, Result, ValidationError};
pub use loading::{LoadingGuard, LoadingIndicator};
pub use notifier::Notifier;
pub use presenter::{StatusView, StepState, StepView, format_duration, format_file_size};
pub use renderer::{ResultView, TextBlock, TextKind, render_result};
pub use session::{DEFAULT_ARTIFACT_NAME, Session};
pub use types::{
    AudioMode, Event, JobId, JobResult, JobSnapshot, JobStatus, Notification, NotificationId,
    NotificationKind, PollOutcome, PollState, UploadOptions,
};
pub use validation::{VideoFile, validate_url, validate_video_file};
