//! Error types for vidtrans-client
//!
//! This module provides error handling for the library, including:
//! - Input validation errors raised before any request is sent
//! - Submission and job failures reported by the processing service
//! - Transport errors (network, timeout, unexpected HTTP status)

use crate::types::JobId;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for vidtrans-client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for vidtrans-client
///
/// This is the primary error type used throughout the library. Each variant includes
/// contextual information to help diagnose issues.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "server.base_url")
        key: Option<String>,
    },

    /// User input was rejected before any request was sent
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// The service refused the job or the submission request could not be completed
    #[error("submission failed: {reason}")]
    SubmissionFailed {
        /// Server-provided error text, or a generic description of the transport failure
        reason: String,
    },

    /// The service reported a terminal `error` status for the job
    #[error("job {job_id} failed: {message}")]
    JobFailed {
        /// The job that failed
        job_id: JobId,
        /// Server-supplied failure message (or a generic fallback)
        message: String,
    },

    /// Observation of the job ended without a terminal status
    #[error("stopped observing job {job_id}: {reason}")]
    PollingStopped {
        /// The job that is no longer observed
        job_id: JobId,
        /// Why observation ended (replaced, stopped, or too many failed checks)
        reason: String,
    },

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A request did not complete within its deadline
    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// The service answered with a non-success HTTP status
    #[error("unexpected HTTP status {status}: {body}")]
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
        /// Response body (possibly truncated)
        body: String,
    },

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Destination file already exists and the collision policy forbids replacing it
    #[error("file collision at {path}: {reason}")]
    FileCollision {
        /// The conflicting path
        path: PathBuf,
        /// Why the path could not be used
        reason: String,
    },

    /// Invalid file or directory path
    #[error("invalid path {path}: {reason}")]
    InvalidPath {
        /// The path that is invalid
        path: PathBuf,
        /// Why the path is invalid
        reason: String,
    },
}

/// Input validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The file's declared content type is not a video type
    #[error("not a video file (content type: {content_type})")]
    InvalidType {
        /// The declared content type
        content_type: String,
    },

    /// The file exceeds the upload size limit
    #[error("file is {size} bytes, limit is {limit} bytes")]
    TooLarge {
        /// Actual file size in bytes
        size: u64,
        /// Maximum accepted size in bytes
        limit: u64,
    },

    /// The URL field was empty after trimming
    #[error("no video URL given")]
    EmptyInput,

    /// The URL does not point at YouTube
    #[error("not a YouTube URL: {0}")]
    InvalidUrl(String),
}

impl ValidationError {
    /// Message shown to the user when this error is reported through the notifier
    pub fn user_message(&self) -> String {
        match self {
            ValidationError::InvalidType { .. } => "Please choose a valid video file".to_string(),
            ValidationError::TooLarge { limit, .. } => format!(
                "File size cannot exceed {}",
                crate::presenter::format_file_size(*limit)
            ),
            ValidationError::EmptyInput => "Please enter a YouTube video link".to_string(),
            ValidationError::InvalidUrl(_) => "Please enter a valid YouTube video link".to_string(),
        }
    }
}
