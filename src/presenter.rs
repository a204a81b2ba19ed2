//! Display formatting and the status view model.
//!
//! Nothing here renders; these are the values a presentation layer draws.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::types::{JobId, JobSnapshot, JobStatus};

const SIZE_UNITS: &[&str] = &["Bytes", "KB", "MB", "GB", "TB"];

/// Human-readable byte count with binary (1024) steps, e.g. `1.5 MB`
///
/// Values are rounded to two decimals with trailing zeros dropped.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, SIZE_UNITS[unit])
}

/// `m:ss` below an hour, `h:mm:ss` above
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}

/// Rendering state of one step in the step list
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepState {
    /// Finished
    Completed,
    /// The most recent step
    Current,
}

/// One line of the step list
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepView {
    /// Step description as reported by the service
    pub label: String,
    /// Completed or current
    pub state: StepState,
}

/// What the status surface shows for the active job
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusView {
    /// The observed job
    pub job_id: Option<JobId>,
    /// Last reported status
    pub status: JobStatus,
    /// Progress bar value (0-100)
    pub progress: u8,
    /// Status message line
    pub message: String,
    /// Step list
    pub steps: Vec<StepView>,
    /// Time since polling started for this job
    #[serde(with = "elapsed_serde")]
    pub elapsed: Duration,
}

impl StatusView {
    /// Fresh view for a newly observed job
    pub fn for_job(job_id: JobId) -> Self {
        Self {
            job_id: Some(job_id),
            ..Default::default()
        }
    }

    /// Fold a status payload into the view
    ///
    /// Progress, message and status always follow the payload. The step list is replaced
    /// only when the payload carries steps, so an empty list never blanks what is shown.
    pub fn apply(&mut self, snapshot: &JobSnapshot, elapsed: Duration) {
        self.status = snapshot.status;
        self.progress = snapshot.progress.min(100);
        self.message = snapshot.message.clone();
        self.elapsed = elapsed;

        if !snapshot.steps.is_empty() {
            self.steps = step_views(&snapshot.steps);
        }
    }

    /// Progress formatted for a label, e.g. `55%`
    pub fn progress_label(&self) -> String {
        format!("{}%", self.progress)
    }

    /// Elapsed time formatted for a label
    pub fn elapsed_label(&self) -> String {
        format_duration(self.elapsed)
    }
}

/// Every step before the last is completed; the last one is current
pub fn step_views(steps: &[String]) -> Vec<StepView> {
    let last = steps.len().saturating_sub(1);
    steps
        .iter()
        .enumerate()
        .map(|(index, label)| StepView {
            label: label.clone(),
            state: if index < last {
                StepState::Completed
            } else {
                StepState::Current
            },
        })
        .collect()
}

mod elapsed_serde {
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
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}
