//! Batch job state owned and mutated by the orchestrator.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a batch job run.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct JobId(String);

impl JobId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle of a batch job.
///
/// `Queued -> Preparing -> Processing -> {Completed | Failed | Aborted}`,
/// with `Holding` entered from `Processing` under repository backpressure
/// and left either back to `Processing` or to `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Preparing,
    Processing,
    Holding,
    Completed,
    Failed,
    Aborted,
}

impl JobStatus {
    /// True once the job can no longer make progress.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Aborted
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Preparing => "preparing",
            JobStatus::Processing => "processing",
            JobStatus::Holding => "holding",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Aborted => "aborted",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An operator-visible note recorded against a job (skipped groups,
/// retries, apply failures).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobNote {
    pub message: String,
    pub at: DateTime<Utc>,
}

/// Mutable run state of one batch job.
///
/// Owned exclusively by the orchestrator and persisted through the external
/// repository for resumability and progress polling. The cursor never
/// advances past a page whose writes have not been flushed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRunState {
    pub job_id: JobId,
    pub status: JobStatus,
    /// Opaque repository paging cursor; `None` before the first page.
    pub cursor: Option<String>,
    pub records_processed: usize,
    /// Non-master records found in duplicate groups.
    pub duplicates_found: usize,
    /// Duplicate records whose merge plans were applied successfully.
    pub records_merged: usize,
    /// Transitive groups dropped by the `max_group_size` safety valve.
    pub groups_dropped: usize,
    pub started_at: DateTime<Utc>,
    pub last_update: DateTime<Utc>,
    pub is_dry_run: bool,
    pub notes: Vec<JobNote>,
}

impl JobRunState {
    pub fn new(job_id: JobId, is_dry_run: bool, now: DateTime<Utc>) -> Self {
        Self {
            job_id,
            status: JobStatus::Queued,
            cursor: None,
            records_processed: 0,
            duplicates_found: 0,
            records_merged: 0,
            groups_dropped: 0,
            started_at: now,
            last_update: now,
            is_dry_run,
            notes: Vec::new(),
        }
    }

    pub fn note(&mut self, message: impl Into<String>, now: DateTime<Utc>) {
        self.notes.push(JobNote {
            message: message.into(),
            at: now,
        });
        self.last_update = now;
    }
}
