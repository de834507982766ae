//! Job definitions for the conversion pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a conversion job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Job state.
///
/// Transitions form a DAG: `Queued -> Processing -> {Done | Failed}`.
/// Terminal states are never left, and a job cannot skip `Processing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// Job is waiting for a worker
    #[default]
    Queued,
    /// Job has been claimed and is being processed
    Processing,
    /// Job completed successfully
    Done,
    /// Job failed
    Failed,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Queued => "queued",
            JobState::Processing => "processing",
            JobState::Done => "done",
            JobState::Failed => "failed",
        }
    }

    /// Parse the wire/store representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "queued" => Some(JobState::Queued),
            "processing" => Some(JobState::Processing),
            "done" => Some(JobState::Done),
            "failed" => Some(JobState::Failed),
            _ => None,
        }
    }

    /// Check if this is a terminal state (no more transitions allowed).
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Done | JobState::Failed)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A conversion job.
///
/// Created by the gateway on upload, mutated only by the worker that claims
/// it, read by the status endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// Unique job ID (also the store key)
    pub id: JobId,

    /// Original upload filename (drives the storage key)
    pub filename: String,

    /// Path of the ephemeral source file
    pub input_ref: String,

    /// Job state
    #[serde(default)]
    pub state: JobState,

    /// Presigned download URL, set iff the job is `Done`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,

    /// Error message, set iff the job is `Failed`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Create a new queued job for an uploaded file.
    pub fn new(filename: impl Into<String>, input_ref: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: JobId::new(),
            filename: filename.into(),
            input_ref: input_ref.into(),
            state: JobState::Queued,
            result: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Start processing the job.
    pub fn start(mut self) -> Self {
        self.state = JobState::Processing;
        self.updated_at = Utc::now();
        self
    }

    /// Mark the job as done with its download URL.
    pub fn complete(mut self, url: impl Into<String>) -> Self {
        self.state = JobState::Done;
        self.result = Some(url.into());
        self.error = None;
        self.updated_at = Utc::now();
        self
    }

    /// Mark the job as failed.
    pub fn fail(mut self, error: impl Into<String>) -> Self {
        self.state = JobState::Failed;
        self.error = Some(error.into());
        self.result = None;
        self.updated_at = Utc::now();
        self
    }

    /// Check if the job is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }
}
