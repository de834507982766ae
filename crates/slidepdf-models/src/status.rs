//! Status endpoint response union.
//!
//! The status endpoint returns one of three structurally different bodies,
//! discriminated by the `status` field. A queued job is reported as
//! `processing`: externally a job is either in flight or terminal.

use serde::{Deserialize, Serialize};

use crate::job::{Job, JobState};

/// Tagged view of a job as reported by `GET /status/{job_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobStatusView {
    /// Job is queued or being processed
    Processing,
    /// Job completed; `url` is a time-limited download link
    Done { url: String },
    /// Job failed; `error` is a human-readable message
    Failed { error: String },
}

impl From<&Job> for JobStatusView {
    fn from(job: &Job) -> Self {
        match job.state {
            JobState::Queued | JobState::Processing => JobStatusView::Processing,
            JobState::Done => JobStatusView::Done {
                // result is set for every done job; tolerate a corrupt record
                url: job.result.clone().unwrap_or_default(),
            },
            JobState::Failed => JobStatusView::Failed {
                error: job.error.clone().unwrap_or_default(),
            },
        }
    }
}
