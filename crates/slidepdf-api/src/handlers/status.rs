//! Job status polling handler.

use axum::extract::{Path, State};
use axum::Json;
use tracing::debug;

use slidepdf_models::{JobId, JobStatusView};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// GET /status/:job_id
///
/// Report the current state of a conversion job as a tagged body:
/// `{"status":"processing"}`, `{"status":"done","url":...}` or
/// `{"status":"failed","error":...}`. A failed job is still a successful
/// status query.
///
/// Returns:
/// - 200: tagged status body
/// - 404: no job with that id
pub async fn get_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<JobStatusView>> {
    debug!(job_id = %job_id, "Status query");

    let job = state
        .store
        .get(&JobId::from_string(job_id))
        .await?
        .ok_or_else(|| ApiError::not_found("Job not found"))?;

    Ok(Json(JobStatusView::from(&job)))
}
