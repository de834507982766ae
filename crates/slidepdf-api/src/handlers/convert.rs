//! Upload submission handler.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use slidepdf_models::{file_extension, validate_upload_filename, Job};

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;

/// Conversion submission response.
#[derive(Serialize)]
pub struct ConversionResponse {
    /// Unique identifier for the conversion job
    pub job_id: String,
}

/// POST /convert
///
/// Accept a presentation upload and create a conversion job.
///
/// - Validates the filename and extension before anything is written.
/// - Spools the bytes to the upload directory under a fresh unique name,
///   preserving the original extension.
/// - Creates a `queued` job referencing the spooled file.
///
/// Returns:
/// - 202: `{"job_id": ...}`; conversion runs asynchronously, poll /status
/// - 400: missing/invalid filename or disallowed extension
pub async fn submit_conversion(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<ConversionResponse>)> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Malformed multipart body: {}", e)))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or_default().to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {}", e)))?;
            upload = Some((filename, data.to_vec()));
            break;
        }
    }

    let Some((filename, data)) = upload else {
        return Err(ApiError::bad_request("Missing 'file' field"));
    };

    validate_upload_filename(&filename).map_err(|e| ApiError::Validation(e.to_string()))?;

    // Spool under a fresh unique name, preserving the original extension
    let ext = file_extension(&filename);
    tokio::fs::create_dir_all(&state.config.upload_dir)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create upload dir: {}", e)))?;
    let input_path = state
        .config
        .upload_dir
        .join(format!("{}{}", Uuid::new_v4(), ext));
    tokio::fs::write(&input_path, &data)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to spool upload: {}", e)))?;

    let job = Job::new(filename, input_path.to_string_lossy().into_owned());
    if let Err(e) = state.store.create(&job).await {
        // No job record was created; remove the spooled file
        tokio::fs::remove_file(&input_path).await.ok();
        return Err(e.into());
    }

    metrics::record_job_submitted();
    info!(job_id = %job.id, filename = %job.filename, size = data.len(), "Accepted conversion job");

    Ok((
        StatusCode::ACCEPTED,
        Json(ConversionResponse {
            job_id: job.id.to_string(),
        }),
    ))
}
