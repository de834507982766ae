//! Pipeline driver for a single claimed job.
//!
//! Read input -> convert -> upload -> presign -> record terminal state.
//! Whatever happens in between, the ephemeral input file is removed when the
//! processing scope exits.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use metrics::counter;
use tracing::{debug, error, warn};

use slidepdf_convert::{ConvertClient, ConvertConfig};
use slidepdf_jobstore::JobStore;
use slidepdf_models::Job;
use slidepdf_storage::{R2Client, R2Config};

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};

/// Target format sent to the conversion daemon.
pub const TARGET_FORMAT: &str = "pdf";

/// Content type for converted objects.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

const JOBS_PROCESSED_TOTAL: &str = "slidepdf_worker_jobs_processed_total";

/// Clients shared by every processing loop of a worker instance.
pub struct ProcessingContext {
    pub convert: ConvertClient,
    pub storage: R2Client,
    pub config: WorkerConfig,
}

impl ProcessingContext {
    /// Create a processing context from the environment.
    pub async fn new(config: WorkerConfig) -> WorkerResult<Self> {
        let convert = ConvertClient::new(ConvertConfig::from_env()?)?;
        let storage = R2Client::new(R2Config::from_env()?).await?;
        Ok(Self {
            convert,
            storage,
            config,
        })
    }
}

/// Process one claimed job to a terminal state.
///
/// Every failure is captured and written to the store as `failed`; nothing
/// propagates past this function. The input file is deleted when the scope
/// exits, including on panic.
pub async fn process_job(ctx: &ProcessingContext, store: &JobStore, job: Job) {
    let input = PathBuf::from(&job.input_ref);
    let _cleanup = scopeguard::guard(input, |path| remove_input_file(&path));

    match run_pipeline(ctx, &job).await {
        Ok(url) => {
            if let Err(e) = store.complete(&job.id, &url).await {
                // Fatal for this job: the record refused the transition
                error!(job_id = %job.id, "Failed to record completion: {}", e);
            } else {
                counter!(JOBS_PROCESSED_TOTAL, "outcome" => "done").increment(1);
            }
        }
        Err(e) => {
            warn!(job_id = %job.id, "Pipeline failed: {}", e);
            if let Err(store_err) = store.fail(&job.id, &e.to_string()).await {
                error!(job_id = %job.id, "Failed to record failure: {}", store_err);
            } else {
                counter!(JOBS_PROCESSED_TOTAL, "outcome" => "failed").increment(1);
            }
        }
    }
}

async fn run_pipeline(ctx: &ProcessingContext, job: &Job) -> WorkerResult<String> {
    let source = tokio::fs::read(&job.input_ref).await?;
    debug!(job_id = %job.id, size = source.len(), "Read input file");

    let converted = ctx
        .convert
        .convert(source, &job.filename, TARGET_FORMAT, &[])
        .await?;

    let key = object_key(&ctx.config.storage_prefix, &job.filename, Utc::now());
    ctx.storage
        .upload_bytes(converted, &key, PDF_CONTENT_TYPE)
        .await?;

    let url = ctx
        .storage
        .presign_get(&key, ctx.config.presign_ttl)
        .await
        .map_err(WorkerError::Storage)?;

    Ok(url)
}

/// Date-partitioned object key for a converted upload, e.g.
/// `conversions/2025/01/01/deck.pdf`.
pub fn object_key(prefix: &str, filename: &str, date: DateTime<Utc>) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("converted");
    format!("{}/{}/{}.pdf", prefix, date.format("%Y/%m/%d"), stem)
}

fn remove_input_file(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "Removed input file"),
        // Already gone counts as removed
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), "Failed to remove input file: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_object_key_is_date_partitioned() {
        let date = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(
            object_key("conversions", "deck.pptx", date),
            "conversions/2025/01/01/deck.pdf"
        );
    }

    #[test]
    fn test_object_key_strips_only_last_extension() {
        let date = Utc.with_ymd_and_hms(2025, 3, 9, 0, 0, 0).unwrap();
        assert_eq!(
            object_key("conversions", "q1.review.ppt", date),
            "conversions/2025/03/09/q1.review.pdf"
        );
    }

    #[test]
    fn test_object_key_falls_back_for_unusable_names() {
        let date = Utc.with_ymd_and_hms(2025, 3, 9, 0, 0, 0).unwrap();
        assert_eq!(
            object_key("conversions", "", date),
            "conversions/2025/03/09/converted.pdf"
        );
    }

    #[test]
    fn test_remove_input_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.pptx");
        std::fs::write(&path, b"bytes").unwrap();

        remove_input_file(&path);
        assert!(!path.exists());

        // Second removal is a no-op
        remove_input_file(&path);
    }
}
