//! Worker executor.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};
use uuid::Uuid;

use slidepdf_jobstore::JobStore;

use crate::config::WorkerConfig;
use crate::error::WorkerResult;
use crate::processor::{process_job, ProcessingContext};

/// Runs the claim -> process -> complete loops for one worker instance.
///
/// Horizontal scale-out is just more instances (or a higher concurrency)
/// against the same store; the atomic claim is the only coordination.
pub struct WorkerExecutor {
    config: WorkerConfig,
    store: Arc<JobStore>,
    shutdown: tokio::sync::watch::Sender<bool>,
    worker_name: String,
}

impl WorkerExecutor {
    /// Create a new executor.
    pub fn new(config: WorkerConfig, store: JobStore) -> Self {
        let (shutdown, _) = tokio::sync::watch::channel(false);
        let worker_name = format!("worker-{}", Uuid::new_v4());

        Self {
            config,
            store: Arc::new(store),
            shutdown,
            worker_name,
        }
    }

    /// Run the processing loops until shutdown is signalled.
    pub async fn run(&self) -> WorkerResult<()> {
        info!(
            "Starting worker executor '{}' with {} loops",
            self.worker_name, self.config.concurrency
        );

        let ctx = Arc::new(ProcessingContext::new(self.config.clone()).await?);

        let mut handles = Vec::with_capacity(self.config.concurrency);
        for i in 0..self.config.concurrency {
            let store = Arc::clone(&self.store);
            let ctx = Arc::clone(&ctx);
            let mut shutdown_rx = self.shutdown.subscribe();
            let name = format!("{}-{}", self.worker_name, i);

            handles.push(tokio::spawn(async move {
                info!(worker = %name, "Worker loop started");
                loop {
                    if *shutdown_rx.borrow() {
                        break;
                    }
                    tokio::select! {
                        _ = shutdown_rx.changed() => {
                            if *shutdown_rx.borrow() {
                                break;
                            }
                        }
                        claimed = store.claim_next() => match claimed {
                            Ok(job) => {
                                info!(worker = %name, job_id = %job.id, "Executing job");
                                process_job(&ctx, &store, job).await;
                            }
                            Err(e) => {
                                error!(worker = %name, "Error claiming job: {}", e);
                                // Back off on store errors
                                tokio::time::sleep(Duration::from_secs(5)).await;
                            }
                        }
                    }
                }
                info!(worker = %name, "Worker loop stopped");
            }));
        }

        for handle in handles {
            handle.await.ok();
        }

        info!("Worker executor stopped");
        Ok(())
    }

    /// Signal shutdown.
    pub fn shutdown(&self) {
        let _ = self.shutdown.send(true);
    }
}
