//! Inventory processor for stream workers.
//!
//! Implements `StreamProcessor<InventoryJob>`: drives each job to a terminal
//! state and hands it to the notifier.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use stream_worker::{StreamError, StreamProcessor};
use tracing::{info, warn};

use crate::error::InventoryError;
use crate::models::{InventoryJob, JobStatus, SUCCESS_RESULT};
use crate::webhooks::JobNotifier;

/// Default duration of the simulated inventory work
pub const DEFAULT_PROCESSING_DELAY: Duration = Duration::from_millis(5000);

/// Processes inventory jobs.
///
/// Jobs that arrive carrying an error are finalized and notified right away.
/// Everything else goes through the simulated work step first.
pub struct InventoryProcessor {
    notifier: Arc<dyn JobNotifier>,
    processing_delay: Duration,
}

impl InventoryProcessor {
    pub fn new(notifier: Arc<dyn JobNotifier>, processing_delay: Duration) -> Self {
        Self {
            notifier,
            processing_delay,
        }
    }

    /// Move `job` to its terminal state.
    async fn finish(&self, mut job: InventoryJob) -> Result<InventoryJob, StreamError> {
        if job.has_error() {
            warn!(
                job_id = %job.job_id(),
                error_code = job.error_code().unwrap_or_default(),
                error_message = job.error_message().unwrap_or_default(),
                "Job carries an error, skipping processing"
            );
            job.fail()?;
            return Ok(job);
        }

        // Reject before spending the processing delay on it.
        if job.is_finished() {
            return Err(InventoryError::InvalidTransition {
                job_id: job.job_id(),
                from: job.status(),
                to: JobStatus::Completed,
            }
            .into());
        }

        info!(job_id = %job.job_id(), "Starting inventory processing");
        tokio::time::sleep(self.processing_delay).await;
        job.complete(SUCCESS_RESULT)?;
        info!(job_id = %job.job_id(), "Completed inventory processing");

        Ok(job)
    }
}

#[async_trait]
impl StreamProcessor<InventoryJob> for InventoryProcessor {
    async fn process(&self, job: &InventoryJob) -> Result<(), StreamError> {
        info!(job_id = %job.job_id(), status = %job.status(), "Processing inventory job");

        let job = self.finish(job.clone()).await?;
        self.notifier.notify_all(&job).await;

        info!(job_id = %job.job_id(), status = %job.status(), "Finished inventory job");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "InventoryProcessor"
    }
}
