//! Core worker traits and the generic StreamWorker implementation.
//!
//! This module provides:
//! - `StreamJob` trait for job payloads
//! - `StreamProcessor` trait for job processors
//! - `StreamWorker` struct for running the worker loop

use crate::broker::TopicRegistry;
use crate::config::WorkerConfig;
use crate::consumer::StreamConsumer;
use crate::error::StreamError;
use crate::message::Message;
use crate::metrics::StreamMetrics;
use async_trait::async_trait;
use futures::StreamExt;
use serde::{Serialize, de::DeserializeOwned};
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Trait for stream job payloads.
///
/// Domain models that travel through a topic implement this trait. The job id
/// becomes the message key.
///
/// # Example
///
/// ```rust,ignore
/// use stream_worker::StreamJob;
///
/// #[derive(Serialize, Deserialize)]
/// struct InventoryJob {
///     job_id: Uuid,
///     status: JobStatus,
/// }
///
/// impl StreamJob for InventoryJob {
///     fn job_id(&self) -> String {
///         self.job_id.to_string()
///     }
/// }
/// ```
pub trait StreamJob: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Returns the job ID for logging and keying.
    fn job_id(&self) -> String;
}

/// Trait for job processors.
///
/// Domain handlers implement this trait to process jobs from a topic.
///
/// # Example
///
/// ```rust,ignore
/// use stream_worker::{StreamProcessor, StreamError};
///
/// #[async_trait]
/// impl StreamProcessor<InventoryJob> for InventoryProcessor {
///     async fn process(&self, job: &InventoryJob) -> Result<(), StreamError> {
///         self.webhooks.notify_all(job).await;
///         Ok(())
///     }
///
///     fn name(&self) -> &'static str {
///         "InventoryProcessor"
///     }
/// }
/// ```
#[async_trait]
pub trait StreamProcessor<J: StreamJob>: Send + Sync {
    /// Process a single job.
    ///
    /// Return `Ok(())` for success. An `Err` is logged and the message is
    /// left uncommitted; the worker moves on to the next message.
    async fn process(&self, job: &J) -> Result<(), StreamError>;

    /// Get the processor name for logging.
    fn name(&self) -> &'static str;
}

/// Generic stream worker that processes jobs using a processor.
///
/// Messages are handled strictly one at a time, in publish order. Each
/// message is deserialized, processed on its own task (so a panicking
/// processor cannot take the worker down) and committed only on success.
/// A failure in any step is logged and the loop continues.
pub struct StreamWorker<J, P>
where
    J: StreamJob,
    P: StreamProcessor<J>,
{
    consumer: StreamConsumer,
    processor: Arc<P>,
    config: WorkerConfig,
    metrics: StreamMetrics,
    _phantom: PhantomData<J>,
}

impl<J, P> StreamWorker<J, P>
where
    J: StreamJob,
    P: StreamProcessor<J> + 'static,
{
    /// Create a new stream worker.
    pub fn new(registry: Arc<TopicRegistry>, processor: P, config: WorkerConfig) -> Self {
        Self::with_arc_processor(registry, Arc::new(processor), config)
    }

    /// Create a new stream worker with an Arc processor.
    pub fn with_arc_processor(
        registry: Arc<TopicRegistry>,
        processor: Arc<P>,
        config: WorkerConfig,
    ) -> Self {
        let consumer = StreamConsumer::new(registry, config.clone());
        let metrics = StreamMetrics::new(config.topic.clone(), processor.name());

        Self {
            consumer,
            processor,
            config,
            metrics,
            _phantom: PhantomData,
        }
    }

    /// Get the worker configuration.
    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Run the worker loop.
    ///
    /// Consumes the configured topic until `shutdown` is cancelled, then
    /// returns `Ok(())`. A job already being processed when shutdown is
    /// requested runs to completion. If the subscription ends for any other
    /// reason (the registry was closed) the worker returns `StreamError::Closed`.
    pub async fn run(&self, shutdown: CancellationToken) -> Result<(), StreamError> {
        info!(
            consumer_id = %self.config.consumer_id,
            topic = %self.config.topic,
            group = %self.config.consumer_group,
            processor = %self.processor.name(),
            "Starting stream worker"
        );

        let mut messages = Box::pin(self.consumer.messages(shutdown.clone()));

        while let Some(message) = messages.next().await {
            if let Err(e) = self.process_message(&message).await {
                self.metrics.job_failed(e.kind());
                error!(
                    topic = %self.config.topic,
                    key = %message.key,
                    kind = e.kind(),
                    error = %e,
                    "Failed to handle message"
                );
            }
        }

        if shutdown.is_cancelled() {
            info!(consumer_id = %self.config.consumer_id, "Stream worker shutting down");
            Ok(())
        } else {
            warn!(
                consumer_id = %self.config.consumer_id,
                topic = %self.config.topic,
                "Subscription ended without shutdown request"
            );
            Err(StreamError::Closed(self.config.topic.clone()))
        }
    }

    /// Handle one message: deserialize, process, commit.
    ///
    /// Returns the first error encountered. The message is committed only
    /// when processing succeeds.
    pub async fn process_message(&self, message: &Message) -> Result<(), StreamError> {
        debug!(topic = %self.config.topic, key = %message.key, "Received message");

        let job: J = serde_json::from_str(&message.value)?;
        let job_id = job.job_id();
        let start = Instant::now();

        let processor = Arc::clone(&self.processor);
        let outcome = tokio::spawn(async move { processor.process(&job).await }).await;

        match outcome {
            Ok(Ok(())) => {
                self.consumer.commit(message);
                self.metrics.job_processed(start.elapsed());
                debug!(
                    job_id = %job_id,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Job processed"
                );
                Ok(())
            }
            Ok(Err(e)) => Err(e),
            Err(join_error) if join_error.is_panic() => Err(StreamError::processing(format!(
                "processor '{}' panicked on job {}",
                self.processor.name(),
                job_id
            ))),
            Err(join_error) => Err(StreamError::Internal(join_error.to_string())),
        }
    }
}
