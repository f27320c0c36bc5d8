//! Stream producer for job enqueuing
//!
//! Generic producer that can be used by any service to queue jobs
//! for background processing.
//!
//! # Example
//!
//! ```rust,ignore
//! use stream_worker::{StreamProducer, StreamDef};
//!
//! let producer = StreamProducer::from_stream_def::<InventoryJobStream>(registry);
//! let key = producer.send(&job)?;
//! ```

use crate::broker::TopicRegistry;
use crate::error::StreamError;
use crate::registry::StreamDef;
use crate::worker::StreamJob;
use std::sync::Arc;
use tracing::{debug, error};

/// Generic stream producer for enqueuing jobs.
///
/// Serializes jobs as JSON and publishes them keyed by `StreamJob::job_id`.
/// Publish failures are returned to the caller; nothing is retried here.
#[derive(Clone)]
pub struct StreamProducer {
    registry: Arc<TopicRegistry>,
    topic: String,
}

impl StreamProducer {
    /// Create a new StreamProducer for a specific topic.
    pub fn new(registry: Arc<TopicRegistry>, topic: impl Into<String>) -> Self {
        Self {
            registry,
            topic: topic.into(),
        }
    }

    /// Create a producer from a `StreamDef` implementation.
    pub fn from_stream_def<S: StreamDef>(registry: Arc<TopicRegistry>) -> Self {
        Self::new(registry, S::TOPIC)
    }

    /// Get the topic name.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Enqueue a job.
    ///
    /// Returns the message key (the job id).
    pub fn send<J: StreamJob>(&self, job: &J) -> Result<String, StreamError> {
        let key = job.job_id();
        let value = serde_json::to_string(job)?;

        debug!(topic = %self.topic, key = %key, "Producing message");

        self.registry
            .publish(&self.topic, key.clone(), value)
            .inspect_err(|e| {
                error!(topic = %self.topic, key = %key, error = %e, "Failed to publish job");
            })?;

        Ok(key)
    }
}
