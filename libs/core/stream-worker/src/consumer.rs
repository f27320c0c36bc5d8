//! Stream consumer
//!
//! Binds a `WorkerConfig` to a registry: subscribes to the configured topic
//! and records acknowledgments under the configured group.

use crate::broker::TopicRegistry;
use crate::config::WorkerConfig;
use crate::message::Message;
use futures::Stream;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Stream consumer for one topic and consumer group
pub struct StreamConsumer {
    registry: Arc<TopicRegistry>,
    config: WorkerConfig,
}

impl StreamConsumer {
    /// Create a new StreamConsumer
    pub fn new(registry: Arc<TopicRegistry>, config: WorkerConfig) -> Self {
        Self { registry, config }
    }

    /// Get the topic name
    pub fn topic(&self) -> &str {
        &self.config.topic
    }

    /// Get the consumer group
    pub fn consumer_group(&self) -> &str {
        &self.config.consumer_group
    }

    /// Get the consumer ID
    pub fn consumer_id(&self) -> &str {
        &self.config.consumer_id
    }

    /// Subscribe to the configured topic.
    ///
    /// The stream ends when `cancel` fires or the registry is closed and drained.
    pub fn messages(
        &self,
        cancel: CancellationToken,
    ) -> impl Stream<Item = Message> + Send + use<> {
        self.registry
            .subscribe(&self.config.topic, &self.config.consumer_group, cancel)
    }

    /// Acknowledge a successfully processed message.
    pub fn commit(&self, message: &Message) {
        self.registry
            .commit(&self.config.topic, &self.config.consumer_group, &message.key);
    }
}
