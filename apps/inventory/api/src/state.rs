//! Application state management.
//!
//! Shared between the HTTP handlers, the readiness probe and shutdown cleanup.

use domain_inventory::{InventoryService, WebhookService};
use std::sync::Arc;
use stream_worker::{StreamProducer, TopicRegistry};

/// Shared application state.
///
/// Cloning is cheap: every field is either an `Arc` or wraps one.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded from environment variables
    pub config: crate::config::Config,
    /// In-process broker shared by the producer and the worker
    pub registry: Arc<TopicRegistry>,
    pub service: InventoryService,
    pub webhooks: Arc<WebhookService>,
}

impl AppState {
    pub fn new(config: crate::config::Config) -> Self {
        let registry = Arc::new(TopicRegistry::new());
        let producer = StreamProducer::new(Arc::clone(&registry), config.broker.topic.clone());
        let webhooks = Arc::new(WebhookService::new(config.worker.webhook_timeout));

        Self {
            config,
            registry,
            service: InventoryService::new(producer),
            webhooks,
        }
    }
}
