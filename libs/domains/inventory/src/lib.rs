//! Inventory Domain
//!
//! Accepts inventory jobs, runs them through the in-process broker and
//! reports their outcome to registered webhooks.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐   produce    ┌──────────────┐   consume   ┌────────────────────┐
//! │  Handlers   │ ───────────▶ │ TopicRegistry│ ──────────▶ │ InventoryProcessor │
//! │ / Service   │              └──────────────┘             └─────────┬──────────┘
//! └─────────────┘                                                     │ notify_all
//!                                                           ┌─────────▼──────────┐
//!                                                           │   WebhookService   │
//!                                                           └────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_inventory::{InventoryJobStream, InventoryProcessor, InventoryService, WebhookService};
//! use stream_worker::{StreamProducer, StreamWorker, TopicRegistry, WorkerConfig};
//!
//! let registry = Arc::new(TopicRegistry::new());
//! let producer = StreamProducer::from_stream_def::<InventoryJobStream>(registry.clone());
//! let webhooks = Arc::new(WebhookService::new(Duration::from_secs(10)));
//!
//! let service = InventoryService::new(producer);
//! let processor = InventoryProcessor::new(webhooks.clone(), Duration::from_secs(5));
//! let worker = StreamWorker::new(
//!     registry,
//!     processor,
//!     WorkerConfig::from_stream_def::<InventoryJobStream>(),
//! );
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod processor;
pub mod service;
pub mod streams;
pub mod webhooks;

// Re-export commonly used types
pub use error::{InventoryError, InventoryResult};
pub use handlers::{ApiDoc, router};
pub use models::{
    ErrorFlag, InventoryJob, JobAcceptedResponse, JobStatus, ProcessInventoryQuery,
    RegisterWebhookRequest, SUCCESS_RESULT, WebhookRegisteredResponse, WebhookRegistration,
};
pub use processor::{DEFAULT_PROCESSING_DELAY, InventoryProcessor};
pub use service::InventoryService;
pub use streams::InventoryJobStream;
pub use webhooks::{DEFAULT_WEBHOOK_TIMEOUT, JobNotifier, WebhookService};
