//! Stream Worker Framework
//!
//! An in-process topic broker plus a generic worker for processing background jobs.
//!
//! ## Features
//!
//! - **Topic registry**: lazily created, name-addressed unbounded FIFO queues
//! - **Producer**: JSON-serializes jobs and publishes them keyed by job id
//! - **Generic worker**: `StreamWorker<J, P>` consumes a topic and drives any processor
//! - **Cooperative shutdown**: consumption is bound to a `CancellationToken`
//! - **Prometheus metrics**: built-in observability
//!
//! Consumer group names are labels only. Every subscriber of a topic competes for
//! the same queue, and a message leaves the queue as soon as it is consumed.
//!
//! ## Example
//!
//! ```ignore
//! use stream_worker::{StreamDef, StreamProducer, StreamWorker, TopicRegistry, WorkerConfig};
//!
//! struct MyStream;
//! impl StreamDef for MyStream {
//!     const TOPIC: &'static str = "my-jobs";
//!     const CONSUMER_GROUP: &'static str = "my-workers";
//! }
//!
//! let registry = Arc::new(TopicRegistry::new());
//! let producer = StreamProducer::from_stream_def::<MyStream>(registry.clone());
//! let worker = StreamWorker::new(registry, processor, WorkerConfig::from_stream_def::<MyStream>());
//!
//! let shutdown = CancellationToken::new();
//! tokio::spawn(async move { worker.run(shutdown).await });
//! producer.send(&job)?;
//! ```

mod broker;
mod config;
mod consumer;
mod error;
mod message;
pub mod metrics;
mod producer;
mod registry;
mod worker;

// Re-export main types
pub use broker::TopicRegistry;
pub use config::WorkerConfig;
pub use consumer::StreamConsumer;
pub use error::StreamError;
pub use message::Message;
pub use metrics::{init_metrics, render_metrics, StreamMetrics};
pub use producer::StreamProducer;
pub use registry::StreamDef;
pub use tokio_util::sync::CancellationToken;
pub use worker::{StreamJob, StreamProcessor, StreamWorker};
