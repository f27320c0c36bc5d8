//! Prometheus metrics for the broker and stream workers
//!
//! Provides observability into topic traffic and worker performance.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use std::time::Duration;
use tracing::{info, warn};

static PROMETHEUS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Initialize Prometheus metrics
///
/// Call this once at startup. Subsequent calls return the existing handle.
/// Returns `None` if another global recorder was already installed.
pub fn init_metrics() -> Option<&'static PrometheusHandle> {
    let handle = PROMETHEUS_HANDLE.get_or_try_init(|| {
        let handle = PrometheusBuilder::new().install_recorder()?;
        info!("Prometheus metrics initialized");
        Ok::<_, metrics_exporter_prometheus::BuildError>(handle)
    });

    match handle {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!(error = %e, "Failed to install Prometheus recorder");
            None
        }
    }
}

/// Render metrics in Prometheus format
pub fn render_metrics() -> String {
    PROMETHEUS_HANDLE
        .get()
        .map(|h| h.render())
        .unwrap_or_default()
}

/// Record a message accepted by a topic.
pub(crate) fn message_published(topic: &str) {
    counter!("broker_messages_published_total", "topic" => topic.to_string()).increment(1);
}

/// Record a message handed to a subscriber.
pub(crate) fn message_consumed(topic: &str, group: &str) {
    counter!(
        "broker_messages_consumed_total",
        "topic" => topic.to_string(),
        "group" => group.to_string()
    )
    .increment(1);
}

/// Record an acknowledgment.
pub(crate) fn message_committed(topic: &str, group: &str) {
    counter!(
        "broker_messages_committed_total",
        "topic" => topic.to_string(),
        "group" => group.to_string()
    )
    .increment(1);
}

/// Update the buffered message gauge for a topic.
pub(crate) fn topic_depth(topic: &str, depth: usize) {
    gauge!("broker_topic_depth", "topic" => topic.to_string()).set(depth as f64);
}

/// Stream worker metrics helper
#[derive(Clone)]
pub struct StreamMetrics {
    /// Topic name for labeling
    topic: String,
    /// Processor name for labeling
    processor_name: String,
}

impl StreamMetrics {
    /// Create new StreamMetrics
    pub fn new(topic: impl Into<String>, processor_name: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            processor_name: processor_name.into(),
        }
    }

    /// Record a job being processed successfully
    pub fn job_processed(&self, duration: Duration) {
        counter!(
            "stream_worker_jobs_processed_total",
            "topic" => self.topic.clone(),
            "processor" => self.processor_name.clone(),
            "status" => "success"
        )
        .increment(1);

        histogram!(
            "stream_worker_job_duration_seconds",
            "topic" => self.topic.clone(),
            "processor" => self.processor_name.clone()
        )
        .record(duration.as_secs_f64());
    }

    /// Record a message that could not be handled
    pub fn job_failed(&self, kind: &'static str) {
        counter!(
            "stream_worker_jobs_processed_total",
            "topic" => self.topic.clone(),
            "processor" => self.processor_name.clone(),
            "status" => "failed"
        )
        .increment(1);

        counter!(
            "stream_worker_job_errors_total",
            "topic" => self.topic.clone(),
            "processor" => self.processor_name.clone(),
            "kind" => kind
        )
        .increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = StreamMetrics::new("inventory-jobs", "test_processor");
        assert_eq!(metrics.topic, "inventory-jobs");
        assert_eq!(metrics.processor_name, "test_processor");
    }

    #[test]
    fn test_render_is_stable_after_init() {
        let first = init_metrics().is_some();
        let second = init_metrics().is_some();
        assert_eq!(first, second);

        message_published("metrics-test");
        if first {
            assert!(render_metrics().contains("broker_messages_published_total"));
        }
    }
}
