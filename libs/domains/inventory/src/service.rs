use stream_worker::StreamProducer;
use tracing::{info, warn};

use crate::error::InventoryResult;
use crate::models::{ErrorFlag, InventoryJob};

/// Inventory service - creates jobs and hands them to the broker
#[derive(Clone)]
pub struct InventoryService {
    producer: StreamProducer,
}

impl InventoryService {
    pub fn new(producer: StreamProducer) -> Self {
        Self { producer }
    }

    /// Topic jobs are published to.
    pub fn topic(&self) -> &str {
        self.producer.topic()
    }

    /// Create a job, optionally pre-flagged with an error, and publish it.
    ///
    /// Unknown flags are ignored. Returns as soon as the broker accepted the
    /// job; processing happens in the background.
    pub fn submit(&self, error_flag: Option<&str>) -> InventoryResult<InventoryJob> {
        let flag = ErrorFlag::parse(error_flag);
        if let (None, Some(raw)) = (flag, error_flag.filter(|s| !s.is_empty())) {
            warn!(error_flag = %raw, "Ignoring unknown error flag");
        }

        let job = flag.map_or_else(InventoryJob::new, InventoryJob::flagged);
        info!(
            job_id = %job.job_id(),
            error_flag = ?flag,
            topic = %self.producer.topic(),
            "Created inventory job"
        );

        self.producer.send(&job)?;
        Ok(job)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InventoryError;
    use crate::models::JobStatus;
    use std::sync::Arc;
    use stream_worker::TopicRegistry;

    fn service() -> (Arc<TopicRegistry>, InventoryService) {
        let registry = Arc::new(TopicRegistry::new());
        let producer = StreamProducer::new(Arc::clone(&registry), "inventory-jobs");
        (registry, InventoryService::new(producer))
    }

    #[test]
    fn test_submit_publishes_pending_job() {
        let (registry, service) = service();

        let job = service.submit(None).unwrap();

        assert_eq!(job.status(), JobStatus::Pending);
        assert_eq!(registry.depth("inventory-jobs"), 1);
        assert_eq!(service.topic(), "inventory-jobs");
    }

    #[test]
    fn test_submit_with_flag_pre_seeds_error() {
        let (_registry, service) = service();

        let job = service.submit(Some("db")).unwrap();
        assert_eq!(job.status(), JobStatus::Error);
        assert_eq!(job.error_code(), Some("DATABASE_ERROR"));
    }

    #[test]
    fn test_unknown_flag_is_same_as_no_flag() {
        let (_registry, service) = service();

        let job = service.submit(Some("SOMETHING_ELSE")).unwrap();
        assert_eq!(job.status(), JobStatus::Pending);
        assert!(!job.has_error());
    }

    #[test]
    fn test_submit_fails_when_broker_closed() {
        let (registry, service) = service();
        registry.close();

        let err = service.submit(None).unwrap_err();
        assert!(matches!(err, InventoryError::Publish(_)));
    }
}
