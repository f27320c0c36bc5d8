//! Webhook registration and fan-out delivery.

use async_trait::async_trait;
use metrics::counter;
use reqwest::Client;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::error::{InventoryError, InventoryResult};
use crate::models::{InventoryJob, WebhookRegistration};

/// Default bound on a single webhook delivery
pub const DEFAULT_WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// Delivers finished jobs to interested parties.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobNotifier: Send + Sync {
    /// Deliver `job` to every target.
    ///
    /// Individual failures are handled inside; this returns once every
    /// attempt has finished.
    async fn notify_all(&self, job: &InventoryJob);
}

/// In-memory webhook registry with concurrent fan-out.
///
/// Registrations live for the lifetime of the process; there is no
/// deregistration.
pub struct WebhookService {
    registrations: RwLock<Vec<Arc<WebhookRegistration>>>,
    client: Client,
    timeout: Duration,
}

impl WebhookService {
    /// Create a service whose deliveries are each bounded by `timeout`.
    pub fn new(timeout: Duration) -> Self {
        Self {
            registrations: RwLock::new(Vec::new()),
            client: Client::new(),
            timeout,
        }
    }

    /// Register a callback URL.
    ///
    /// Registering the same URL twice creates two independent registrations.
    /// The URL is stored as given; only an empty one is rejected.
    pub fn register(&self, callback_url: &str) -> InventoryResult<Arc<WebhookRegistration>> {
        if callback_url.is_empty() {
            return Err(InventoryError::Validation(
                "Callback URL is required".to_string(),
            ));
        }

        let registration = Arc::new(WebhookRegistration::new(callback_url));
        self.registrations
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::clone(&registration));

        info!(
            webhook_id = %registration.id,
            callback_url = %registration.callback_url,
            "Registered webhook"
        );
        Ok(registration)
    }

    /// Snapshot of the current registrations, in registration order.
    pub fn registrations(&self) -> Vec<Arc<WebhookRegistration>> {
        self.registrations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of registrations.
    pub fn len(&self) -> usize {
        self.registrations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// POST `job` to one registration.
    async fn deliver(
        client: Client,
        timeout: Duration,
        registration: Arc<WebhookRegistration>,
        job: Arc<InventoryJob>,
    ) -> InventoryResult<()> {
        let delivery_error = |reason: String| InventoryError::Delivery {
            webhook_id: registration.id,
            reason,
        };

        let response = client
            .post(&registration.callback_url)
            .timeout(timeout)
            .json(job.as_ref())
            .send()
            .await
            .map_err(|e| delivery_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(delivery_error(format!("callback returned {status}")));
        }

        Ok(())
    }
}

#[async_trait]
impl JobNotifier for WebhookService {
    async fn notify_all(&self, job: &InventoryJob) {
        let targets = self.registrations();
        if targets.is_empty() {
            info!(job_id = %job.job_id(), "No webhooks registered, nothing to notify");
            return;
        }

        let job = Arc::new(job.clone());
        let mut deliveries = JoinSet::new();

        for registration in targets {
            let client = self.client.clone();
            let job = Arc::clone(&job);
            let timeout = self.timeout;

            deliveries.spawn(async move {
                let webhook_id = registration.id;
                let outcome = Self::deliver(client, timeout, registration, Arc::clone(&job)).await;
                (webhook_id, outcome)
            });
        }

        while let Some(joined) = deliveries.join_next().await {
            match joined {
                Ok((webhook_id, Ok(()))) => {
                    counter!("webhook_deliveries_total", "outcome" => "success").increment(1);
                    info!(
                        webhook_id = %webhook_id,
                        job_id = %job.job_id(),
                        "Successfully notified webhook"
                    );
                }
                Ok((webhook_id, Err(e))) => {
                    counter!("webhook_deliveries_total", "outcome" => "failure").increment(1);
                    error!(
                        webhook_id = %webhook_id,
                        job_id = %job.job_id(),
                        error = %e,
                        "Failed to notify webhook"
                    );
                }
                Err(e) => {
                    counter!("webhook_deliveries_total", "outcome" => "failure").increment(1);
                    warn!(job_id = %job.job_id(), error = %e, "Webhook delivery task aborted");
                }
            }
        }
    }
}

impl Default for WebhookService {
    fn default() -> Self {
        Self::new(DEFAULT_WEBHOOK_TIMEOUT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ErrorFlag, JobStatus, SUCCESS_RESULT};
    use axum::http::StatusCode;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Instant;
    use test_utils::{WebhookSink, unreachable_url};

    fn completed_job() -> InventoryJob {
        let mut job = InventoryJob::new();
        job.complete(SUCCESS_RESULT).unwrap();
        job
    }

    #[test]
    fn test_register_rejects_empty_url() {
        let service = WebhookService::default();

        let err = service.register("").unwrap_err();
        assert!(matches!(err, InventoryError::Validation(_)));
        assert!(service.is_empty());
    }

    #[test]
    fn test_register_keeps_url_verbatim() {
        let service = WebhookService::default();

        let registration = service.register(" http://localhost:9000/hook ").unwrap();
        assert_eq!(registration.callback_url, " http://localhost:9000/hook ");
        assert_eq!(service.len(), 1);
    }

    #[test]
    fn test_register_adds_exactly_one_entry() {
        let service = WebhookService::default();

        let first = service.register("http://localhost:9000/hook").unwrap();
        assert_eq!(service.len(), 1);

        let second = service.register("http://localhost:9000/hook").unwrap();
        assert_eq!(service.len(), 2);
        assert_ne!(first.id, second.id);

        let ids: Vec<_> = service.registrations().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    #[tokio::test]
    async fn test_notify_without_registrations_returns() {
        let service = WebhookService::default();
        service.notify_all(&completed_job()).await;
    }

    #[tokio::test]
    async fn test_notify_reaches_new_registration() {
        let service = WebhookService::default();
        let sink = WebhookSink::start().await;
        service.register(&sink.url()).unwrap();

        let mut job = InventoryJob::flagged(ErrorFlag::Processing);
        job.fail().unwrap();
        service.notify_all(&job).await;

        let bodies = sink.received();
        assert_eq!(bodies.len(), 1);
        assert_eq!(bodies[0]["jobId"], job.job_id().to_string());
        assert_eq!(bodies[0]["status"], JobStatus::Error.to_string());
        assert_eq!(bodies[0]["errorCode"], "PROCESSING_ERROR");
    }

    #[tokio::test]
    async fn test_failures_are_isolated() {
        let service = WebhookService::new(Duration::from_secs(2));

        let healthy = WebhookSink::start().await;
        let broken = WebhookSink::start_with_status(StatusCode::INTERNAL_SERVER_ERROR).await;
        let other = WebhookSink::start().await;

        service.register(&healthy.url()).unwrap();
        service.register(&broken.url()).unwrap();
        service.register(&unreachable_url()).unwrap();
        service.register(&other.url()).unwrap();

        service.notify_all(&completed_job()).await;

        // notify_all returns only after every attempt finished
        assert_eq!(healthy.count(), 1);
        assert_eq!(broken.count(), 1);
        assert_eq!(other.count(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_register_during_fan_out() {
        const SINKS: usize = 8;

        let service = Arc::new(WebhookService::new(Duration::from_secs(2)));
        let mut sinks = Vec::with_capacity(SINKS);
        for _ in 0..SINKS {
            sinks.push(WebhookSink::start().await);
        }

        // Keep fanning out while registrations arrive
        let stop = Arc::new(AtomicBool::new(false));
        let notifier = tokio::spawn({
            let service = Arc::clone(&service);
            let stop = Arc::clone(&stop);
            async move {
                let job = completed_job();
                let mut rounds = 0usize;
                while !stop.load(Ordering::SeqCst) {
                    service.notify_all(&job).await;
                    rounds += 1;
                    tokio::task::yield_now().await;
                }
                rounds
            }
        });

        let registrations: Vec<_> = sinks
            .iter()
            .map(|sink| {
                let service = Arc::clone(&service);
                let url = sink.url();
                tokio::spawn(async move { service.register(&url).unwrap() })
            })
            .collect();
        for registration in registrations {
            registration.await.unwrap();
        }

        stop.store(true, Ordering::SeqCst);
        assert!(notifier.await.unwrap() > 0);

        assert_eq!(service.len(), SINKS);
        let mut urls: Vec<String> = service
            .registrations()
            .iter()
            .map(|r| r.callback_url.clone())
            .collect();
        urls.sort();
        let mut expected: Vec<String> = sinks.iter().map(|s| s.url()).collect();
        expected.sort();
        assert_eq!(urls, expected);

        let before: Vec<usize> = sinks.iter().map(|s| s.count()).collect();
        service.notify_all(&completed_job()).await;
        for (sink, before) in sinks.iter().zip(before) {
            assert_eq!(sink.count(), before + 1);
        }
    }

    #[tokio::test]
    async fn test_slow_callback_is_bounded_by_timeout() {
        let service = WebhookService::new(Duration::from_millis(200));

        let slow = WebhookSink::start_slow(Duration::from_secs(5)).await;
        let fast = WebhookSink::start().await;
        service.register(&slow.url()).unwrap();
        service.register(&fast.url()).unwrap();

        let started = Instant::now();
        service.notify_all(&completed_job()).await;

        assert!(started.elapsed() < Duration::from_secs(3));
        assert_eq!(fast.count(), 1);
    }
}
