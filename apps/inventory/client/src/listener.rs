//! Local webhook receiver

use axum::{Router, body::Bytes, extract::State, http::StatusCode, routing::post};
use domain_inventory::InventoryJob;
use eyre::Result;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};
use uuid::Uuid;

/// Receives job callbacks on `/webhook` and hands them to the caller.
pub struct WebhookListener {
    addr: SocketAddr,
    jobs: mpsc::UnboundedReceiver<InventoryJob>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl WebhookListener {
    /// Listen on all interfaces at `port` (0 picks a free one).
    pub async fn start(port: u16) -> Result<Self> {
        let (tx, jobs) = mpsc::unbounded_channel();
        let (shutdown, shutdown_rx) = oneshot::channel::<()>();

        let router = Router::new()
            .route("/webhook", post(receive))
            .with_state(tx);

        let listener = tokio::net::TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)).await?;
        let addr = listener.local_addr()?;

        tokio::spawn(async move {
            let server = axum::serve(listener, router).with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            });
            if let Err(e) = server.await {
                warn!(error = %e, "Webhook listener failed");
            }
        });

        info!("Webhook listener started at http://localhost:{}/webhook", addr.port());
        Ok(Self {
            addr,
            jobs,
            shutdown: Some(shutdown),
        })
    }

    /// Callback URL to register with the API.
    pub fn url(&self) -> String {
        format!("http://localhost:{}/webhook", self.addr.port())
    }

    /// Wait for the callback of `job_id`, skipping callbacks for other jobs.
    pub async fn wait_for_job(&mut self, job_id: Uuid, timeout: Duration) -> Result<InventoryJob> {
        let wait = async {
            while let Some(job) = self.jobs.recv().await {
                if job.job_id() == job_id {
                    return Some(job);
                }
                info!(job_id = %job.job_id(), "Ignoring callback for another job");
            }
            None
        };

        match tokio::time::timeout(timeout, wait).await {
            Ok(Some(job)) => Ok(job),
            Ok(None) => eyre::bail!("Webhook listener stopped before job {job_id} was reported"),
            Err(_) => eyre::bail!("No callback for job {job_id} within {timeout:?}"),
        }
    }
}

impl Drop for WebhookListener {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

async fn receive(
    State(tx): State<mpsc::UnboundedSender<InventoryJob>>,
    body: Bytes,
) -> StatusCode {
    match serde_json::from_slice::<InventoryJob>(&body) {
        Ok(job) => {
            let _ = tx.send(job);
        }
        Err(e) => warn!(error = %e, "Error parsing webhook data"),
    }
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_inventory::{ErrorFlag, SUCCESS_RESULT};

    async fn post(listener: &WebhookListener, body: String) -> reqwest::StatusCode {
        let url = format!("http://127.0.0.1:{}/webhook", listener.addr.port());
        reqwest::Client::new()
            .post(url)
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_waits_for_matching_job() {
        let mut listener = WebhookListener::start(0).await.unwrap();

        let mut other = InventoryJob::new();
        other.complete(SUCCESS_RESULT).unwrap();
        let mut wanted = InventoryJob::flagged(ErrorFlag::Db);
        wanted.fail().unwrap();

        post(&listener, serde_json::to_string(&other).unwrap()).await;
        post(&listener, serde_json::to_string(&wanted).unwrap()).await;

        let job = listener
            .wait_for_job(wanted.job_id(), Duration::from_secs(2))
            .await
            .unwrap();
        assert_eq!(job, wanted);
    }

    #[tokio::test]
    async fn test_malformed_callback_is_acknowledged() {
        let listener = WebhookListener::start(0).await.unwrap();
        assert_eq!(post(&listener, "{oops".to_string()).await, reqwest::StatusCode::OK);
    }

    #[tokio::test]
    async fn test_wait_times_out() {
        let mut listener = WebhookListener::start(0).await.unwrap();
        let err = listener
            .wait_for_job(Uuid::new_v4(), Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("No callback"));
    }
}
