//! Webhook capture server
//!
//! Provides a `WebhookSink` that accepts webhook POSTs on a random local port
//! and keeps every JSON body it receives.

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;

#[derive(Clone)]
struct SinkState {
    received: Arc<Mutex<Vec<Value>>>,
    status: Arc<AtomicU16>,
    delay: Duration,
}

async fn capture(State(state): State<SinkState>, Json(body): Json<Value>) -> StatusCode {
    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }
    state
        .received
        .lock()
        .expect("webhook sink lock poisoned")
        .push(body);
    StatusCode::from_u16(state.status.load(Ordering::SeqCst)).unwrap_or(StatusCode::OK)
}

/// Local webhook receiver for tests
///
/// The server is stopped when this struct is dropped.
///
/// # Example
///
/// ```no_run
/// use test_utils::WebhookSink;
/// use std::time::Duration;
///
/// # async fn example() {
/// let sink = WebhookSink::start().await;
/// println!("register {}", sink.url());
///
/// let bodies = sink.wait_for(1, Duration::from_secs(5)).await;
/// assert_eq!(bodies.len(), 1);
/// # }
/// ```
pub struct WebhookSink {
    addr: SocketAddr,
    state: SinkState,
    shutdown: Option<oneshot::Sender<()>>,
}

impl WebhookSink {
    /// Start a sink that answers every delivery with 200 OK.
    pub async fn start() -> Self {
        Self::spawn(StatusCode::OK, Duration::ZERO).await
    }

    /// Start a sink that answers every delivery with `status`.
    pub async fn start_with_status(status: StatusCode) -> Self {
        Self::spawn(status, Duration::ZERO).await
    }

    /// Start a sink that waits `delay` before answering.
    ///
    /// Bodies are recorded after the delay, so a caller that gives up
    /// early may still show up in `received()` later.
    pub async fn start_slow(delay: Duration) -> Self {
        Self::spawn(StatusCode::OK, delay).await
    }

    async fn spawn(status: StatusCode, delay: Duration) -> Self {
        let state = SinkState {
            received: Arc::new(Mutex::new(Vec::new())),
            status: Arc::new(AtomicU16::new(status.as_u16())),
            delay,
        };

        let app = Router::new()
            .route("/webhook", post(capture))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind webhook sink");
        let addr = listener
            .local_addr()
            .expect("Failed to read webhook sink address");

        let (tx, rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = rx.await;
                })
                .await;
        });

        tracing::info!(%addr, "Webhook sink ready");

        Self {
            addr,
            state,
            shutdown: Some(tx),
        }
    }

    /// Callback URL to register.
    pub fn url(&self) -> String {
        format!("http://{}/webhook", self.addr)
    }

    /// Change the status returned for subsequent deliveries.
    pub fn set_status(&self, status: StatusCode) {
        self.state.status.store(status.as_u16(), Ordering::SeqCst);
    }

    /// All bodies received so far, in arrival order.
    pub fn received(&self) -> Vec<Value> {
        self.state
            .received
            .lock()
            .expect("webhook sink lock poisoned")
            .clone()
    }

    /// Number of deliveries received so far.
    pub fn count(&self) -> usize {
        self.state
            .received
            .lock()
            .expect("webhook sink lock poisoned")
            .len()
    }

    /// Wait until at least `count` deliveries arrived and return them.
    ///
    /// Panics if they do not arrive within `timeout`.
    pub async fn wait_for(&self, count: usize, timeout: Duration) -> Vec<Value> {
        let arrived = crate::wait_until(timeout, || async { self.count() >= count }).await;
        assert!(
            arrived,
            "expected {} webhook deliveries within {:?}, got {}",
            count,
            timeout,
            self.count()
        );
        self.received()
    }
}

impl Drop for WebhookSink {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_sink_records_bodies_in_order() {
        let sink = WebhookSink::start().await;
        let client = reqwest::Client::new();

        for i in 0..3 {
            let response = client
                .post(sink.url())
                .json(&json!({ "n": i }))
                .send()
                .await
                .unwrap();
            assert_eq!(response.status(), reqwest::StatusCode::OK);
        }

        let bodies = sink.wait_for(3, Duration::from_secs(2)).await;
        assert_eq!(bodies, vec![json!({"n": 0}), json!({"n": 1}), json!({"n": 2})]);
    }

    #[tokio::test]
    async fn test_sink_returns_configured_status() {
        let sink = WebhookSink::start_with_status(StatusCode::INTERNAL_SERVER_ERROR).await;
        let client = reqwest::Client::new();

        let response = client.post(sink.url()).json(&json!({})).send().await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);

        sink.set_status(StatusCode::ACCEPTED);
        let response = client.post(sink.url()).json(&json!({})).send().await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::ACCEPTED);
        assert_eq!(sink.count(), 2);
    }
}
