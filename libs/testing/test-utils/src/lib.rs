//! Shared test utilities for domain testing
//!
//! This crate provides reusable test infrastructure for the inventory crates:
//! - `WebhookSink`: local HTTP server that records webhook deliveries
//! - `unreachable_url`: a callback URL nothing is listening on
//! - `wait_until`: poll a condition with a deadline
//!
//! # Usage
//!
//! ```rust,ignore
//! use test_utils::WebhookSink;
//!
//! #[tokio::test]
//! async fn delivers_completed_job() {
//!     let sink = WebhookSink::start().await;
//!     webhooks.register(sink.url())?;
//!
//!     // ... trigger processing ...
//!
//!     let bodies = sink.wait_for(1, Duration::from_secs(10)).await;
//!     assert_eq!(bodies[0]["status"], "Completed");
//! }
//! ```

mod webhook;

pub use webhook::WebhookSink;

use std::future::Future;
use std::net::TcpListener;
use std::time::Duration;

/// A URL on the loopback interface with no listener behind it.
///
/// Binds an ephemeral port and releases it immediately, so connecting to the
/// returned URL fails with connection refused.
pub fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind ephemeral port");
    let port = listener
        .local_addr()
        .expect("Failed to read ephemeral port")
        .port();
    drop(listener);
    format!("http://127.0.0.1:{port}/webhook")
}

/// Poll `condition` every 10ms until it returns true.
///
/// Returns `false` if `timeout` elapses first.
pub async fn wait_until<F, Fut>(timeout: Duration, mut condition: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    tokio::time::timeout(timeout, async {
        while !condition().await {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .is_ok()
}
