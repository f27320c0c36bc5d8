//! In-process topic registry
//!
//! Each topic is a single unbounded FIFO queue. Topics are created on first
//! publish or subscribe, and every subscriber of a topic (whatever its group)
//! takes messages from that same queue.

use crate::error::StreamError;
use crate::message::Message;
use crate::metrics;
use async_stream::stream;
use dashmap::DashMap;
use futures::Stream;
use std::sync::{Arc, PoisonError, RwLock};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// One topic: a sender for publishers and a shared receiver for subscribers.
struct Topic {
    name: String,
    tx: mpsc::UnboundedSender<Message>,
    rx: Mutex<mpsc::UnboundedReceiver<Message>>,
    depth: AtomicUsize,
}

impl Topic {
    fn new(name: &str) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            name: name.to_string(),
            tx,
            rx: Mutex::new(rx),
            depth: AtomicUsize::new(0),
        }
    }

    /// Wait for the next message.
    ///
    /// Returns `None` once the broker is closed and the queue is drained.
    /// Cancel-safe: dropping the future never loses a message.
    async fn next_message(&self, closed: &CancellationToken) -> Option<Message> {
        let mut rx = self.rx.lock().await;
        let message = tokio::select! {
            biased;
            message = rx.recv() => message,
            _ = closed.cancelled() => rx.try_recv().ok(),
        }?;

        let depth = self.depth.fetch_sub(1, Ordering::SeqCst).saturating_sub(1);
        metrics::topic_depth(&self.name, depth);
        Some(message)
    }
}

/// Registry of named topics.
///
/// Shared between producers and consumers through an `Arc`.
pub struct TopicRegistry {
    topics: DashMap<String, Arc<Topic>>,
    closed: CancellationToken,
    /// Shared by publishers, exclusive for `close`: once `close` returns, no
    /// accepted publish is still on its way into a queue.
    gate: RwLock<()>,
}

impl TopicRegistry {
    /// Create an empty, open registry.
    pub fn new() -> Self {
        Self {
            topics: DashMap::new(),
            closed: CancellationToken::new(),
            gate: RwLock::new(()),
        }
    }

    /// Look up a topic, creating it if absent.
    ///
    /// The map entry is locked while the topic is built, so concurrent first
    /// use creates exactly one topic.
    fn get_or_create(&self, name: &str) -> Arc<Topic> {
        if let Some(topic) = self.topics.get(name) {
            return Arc::clone(topic.value());
        }

        let entry = self.topics.entry(name.to_string()).or_insert_with(|| {
            info!(topic = %name, "Creating topic");
            Arc::new(Topic::new(name))
        });
        Arc::clone(entry.value())
    }

    /// Append a message to `topic`, creating the topic if needed.
    ///
    /// Never waits: the queue is unbounded. Fails only when the registry is closed.
    pub fn publish(
        &self,
        topic: &str,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), StreamError> {
        let _open = self.gate.read().unwrap_or_else(PoisonError::into_inner);
        if self.is_closed() {
            return Err(StreamError::Publish {
                topic: topic.to_string(),
                reason: "broker is closed".to_string(),
            });
        }

        let message = Message::new(key, value);
        let key = message.key.clone();
        let handle = self.get_or_create(topic);

        // Count first so a fast consumer can never observe a negative depth.
        let depth = handle.depth.fetch_add(1, Ordering::SeqCst) + 1;
        if handle.tx.send(message).is_err() {
            handle.depth.fetch_sub(1, Ordering::SeqCst);
            return Err(StreamError::Publish {
                topic: topic.to_string(),
                reason: "topic queue is closed".to_string(),
            });
        }

        metrics::message_published(topic);
        metrics::topic_depth(topic, depth);
        debug!(topic = %topic, key = %key, depth, "Message published");
        Ok(())
    }

    /// Subscribe to `topic` on behalf of `group`.
    ///
    /// The returned stream yields messages in publish order and suspends while
    /// the queue is empty. It ends only when `cancel` fires or the registry is
    /// closed and drained. Subscribers on the same topic compete for messages;
    /// the group name is informational.
    pub fn subscribe(
        &self,
        topic: &str,
        group: &str,
        cancel: CancellationToken,
    ) -> impl Stream<Item = Message> + Send + use<> {
        let handle = self.get_or_create(topic);
        let closed = self.closed.clone();
        let group = group.to_string();

        info!(topic = %topic, group = %group, "Consumer group subscribed to topic");

        stream! {
            loop {
                let next = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => None,
                    message = handle.next_message(&closed) => message,
                };

                match next {
                    Some(message) => {
                        metrics::message_consumed(&handle.name, &group);
                        yield message;
                    }
                    None => break,
                }
            }
            debug!(topic = %handle.name, group = %group, "Subscription ended");
        }
    }

    /// Acknowledge a processed message.
    ///
    /// Messages leave the queue when consumed, so this only records the
    /// acknowledgment; it has no effect on redelivery.
    pub fn commit(&self, topic: &str, group: &str, key: &str) {
        metrics::message_committed(topic, group);
        info!(
            topic = %topic,
            group = %group,
            key = %key,
            "Consumer group committed message"
        );
    }

    /// Close the registry.
    ///
    /// Waits for in-flight publishes. Later publishes fail; open subscriptions
    /// drain what is buffered, including those in-flight messages, and end.
    pub fn close(&self) {
        let _gate = self.gate.write().unwrap_or_else(PoisonError::into_inner);
        if !self.closed.is_cancelled() {
            info!("Closing topic registry");
            self.closed.cancel();
        }
    }

    /// Whether `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }

    /// Names of all topics created so far.
    pub fn topics(&self) -> Vec<String> {
        let mut names: Vec<String> = self.topics.iter().map(|t| t.key().clone()).collect();
        names.sort();
        names
    }

    /// Number of buffered (published but not yet consumed) messages on `topic`.
    pub fn depth(&self, topic: &str) -> usize {
        self.topics
            .get(topic)
            .map(|t| t.depth.load(Ordering::SeqCst))
            .unwrap_or(0)
    }
}

impl Default for TopicRegistry {
    fn default() -> Self {
        Self::new()
    }
}
