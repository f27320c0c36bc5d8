//! Stream definitions.
//!
//! Each domain implements `StreamDef` to name the topic its jobs travel on and
//! the consumer group its workers subscribe under.

/// Stream definition trait.
///
/// # Example
///
/// ```rust,ignore
/// use stream_worker::StreamDef;
///
/// pub struct InventoryJobStream;
///
/// impl StreamDef for InventoryJobStream {
///     const TOPIC: &'static str = "inventory-jobs";
///     const CONSUMER_GROUP: &'static str = "inventory-processor";
/// }
/// ```
pub trait StreamDef: Send + Sync {
    /// The topic name (e.g., "inventory-jobs").
    const TOPIC: &'static str;

    /// The consumer group label for this stream.
    const CONSUMER_GROUP: &'static str;

    /// Get the topic name.
    fn topic() -> &'static str {
        Self::TOPIC
    }

    /// Get the consumer group name.
    fn consumer_group() -> &'static str {
        Self::CONSUMER_GROUP
    }
}
