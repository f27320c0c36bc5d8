//! Stream definitions for the inventory domain.

use stream_worker::StreamDef;

/// Inventory jobs stream definition.
///
/// The default topic and group; deployments can override both through
/// `BrokerConfig`.
pub struct InventoryJobStream;

impl StreamDef for InventoryJobStream {
    /// Topic inventory jobs are published to.
    const TOPIC: &'static str = "inventory-jobs";

    /// Consumer group label for the inventory processor.
    const CONSUMER_GROUP: &'static str = "inventory-processor";
}
