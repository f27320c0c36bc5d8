use crate::{env_or_default, ConfigError, FromEnv};

/// Default topic that inventory jobs are published to.
pub const DEFAULT_TOPIC: &str = "inventory-jobs";

/// Default consumer group used by the processing worker.
pub const DEFAULT_GROUP_ID: &str = "inventory-processor";

/// Default bootstrap address. The in-process broker only logs it.
pub const DEFAULT_BOOTSTRAP_SERVERS: &str = "localhost:9092";

/// Message broker configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BrokerConfig {
    pub bootstrap_servers: String,
    pub topic: String,
    pub group_id: String,
}

impl BrokerConfig {
    pub fn new(topic: impl Into<String>, group_id: impl Into<String>) -> Self {
        Self {
            bootstrap_servers: DEFAULT_BOOTSTRAP_SERVERS.to_string(),
            topic: topic.into(),
            group_id: group_id.into(),
        }
    }
}

impl FromEnv for BrokerConfig {
    /// Reads from environment variables with defaults:
    /// - BROKER_BOOTSTRAP_SERVERS: defaults to localhost:9092
    /// - BROKER_TOPIC: defaults to inventory-jobs
    /// - BROKER_GROUP_ID: defaults to inventory-processor
    ///
    /// Blank values fall back to the defaults as well.
    fn from_env() -> Result<Self, ConfigError> {
        let non_blank = |key: &str, default: &str| {
            let value = env_or_default(key, default);
            if value.trim().is_empty() {
                default.to_string()
            } else {
                value
            }
        };

        Ok(Self {
            bootstrap_servers: non_blank("BROKER_BOOTSTRAP_SERVERS", DEFAULT_BOOTSTRAP_SERVERS),
            topic: non_blank("BROKER_TOPIC", DEFAULT_TOPIC),
            group_id: non_blank("BROKER_GROUP_ID", DEFAULT_GROUP_ID),
        })
    }
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TOPIC, DEFAULT_GROUP_ID)
    }
}
