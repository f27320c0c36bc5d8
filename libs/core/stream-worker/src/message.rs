//! Broker message envelope

/// A message buffered on a topic.
///
/// `key` is the logical acknowledgment key (the job id for inventory jobs) and
/// `value` is the serialized payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub key: String,
    pub value: String,
}

impl Message {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}
