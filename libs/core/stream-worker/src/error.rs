//! Stream error types
//!
//! Only `Publish` is surfaced to producers. The worker contains every other
//! variant at the message boundary, except `Closed`, which ends the consume loop.

use thiserror::Error;

/// Stream processing errors
#[derive(Error, Debug)]
pub enum StreamError {
    /// The broker refused the message (e.g. it has been closed)
    #[error("Failed to publish to topic '{topic}': {reason}")]
    Publish { topic: String, reason: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Job processing failed
    #[error("Processing error: {0}")]
    Processing(String),

    /// The subscription ended without a shutdown request
    #[error("Subscription to topic '{0}' closed unexpectedly")]
    Closed(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StreamError {
    /// Create a processing error
    pub fn processing(message: impl Into<String>) -> Self {
        StreamError::Processing(message.into())
    }

    /// Metric/log label for this error
    pub fn kind(&self) -> &'static str {
        match self {
            StreamError::Publish { .. } => "publish",
            StreamError::Serialization(_) => "deserialization",
            StreamError::Processing(_) => "processing",
            StreamError::Closed(_) => "closed",
            StreamError::Internal(_) => "internal",
        }
    }
}

impl From<serde_json::Error> for StreamError {
    fn from(err: serde_json::Error) -> Self {
        StreamError::Serialization(err.to_string())
    }
}
