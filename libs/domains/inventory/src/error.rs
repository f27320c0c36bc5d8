use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use stream_worker::StreamError;
use thiserror::Error;
use uuid::Uuid;

use crate::models::JobStatus;

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Failed to publish job: {0}")]
    Publish(String),

    #[error("Delivery to webhook {webhook_id} failed: {reason}")]
    Delivery { webhook_id: Uuid, reason: String },

    #[error("Job {job_id} cannot move from {from} to {to}")]
    InvalidTransition {
        job_id: Uuid,
        from: JobStatus,
        to: JobStatus,
    },

    #[error("Invalid job payload: {0}")]
    Serialization(String),
}

pub type InventoryResult<T> = Result<T, InventoryError>;

/// Producer failures surface as publish errors, except serialization
impl From<StreamError> for InventoryError {
    fn from(err: StreamError) -> Self {
        match err {
            StreamError::Serialization(msg) => InventoryError::Serialization(msg),
            other => InventoryError::Publish(other.to_string()),
        }
    }
}

/// Lets the processor return domain errors to the worker
impl From<InventoryError> for StreamError {
    fn from(err: InventoryError) -> Self {
        match err {
            InventoryError::Serialization(msg) => StreamError::Serialization(msg),
            other => StreamError::Processing(other.to_string()),
        }
    }
}

/// Convert InventoryError to AppError for standardized error responses
impl From<InventoryError> for AppError {
    fn from(err: InventoryError) -> Self {
        match err {
            InventoryError::Validation(msg) => AppError::BadRequest(msg),
            InventoryError::Publish(msg) => AppError::ServiceUnavailable(msg),
            other => AppError::InternalServerError(other.to_string()),
        }
    }
}

impl IntoResponse for InventoryError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
