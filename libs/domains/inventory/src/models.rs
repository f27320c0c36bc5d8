use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumIter, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::InventoryError;

/// Result text attached to successfully processed jobs
pub const SUCCESS_RESULT: &str = "Inventory processing completed successfully";

/// Job lifecycle status
///
/// `Pending → {Error, Completed}`; both targets are terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
pub enum JobStatus {
    /// Accepted, not processed yet
    Pending,
    /// Carries an error pair
    Error,
    /// Processed successfully
    Completed,
}

/// Error flag accepted by `processInventory` to pre-seed a job with a failure
///
/// Parsing is case-insensitive.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    ToSchema,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum ErrorFlag {
    Validation,
    NotFound,
    Auth,
    Db,
    Processing,
}

impl ErrorFlag {
    /// Parse an optional raw flag.
    ///
    /// Missing, empty and unrecognized values all yield `None`. Surrounding
    /// whitespace makes a value unrecognized.
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        raw.filter(|s| !s.is_empty()).and_then(|s| s.parse().ok())
    }

    /// Error code stamped on the job
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION_ERROR",
            Self::NotFound => "NOT_FOUND_ERROR",
            Self::Auth => "AUTHORIZATION_ERROR",
            Self::Db => "DATABASE_ERROR",
            Self::Processing => "PROCESSING_ERROR",
        }
    }

    /// Human-readable error message stamped on the job
    pub fn message(&self) -> &'static str {
        match self {
            Self::Validation => "Invalid inventory data provided",
            Self::NotFound => "Inventory item not found",
            Self::Auth => "Not authorized to process inventory",
            Self::Db => "Error connecting to inventory database",
            Self::Processing => "Error during inventory processing",
        }
    }
}

/// A unit of inventory work and its outcome
///
/// Serialized in camelCase with every optional field emitted as `null`.
/// Deserialization rejects payloads whose fields contradict each other:
/// - `errorCode` and `errorMessage` are both present or both absent
/// - `Pending` jobs carry no result or `completedAt`; an error pair marks
///   one the processor will finalize as `Error`
/// - `Error` jobs carry the error pair and no result
/// - `Completed` jobs carry `completedAt` and no error
///
/// A job pre-flagged with an error is published as `Error` without
/// `completedAt`; the processor stamps it. Every job that leaves the
/// processor has `completedAt` set.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryJob {
    /// Unique job identifier
    job_id: Uuid,
    /// When the job was created
    created_at: DateTime<Utc>,
    /// When the job reached a terminal state
    completed_at: Option<DateTime<Utc>>,
    /// Current status
    status: JobStatus,
    /// Success payload, only on `Completed`
    result: Option<String>,
    /// Error code, paired with `error_message`
    error_code: Option<String>,
    /// Error message, paired with `error_code`
    error_message: Option<String>,
}

impl InventoryJob {
    /// Create a new `Pending` job.
    pub fn new() -> Self {
        Self {
            job_id: Uuid::new_v4(),
            created_at: Utc::now(),
            completed_at: None,
            status: JobStatus::Pending,
            result: None,
            error_code: None,
            error_message: None,
        }
    }

    /// Create a job pre-flagged with the error for `flag`.
    pub fn flagged(flag: ErrorFlag) -> Self {
        Self {
            status: JobStatus::Error,
            error_code: Some(flag.code().to_string()),
            error_message: Some(flag.message().to_string()),
            ..Self::new()
        }
    }

    /// Create a job from an optional raw error flag.
    ///
    /// Unknown flags are ignored and yield a plain `Pending` job.
    pub fn from_flag(raw: Option<&str>) -> Self {
        ErrorFlag::parse(raw).map_or_else(Self::new, Self::flagged)
    }

    pub fn job_id(&self) -> Uuid {
        self.job_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    pub fn error_code(&self) -> Option<&str> {
        self.error_code.as_deref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Whether the job carries an error
    pub fn has_error(&self) -> bool {
        self.error_code.is_some()
    }

    /// Whether the job has been through processing
    pub fn is_finished(&self) -> bool {
        self.completed_at.is_some()
    }

    fn invalid_transition(&self, to: JobStatus) -> InventoryError {
        InventoryError::InvalidTransition {
            job_id: self.job_id,
            from: self.status,
            to,
        }
    }

    /// Move a `Pending` job to `Completed` with `result`.
    pub fn complete(&mut self, result: impl Into<String>) -> Result<(), InventoryError> {
        if self.status != JobStatus::Pending || self.has_error() {
            return Err(self.invalid_transition(JobStatus::Completed));
        }

        self.status = JobStatus::Completed;
        self.completed_at = Some(Utc::now());
        self.result = Some(result.into());
        Ok(())
    }

    /// Finalize a job that carries an error: status `Error`, `completedAt` stamped.
    pub fn fail(&mut self) -> Result<(), InventoryError> {
        if !self.has_error() || self.is_finished() {
            return Err(self.invalid_transition(JobStatus::Error));
        }

        self.status = JobStatus::Error;
        self.completed_at = Some(Utc::now());
        Ok(())
    }
}

impl Default for InventoryJob {
    fn default() -> Self {
        Self::new()
    }
}

impl stream_worker::StreamJob for InventoryJob {
    fn job_id(&self) -> String {
        self.job_id.to_string()
    }
}

/// Wire form of [`InventoryJob`] before its invariants are checked
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawInventoryJob {
    job_id: Uuid,
    created_at: DateTime<Utc>,
    #[serde(default)]
    completed_at: Option<DateTime<Utc>>,
    status: JobStatus,
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    error_message: Option<String>,
}

impl TryFrom<RawInventoryJob> for InventoryJob {
    type Error = InventoryError;

    fn try_from(raw: RawInventoryJob) -> Result<Self, Self::Error> {
        let invalid = |reason: &str| {
            Err(InventoryError::Serialization(format!(
                "job {}: {}",
                raw.job_id, reason
            )))
        };

        if raw.error_code.is_some() != raw.error_message.is_some() {
            return invalid("errorCode and errorMessage must be set together");
        }
        let has_error = raw.error_code.is_some();

        match raw.status {
            JobStatus::Pending if raw.completed_at.is_some() => {
                return invalid("a Pending job cannot have completedAt");
            }
            JobStatus::Error if !has_error => {
                return invalid("an Error job must carry errorCode and errorMessage");
            }
            JobStatus::Completed if raw.completed_at.is_none() => {
                return invalid("a Completed job must have completedAt");
            }
            JobStatus::Completed if has_error => {
                return invalid("a Completed job cannot carry an error");
            }
            _ => {}
        }

        if raw.result.is_some() && raw.status != JobStatus::Completed {
            return invalid("only a Completed job can have a result");
        }

        Ok(Self {
            job_id: raw.job_id,
            created_at: raw.created_at,
            completed_at: raw.completed_at,
            status: raw.status,
            result: raw.result,
            error_code: raw.error_code,
            error_message: raw.error_message,
        })
    }
}

impl<'de> Deserialize<'de> for InventoryJob {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawInventoryJob::deserialize(deserializer)?;
        Self::try_from(raw).map_err(serde::de::Error::custom)
    }
}

/// A registered webhook callback
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WebhookRegistration {
    /// Unique registration identifier
    pub id: Uuid,
    /// URL job results are POSTed to
    pub callback_url: String,
    /// When the webhook was registered
    pub registered_at: DateTime<Utc>,
}

impl WebhookRegistration {
    pub fn new(callback_url: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            callback_url: callback_url.into(),
            registered_at: Utc::now(),
        }
    }
}

/// Query parameters for `processInventory`
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProcessInventoryQuery {
    /// Pre-seed the job with an error: VALIDATION, NOTFOUND, AUTH, DB or PROCESSING.
    /// Unknown values are ignored.
    pub error_flag: Option<String>,
}

impl ProcessInventoryQuery {
    pub const ERROR_FLAG: &'static str = "errorFlag";

    /// Build from raw query pairs.
    ///
    /// The key matches case-insensitively. Repeated values are joined with
    /// `,`, which never names a flag, so the job is created unflagged.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let values: Vec<String> = pairs
            .into_iter()
            .filter(|(key, _)| key.eq_ignore_ascii_case(Self::ERROR_FLAG))
            .map(|(_, value)| value)
            .collect();

        Self {
            error_flag: (!values.is_empty()).then(|| values.join(",")),
        }
    }
}

/// Body of `registerWebhook`
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterWebhookRequest {
    /// URL to POST job results to
    #[serde(default)]
    pub callback_url: String,
}

/// Response for an accepted job
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobAcceptedResponse {
    pub job_id: Uuid,
}

/// Response for a registered webhook
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WebhookRegisteredResponse {
    pub webhook_id: Uuid,
}
