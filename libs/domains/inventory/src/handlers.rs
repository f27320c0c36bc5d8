use axum::{
    Json, Router,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use axum_helpers::{
    AppError,
    errors::responses::{
        BadRequestResponse, InternalServerErrorResponse, ServiceUnavailableResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::InventoryResult;
use crate::models::{
    ErrorFlag, InventoryJob, JobAcceptedResponse, JobStatus, ProcessInventoryQuery,
    RegisterWebhookRequest, WebhookRegisteredResponse, WebhookRegistration,
};
use crate::service::InventoryService;
use crate::webhooks::WebhookService;

const TAG: &str = "inventory";

/// OpenAPI documentation for the Inventory API
#[derive(OpenApi)]
#[openapi(
    paths(process_inventory, register_webhook),
    components(
        schemas(
            InventoryJob,
            JobStatus,
            ErrorFlag,
            WebhookRegistration,
            RegisterWebhookRequest,
            JobAcceptedResponse,
            WebhookRegisteredResponse
        ),
        responses(
            BadRequestResponse,
            ServiceUnavailableResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "Inventory job submission and webhook registration")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
struct InventoryState {
    service: Arc<InventoryService>,
    webhooks: Arc<WebhookService>,
}

/// Create the inventory router
pub fn router(service: InventoryService, webhooks: Arc<WebhookService>) -> Router {
    let state = InventoryState {
        service: Arc::new(service),
        webhooks,
    };

    Router::new()
        .route("/processInventory", post(process_inventory))
        .route("/registerWebhook", post(register_webhook))
        .with_state(state)
}

/// Submit an inventory job
///
/// Returns as soon as the job is queued. The outcome is delivered to every
/// registered webhook.
#[utoipa::path(
    post,
    path = "/processInventory",
    tag = TAG,
    params(ProcessInventoryQuery),
    responses(
        (status = 202, description = "Job accepted", body = JobAcceptedResponse),
        (status = 503, response = ServiceUnavailableResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn process_inventory(
    State(state): State<InventoryState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> InventoryResult<impl IntoResponse> {
    let query = ProcessInventoryQuery::from_pairs(pairs);
    let job = state.service.submit(query.error_flag.as_deref())?;

    Ok((
        StatusCode::ACCEPTED,
        Json(JobAcceptedResponse {
            job_id: job.job_id(),
        }),
    ))
}

/// Register a webhook for job results
#[utoipa::path(
    post,
    path = "/registerWebhook",
    tag = TAG,
    request_body = RegisterWebhookRequest,
    responses(
        (status = 200, description = "Webhook registered", body = WebhookRegisteredResponse),
        (status = 400, response = BadRequestResponse)
    )
)]
async fn register_webhook(
    State(state): State<InventoryState>,
    payload: Result<Json<RegisterWebhookRequest>, JsonRejection>,
) -> Result<Json<WebhookRegisteredResponse>, AppError> {
    let Json(request) = payload?;
    let registration = state.webhooks.register(&request.callback_url)?;

    Ok(Json(WebhookRegisteredResponse {
        webhook_id: registration.id,
    }))
}
