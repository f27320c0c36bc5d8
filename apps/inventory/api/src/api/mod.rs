//! API routes module

pub mod health;

use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

/// Create all API routes
/// Note: These are nested under /api by axum_helpers::create_router
pub fn routes(state: &AppState) -> Router {
    Router::new().nest(
        "/inventory",
        domain_inventory::router(state.service.clone(), Arc::clone(&state.webhooks)),
    )
}
