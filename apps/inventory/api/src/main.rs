use axum_helpers::server::{create_production_app, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_inventory::InventoryProcessor;
use std::sync::Arc;
use std::time::Duration;
use stream_worker::{CancellationToken, StreamWorker, WorkerConfig, init_metrics};
use tracing::{error, info};

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output
    install_color_eyre();

    // Load configuration from environment variables
    let config = Config::from_env()?;

    // Initialize tracing and the Prometheus recorder
    init_tracing(&config.environment);
    init_metrics();

    info!(
        bootstrap_servers = %config.broker.bootstrap_servers,
        topic = %config.broker.topic,
        group = %config.broker.group_id,
        "Using in-process broker"
    );

    let state = AppState::new(config);

    // Background worker
    let processor = InventoryProcessor::new(
        state.webhooks.clone(),
        state.config.worker.processing_delay,
    );
    let worker = StreamWorker::new(
        Arc::clone(&state.registry),
        processor,
        WorkerConfig::new(&state.config.broker.topic, &state.config.broker.group_id),
    );

    let worker_shutdown = CancellationToken::new();
    let worker_handle = tokio::spawn({
        let shutdown = worker_shutdown.clone();
        async move {
            if let Err(e) = worker.run(shutdown).await {
                error!(error = %e, "Inventory worker stopped unexpectedly");
            }
        }
    });

    // Build router with API routes
    let api_routes = api::routes(&state);

    // Create a router with OpenAPI docs
    let router = axum_helpers::create_router::<openapi::ApiDoc>(api_routes)?;

    // Merge health endpoints
    let app = router
        .merge(health_router(state.config.app))
        .merge(api::health::router(state.clone()));

    info!("Starting Inventory API with production-ready shutdown (30s timeout)");

    let registry = Arc::clone(&state.registry);
    create_production_app(
        app,
        &state.config.server,
        Duration::from_secs(30),
        async move {
            info!("Shutting down: stopping inventory worker");
            worker_shutdown.cancel();
            if let Err(e) = worker_handle.await {
                error!(error = %e, "Inventory worker task failed");
            }
            registry.close();
            info!("Topic registry closed");
        },
    )
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Inventory API shutdown complete");
    Ok(())
}
