//! Inventory Client
//!
//! Registers a local webhook with the inventory API, submits a job and
//! prints the callback. With `--test-errors` it then walks every error flag.

use clap::Parser;
use core_config::Environment;
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_inventory::ErrorFlag;
use eyre::Result;
use std::time::Duration;
use strum::IntoEnumIterator;
use tracing::info;

mod api;
mod listener;
mod report;

use api::InventoryApi;
use listener::WebhookListener;
use report::ErrorSummary;

#[derive(Parser)]
#[command(name = "inventory-client")]
#[command(about = "Submit inventory jobs and wait for their webhook callbacks")]
struct Cli {
    /// Base URL of the inventory API
    #[arg(long, default_value = "http://localhost:5232/api/inventory")]
    server_url: String,

    /// Local port for the webhook listener
    #[arg(long, default_value_t = 8084)]
    webhook_port: u16,

    /// Also trigger every error flag and print a summary
    #[arg(long)]
    test_errors: bool,

    /// How long to wait for each callback
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    install_color_eyre();
    init_tracing(&Environment::from_env());

    let cli = Cli::parse();
    let timeout = Duration::from_secs(cli.timeout_secs);
    let api = InventoryApi::new(&cli.server_url);

    let mut listener = WebhookListener::start(cli.webhook_port).await?;

    info!("Registering webhook with the server...");
    let webhook_id = api.register_webhook(&listener.url()).await?;
    info!(%webhook_id, "Webhook registered successfully");

    info!("Calling processInventory endpoint...");
    let job_id = api.process_inventory(None).await?;
    info!(%job_id, "Job accepted, waiting for async processing to complete");

    let job = listener.wait_for_job(job_id, timeout).await?;
    report::print_job(&job);

    if !cli.test_errors {
        return Ok(());
    }

    println!("\n\n=== TESTING ERROR SCENARIOS ===");
    let flags: Vec<ErrorFlag> = ErrorFlag::iter().collect();
    let mut summary = ErrorSummary::default();

    for (i, flag) in flags.iter().enumerate() {
        println!("\nTesting error scenario {}/{}: {flag}", i + 1, flags.len());
        let job_id = api.process_inventory(Some(*flag)).await?;
        let job = listener.wait_for_job(job_id, timeout).await?;
        report::print_job(&job);
        summary.record(&job);
    }

    summary.print();
    Ok(())
}
