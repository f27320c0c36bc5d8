//! Console output for received jobs

use domain_inventory::{InventoryJob, JobStatus};
use std::collections::BTreeMap;

fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

/// Print a finished job the way an operator would want to read it.
pub fn print_job(job: &InventoryJob) {
    match job.status() {
        JobStatus::Completed => println!("\nJob completed successfully!"),
        JobStatus::Error => println!("\nJob completed with error!"),
        JobStatus::Pending => println!("\nJob is still pending"),
    }
    println!("Job ID: {}", job.job_id());
    println!("Created at: {}", job.created_at());
    match job.completed_at() {
        Some(at) => println!("Completed at: {at}"),
        None => println!("Completed at: -"),
    }
    println!("Status: {}", job.status());
    if job.has_error() {
        println!("Error Code: {}", or_dash(job.error_code()));
        println!("Error Message: {}", or_dash(job.error_message()));
    } else {
        println!("Result: {}", or_dash(job.result()));
    }
}

/// Distinct error codes seen, first message wins.
#[derive(Debug, Default)]
pub struct ErrorSummary {
    errors: BTreeMap<String, String>,
}

impl ErrorSummary {
    pub fn record(&mut self, job: &InventoryJob) {
        if let Some(code) = job.error_code() {
            self.errors
                .entry(code.to_string())
                .or_insert_with(|| or_dash(job.error_message()).to_string());
        }
    }

    pub fn print(&self) {
        println!("\n=== ERROR SUMMARY ===");
        if self.errors.is_empty() {
            println!("No errors received");
        }
        for (code, message) in &self.errors {
            println!("{code}: {message}");
        }
    }
}
