//! HTTP calls against the inventory API

use domain_inventory::{
    ErrorFlag, JobAcceptedResponse, RegisterWebhookRequest, WebhookRegisteredResponse,
};
use eyre::{Result, WrapErr};
use reqwest::StatusCode;
use tracing::debug;
use uuid::Uuid;

pub struct InventoryApi {
    http: reqwest::Client,
    base_url: String,
}

impl InventoryApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Register `callback_url`, returning the webhook id.
    pub async fn register_webhook(&self, callback_url: &str) -> Result<Uuid> {
        let url = format!("{}/registerWebhook", self.base_url);
        let body = RegisterWebhookRequest {
            callback_url: callback_url.to_string(),
        };

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .wrap_err_with(|| format!("Failed to reach {url}"))?
            .error_for_status()
            .wrap_err("Webhook registration was rejected")?;

        let registered: WebhookRegisteredResponse = response.json().await?;
        Ok(registered.webhook_id)
    }

    /// Submit a job, optionally flagged, returning its id.
    pub async fn process_inventory(&self, flag: Option<ErrorFlag>) -> Result<Uuid> {
        let url = format!("{}/processInventory", self.base_url);
        let mut request = self.http.post(&url);
        if let Some(flag) = flag {
            request = request.query(&[("errorFlag", flag.to_string())]);
        }

        let response = request
            .send()
            .await
            .wrap_err_with(|| format!("Failed to reach {url}"))?;

        let status = response.status();
        debug!(%status, "processInventory responded");
        if status != StatusCode::ACCEPTED {
            let body = response.text().await.unwrap_or_default();
            eyre::bail!("processInventory returned {status}: {body}");
        }

        let accepted: JobAcceptedResponse = response.json().await?;
        Ok(accepted.job_id)
    }
}
