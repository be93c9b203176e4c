use reqwest::Client;
use serde_json::Value;
use tracing::{debug, error, info};

use shared_config::AppConfig;

use crate::models::{BookingPayload, UiPathJob, WorkflowError};

/// Starts the booking robot process on UiPath Orchestrator.
pub struct UiPathClient {
    client: Client,
    process_url: String,
    access_token: String,
}

impl UiPathClient {
    pub fn new(config: &AppConfig) -> Result<Self, WorkflowError> {
        if !config.is_workflow_configured() {
            return Err(WorkflowError::NotConfigured);
        }

        Ok(Self {
            client: Client::new(),
            process_url: config.uipath_process_url.clone(),
            access_token: config.uipath_access_token.clone(),
        })
    }

    pub async fn start_booking_job(&self, payload: &BookingPayload) -> Result<UiPathJob, WorkflowError> {
        info!(
            "Starting UiPath booking job for slot {} at {}",
            payload.appointment.slot_id, payload.location.name
        );
        debug!("Sending booking request to: {}", self.process_url);

        let response = self
            .client
            .post(&self.process_url)
            .header("Authorization", format!("Bearer {}", self.access_token))
            .header("Content-Type", "application/json")
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            error!("UiPath process error: {} - {}", status, response_text);

            let message = serde_json::from_str::<Value>(&response_text)
                .ok()
                .and_then(|body| body.get("message").and_then(Value::as_str).map(str::to_string))
                .unwrap_or_else(|| {
                    format!(
                        "Booking failed: {}",
                        status.canonical_reason().unwrap_or(status.as_str())
                    )
                });

            return Err(WorkflowError::Rejected(message));
        }

        let job: UiPathJob = serde_json::from_str(&response_text)
            .map_err(|e| WorkflowError::InvalidResponse(format!("Failed to parse UiPath job: {}", e)))?;

        info!("UiPath job started: {:?} ({:?})", job.key, job.state);
        Ok(job)
    }
}
