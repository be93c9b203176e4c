use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tokio::time::timeout;
use tracing::{debug, error, warn};

use shared_config::AppConfig;

use crate::models::{BookingPayload, WorkflowError, WorkflowResponse};

/// Hands a confirmed booking payload to the automation workflow.
#[async_trait]
pub trait WorkflowDispatcher: Send + Sync {
    async fn dispatch(&self, payload: &BookingPayload) -> Result<WorkflowResponse, WorkflowError>;
}

/// Calls the booking function over HTTP, bounded by the workflow timeout.
pub struct BookingFunctionClient {
    client: Client,
    function_url: String,
    anon_key: String,
    timeout: Duration,
}

impl BookingFunctionClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            function_url: config.booking_function_url.clone(),
            anon_key: config.supabase_anon_key.clone(),
            timeout: Duration::from_secs(config.workflow_timeout_secs),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn post(&self, payload: &BookingPayload) -> Result<WorkflowResponse, WorkflowError> {
        let response = self
            .client
            .post(&self.function_url)
            .header("Authorization", format!("Bearer {}", self.anon_key))
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        let body: Option<WorkflowResponse> = response.json().await.ok();

        if !status.is_success() {
            error!("Booking function returned {}", status);
            let message = body
                .and_then(|b| b.error)
                .unwrap_or_else(|| {
                    format!(
                        "Booking failed: {}",
                        status.canonical_reason().unwrap_or(status.as_str())
                    )
                });
            return Err(WorkflowError::Rejected(message));
        }

        let body = body.ok_or_else(|| {
            WorkflowError::InvalidResponse("Booking function returned an unreadable body".to_string())
        })?;

        if !body.success {
            warn!("Booking function reported failure: {:?}", body.error);
            return Err(WorkflowError::Rejected(
                body.error.unwrap_or_else(|| "Failed to process booking request".to_string()),
            ));
        }

        Ok(body)
    }
}

#[async_trait]
impl WorkflowDispatcher for BookingFunctionClient {
    async fn dispatch(&self, payload: &BookingPayload) -> Result<WorkflowResponse, WorkflowError> {
        debug!(
            "Dispatching booking for slot {} to {}",
            payload.appointment.slot_id, self.function_url
        );

        match timeout(self.timeout, self.post(payload)).await {
            Ok(result) => result,
            Err(_) => {
                error!("Booking function did not answer within {:?}", self.timeout);
                Err(WorkflowError::Timeout {
                    timeout_seconds: self.timeout.as_secs(),
                })
            }
        }
    }
}
