use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

// ==============================================================================
// BOOKING PAYLOAD (sent to the booking function and forwarded to UiPath)
// ==============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PatientData {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: String,
    pub returning_patient: bool,
    pub gender: String,
    pub referring_doctor: String,
    pub reason_for_visit: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AppointmentData {
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub slot_id: String,
    pub location_id: String,
    pub provider_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LocationData {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProviderData {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BookingPayload {
    pub patient: PatientData,
    pub appointment: AppointmentData,
    pub location: LocationData,
    pub provider: ProviderData,
}

// ==============================================================================
// UIPATH AND BOOKING FUNCTION RESPONSES
// ==============================================================================

/// Job record returned by the UiPath Orchestrator when a process is started.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiPathJob {
    pub id: Option<i64>,
    pub key: Option<String>,
    pub state: Option<String>,
    pub creation_time: Option<String>,
    pub organization_unit_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_unit_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<UiPathJob> for WorkflowResponse {
    fn from(job: UiPathJob) -> Self {
        Self {
            success: true,
            process_id: job.id,
            job_key: job.key,
            state: job.state,
            creation_time: job.creation_time,
            organization_unit_id: job.organization_unit_id,
            error: None,
        }
    }
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum WorkflowError {
    #[error("Workflow service is not configured")]
    NotConfigured,

    #[error("Missing required patient information")]
    MissingPatientInfo,

    #[error("Invalid booking request: {0}")]
    InvalidRequest(String),

    #[error("Booking request timed out after {timeout_seconds} seconds")]
    Timeout { timeout_seconds: u64 },

    #[error("{0}")]
    Rejected(String),

    #[error("Workflow transport error: {0}")]
    Transport(String),

    #[error("Invalid workflow response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for WorkflowError {
    fn from(e: reqwest::Error) -> Self {
        WorkflowError::Transport(e.to_string())
    }
}

/// The booking function answers every failure with a 500 and `{success: false, error}`.
impl IntoResponse for WorkflowError {
    fn into_response(self) -> Response {
        tracing::error!("Booking error: {}", self);

        let body = WorkflowResponse {
            success: false,
            process_id: None,
            job_key: None,
            state: None,
            creation_time: None,
            organization_unit_id: None,
            error: Some(self.to_string()),
        };

        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
