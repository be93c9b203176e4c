use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use tracing::info;

use shared_config::AppConfig;

use crate::models::{BookingPayload, WorkflowError, WorkflowResponse};
use crate::services::UiPathClient;

/// Forwards a booking payload to the UiPath booking process.
#[axum::debug_handler]
pub async fn uipath_booking(
    State(config): State<Arc<AppConfig>>,
    payload: Result<Json<BookingPayload>, JsonRejection>,
) -> Result<Json<WorkflowResponse>, WorkflowError> {
    let Json(payload) = payload.map_err(|rejection| WorkflowError::InvalidRequest(rejection.body_text()))?;

    if payload.patient.email.trim().is_empty() || payload.patient.phone.trim().is_empty() {
        return Err(WorkflowError::MissingPatientInfo);
    }

    let client = UiPathClient::new(&config)?;
    let job = client.start_booking_job(&payload).await?;

    info!("Booking forwarded for {} at {}", payload.appointment.date, payload.appointment.start_time);
    Ok(Json(WorkflowResponse::from(job)))
}
