use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::error::AppError;
use workflow_cell::models::WorkflowError;

use crate::models::{
    AvailableDatesQuery, BookAppointmentRequest, BookingError, SlotQuery, BOOKING_TIMEOUT_MESSAGE,
    DUPLICATE_BOOKING_MESSAGE,
};
use crate::services::availability::group_by_period;
use crate::services::{AvailabilityService, BookingService, DirectoryService};

fn booking_error_to_app_error(e: BookingError) -> AppError {
    match e {
        BookingError::Validation(_) => AppError::ValidationError(e.to_string()),
        BookingError::SlotNotFound => AppError::NotFound(e.to_string()),
        BookingError::SlotNotAvailable | BookingError::DuplicateBooking => AppError::Conflict(e.to_string()),
        BookingError::Database(msg) => AppError::Database(msg),
        BookingError::Workflow(WorkflowError::Timeout { .. }) => {
            AppError::Timeout(BOOKING_TIMEOUT_MESSAGE.to_string())
        }
        BookingError::Workflow(inner) => AppError::ExternalService(inner.to_string()),
    }
}

#[axum::debug_handler]
pub async fn list_locations(
    State(config): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let service = DirectoryService::new(&config);

    let locations = service.list_locations()
        .await
        .map_err(|e| AppError::Database(format!("Failed to load locations: {}", e)))?;

    Ok(Json(json!({
        "locations": locations,
        "total": locations.len()
    })))
}

#[axum::debug_handler]
pub async fn list_location_providers(
    State(config): State<Arc<AppConfig>>,
    Path(location_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = DirectoryService::new(&config);

    let providers = service.list_providers(&location_id)
        .await
        .map_err(|e| AppError::Database(format!("Failed to load providers: {}", e)))?;

    Ok(Json(json!({
        "providers": providers,
        "total": providers.len()
    })))
}

#[axum::debug_handler]
pub async fn get_available_slots(
    State(config): State<Arc<AppConfig>>,
    Query(query): Query<SlotQuery>,
) -> Result<Json<Value>, AppError> {
    let service = AvailabilityService::new(&config);

    let slots = service.available_slots(query.date, &query.location_id, query.provider_id.as_deref())
        .await
        .map_err(|e| AppError::Database(format!("Failed to load time slots: {}", e)))?;

    let periods = group_by_period(&slots);

    Ok(Json(json!({
        "date": query.date,
        "slots": slots,
        "am": periods.am,
        "pm": periods.pm,
        "total": slots.len()
    })))
}

#[axum::debug_handler]
pub async fn get_available_dates(
    State(config): State<Arc<AppConfig>>,
    Query(query): Query<AvailableDatesQuery>,
) -> Result<Json<Value>, AppError> {
    let service = AvailabilityService::new(&config);

    let dates = service.available_dates(&query.location_id, query.provider_id.as_deref())
        .await
        .map_err(|e| AppError::Database(format!("Failed to load available dates: {}", e)))?;

    Ok(Json(json!({ "dates": dates })))
}

#[axum::debug_handler]
pub async fn create_booking(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&config);

    let confirmation = service.book(request)
        .await
        .map_err(booking_error_to_app_error)?;

    Ok(Json(json!({
        "success": true,
        "booking": confirmation,
        "message": "Your appointment request has been received and is now being processed. You will receive a confirmation email once it is finalized."
    })))
}
