use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use shared_config::AppConfig;

use crate::handlers;

/// Patient-facing routes; none of them require authentication.
pub fn booking_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/locations", get(handlers::list_locations))
        .route("/locations/{location_id}/providers", get(handlers::list_location_providers))
        .route("/slots", get(handlers::get_available_slots))
        .route("/available-dates", get(handlers::get_available_dates))
        .route("/bookings", post(handlers::create_booking))
        .with_state(state)
}
