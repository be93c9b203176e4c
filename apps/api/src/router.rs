use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use admin_cell::router::admin_routes;
use booking_cell::router::booking_routes;
use shared_config::AppConfig;
use workflow_cell::router::workflow_routes;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "Dental Booking API is running!" }))
        .nest("/booking", booking_routes(state.clone()))
        .nest("/admin", admin_routes(state.clone()))
        .nest("/functions/v1", workflow_routes(state))
}
