use std::sync::Arc;

use axum::{Router, routing::post};

use shared_config::AppConfig;

use crate::handlers;

pub fn workflow_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/uipath-booking", post(handlers::uipath_booking))
        .with_state(state)
}
