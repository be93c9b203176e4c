use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post},
    middleware,
};

use shared_config::AppConfig;
use shared_utils::extractor::admin_middleware;

use crate::handlers;

pub fn admin_routes(state: Arc<AppConfig>) -> Router {
    let public_routes = Router::new()
        .route("/login", post(handlers::login))
        .route("/logout", post(handlers::logout));

    let protected_routes = Router::new()
        .route("/providers", get(handlers::list_providers).post(handlers::create_provider))
        .route("/providers/{provider_id}", delete(handlers::delete_provider))
        .route("/locations", get(handlers::list_locations))
        .layer(middleware::from_fn_with_state(state.clone(), admin_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
