use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_models::auth::{AdminSession, LoginResponse};
use shared_models::error::AppError;

use crate::models::{AdminError, CreateProviderRequest, LoginRequest};
use crate::services::{AdminAuthService, ProviderAdminService};

fn admin_error_to_app_error(e: AdminError) -> AppError {
    match e {
        AdminError::InvalidPassword | AdminError::NotConfigured => AppError::Auth(e.to_string()),
        AdminError::MissingFields => AppError::ValidationError(e.to_string()),
        AdminError::Token(msg) => AppError::Internal(msg),
        AdminError::Database(msg) => AppError::Database(msg),
    }
}

#[axum::debug_handler]
pub async fn login(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let response = AdminAuthService::new(&config)
        .login(&request.password)
        .map_err(admin_error_to_app_error)?;

    Ok(Json(response))
}

/// Sessions are stateless; the client discards its token.
pub async fn logout() -> Json<Value> {
    Json(json!({ "success": true }))
}

#[axum::debug_handler]
pub async fn list_providers(
    State(config): State<Arc<AppConfig>>,
    Extension(session): Extension<AdminSession>,
) -> Result<Json<Value>, AppError> {
    debug!("Admin {} listing providers", session.subject);

    let providers = ProviderAdminService::new(&config)
        .list_providers()
        .await
        .map_err(|e| AppError::Database(format!("Failed to load providers: {}", e)))?;

    Ok(Json(json!({
        "providers": providers,
        "total": providers.len()
    })))
}

#[axum::debug_handler]
pub async fn create_provider(
    State(config): State<Arc<AppConfig>>,
    Extension(session): Extension<AdminSession>,
    Json(request): Json<CreateProviderRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    debug!("Admin {} adding provider {}", session.subject, request.name);

    let provider = ProviderAdminService::new(&config)
        .create_provider(request)
        .await
        .map_err(admin_error_to_app_error)?;

    Ok((StatusCode::CREATED, Json(json!({ "provider": provider }))))
}

#[axum::debug_handler]
pub async fn delete_provider(
    State(config): State<Arc<AppConfig>>,
    Extension(session): Extension<AdminSession>,
    Path(provider_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    debug!("Admin {} deleting provider {}", session.subject, provider_id);

    ProviderAdminService::new(&config)
        .delete_provider(&provider_id)
        .await
        .map_err(admin_error_to_app_error)?;

    Ok(Json(json!({ "success": true })))
}

#[axum::debug_handler]
pub async fn list_locations(
    State(config): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let locations = ProviderAdminService::new(&config)
        .list_locations()
        .await
        .map_err(|e| AppError::Database(format!("Failed to load locations: {}", e)))?;

    Ok(Json(json!({
        "locations": locations,
        "total": locations.len()
    })))
}
