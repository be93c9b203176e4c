use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateProviderRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub location_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocationName {
    pub name: String,
}

/// Provider row with its location's name embedded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderWithLocation {
    pub id: String,
    pub name: String,
    pub location_id: String,
    pub created_at: Option<DateTime<Utc>>,
    pub location: Option<LocationName>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdminLocation {
    pub id: String,
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("Invalid password")]
    InvalidPassword,

    #[error("Admin access is not configured")]
    NotConfigured,

    #[error("Please fill in all fields")]
    MissingFields,

    #[error("Failed to issue session token: {0}")]
    Token(String),

    #[error("{0}")]
    Database(String),
}
