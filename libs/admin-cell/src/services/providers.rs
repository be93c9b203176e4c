use anyhow::Result;
use serde_json::json;
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_database::{eq, SupabaseClient};

use crate::models::{AdminError, AdminLocation, CreateProviderRequest, ProviderWithLocation};

const PROVIDER_WITH_LOCATION: &str = "*,location:locations(name)";

pub struct ProviderAdminService {
    supabase: SupabaseClient,
}

impl ProviderAdminService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn list_providers(&self) -> Result<Vec<ProviderWithLocation>> {
        debug!("Fetching providers for admin listing");

        let query = format!("select={}&order=name", PROVIDER_WITH_LOCATION);
        self.supabase.select("providers", &query).await
    }

    pub async fn list_locations(&self) -> Result<Vec<AdminLocation>> {
        self.supabase.select("locations", "select=*&order=name").await
    }

    pub async fn create_provider(&self, request: CreateProviderRequest) -> Result<ProviderWithLocation, AdminError> {
        let name = request.name.trim();
        let location_id = request.location_id.trim();

        if name.is_empty() || location_id.is_empty() {
            return Err(AdminError::MissingFields);
        }

        let rows = json!([{ "name": name, "location_id": location_id }]);

        let created: Vec<ProviderWithLocation> = self.supabase
            .insert("providers", rows)
            .await
            .map_err(|e| AdminError::Database(format!("Failed to add provider: {}", e)))?;

        let provider = created
            .into_iter()
            .next()
            .ok_or_else(|| AdminError::Database("Failed to add provider".to_string()))?;

        info!("Created provider {} at location {}", provider.id, provider.location_id);
        Ok(provider)
    }

    pub async fn delete_provider(&self, provider_id: &str) -> Result<(), AdminError> {
        self.supabase
            .delete("providers", &format!("id={}", eq(provider_id)))
            .await
            .map_err(|e| AdminError::Database(format!("Failed to delete provider: {}", e)))?;

        info!("Deleted provider {}", provider_id);
        Ok(())
    }
}
