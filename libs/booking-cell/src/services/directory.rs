use anyhow::Result;
use tracing::debug;

use shared_config::AppConfig;
use shared_database::{eq, SupabaseClient};

use crate::models::{Location, Provider};

/// Read-only lookups backing the location and provider pickers.
pub struct DirectoryService {
    supabase: SupabaseClient,
}

impl DirectoryService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn list_locations(&self) -> Result<Vec<Location>> {
        debug!("Fetching locations");
        self.supabase.select("locations", "select=*&order=name").await
    }

    pub async fn list_providers(&self, location_id: &str) -> Result<Vec<Provider>> {
        debug!("Fetching providers for location {}", location_id);

        let query = format!("select=*&location_id={}&order=name", eq(location_id));
        self.supabase.select("providers", &query).await
    }
}
