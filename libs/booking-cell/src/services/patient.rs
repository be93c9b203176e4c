use std::sync::Arc;

use anyhow::{Result, anyhow};
use serde_json::json;
use tracing::{debug, info, warn};

use shared_database::{eq, or_eq, SupabaseClient};

use crate::models::{Patient, ValidatedPatient};

/// Patient lookup and creation, deduplicated on email or phone.
pub struct PatientService {
    supabase: Arc<SupabaseClient>,
}

impl PatientService {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    pub async fn find_by_email_or_phone(&self, email: &str, phone: &str) -> Result<Option<Patient>> {
        debug!("Looking up patient by email or phone");

        let query = format!(
            "select=*&or={}&limit=1",
            or_eq(&[("email", email), ("contact", phone)])
        );
        let patients: Vec<Patient> = self.supabase.select("patients", &query).await?;

        Ok(patients.into_iter().next())
    }

    pub async fn create(&self, patient: &ValidatedPatient) -> Result<Patient> {
        let last_name = if patient.last_name.is_empty() {
            None
        } else {
            Some(patient.last_name.clone())
        };

        let rows = json!([{
            "first_name": patient.first_name,
            "last_name": last_name,
            "email": patient.email,
            "contact": patient.phone,
            "returning_patient": patient.returning_patient,
        }]);

        let created: Vec<Patient> = self.supabase.insert("patients", rows).await?;
        let created = created
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Failed to create patient record"))?;

        info!("Created patient {}", created.id);
        Ok(created)
    }

    pub async fn mark_returning(&self, patient_id: &str) -> Result<()> {
        self.supabase
            .update(
                "patients",
                &format!("id={}", eq(patient_id)),
                json!({ "returning_patient": true }),
            )
            .await
    }

    /// Existing record when email or phone matches, otherwise a new one.
    pub async fn find_or_create(&self, patient: &ValidatedPatient) -> Result<Patient> {
        match self.find_by_email_or_phone(&patient.email, &patient.phone).await? {
            Some(existing) => {
                debug!("Found existing patient {}", existing.id);

                if patient.returning_patient && !existing.returning_patient {
                    if let Err(e) = self.mark_returning(&existing.id).await {
                        warn!("Failed to update returning patient status for {}: {}", existing.id, e);
                    }
                }

                Ok(existing)
            }
            None => self.create(patient).await,
        }
    }
}
