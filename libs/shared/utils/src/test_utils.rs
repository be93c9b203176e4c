use std::sync::Arc;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use base64::{Engine as _, engine::general_purpose};
use serde_json::json;
use uuid::Uuid;

use shared_config::AppConfig;

pub struct TestConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub admin_password: String,
    pub admin_session_secret: String,
    pub booking_function_url: String,
    pub workflow_timeout_secs: u64,
    pub uipath_process_url: String,
    pub uipath_access_token: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
            admin_password: "let-me-in".to_string(),
            admin_session_secret: "test-admin-session-secret-long-enough".to_string(),
            booking_function_url: "http://localhost:54321/functions/v1/uipath-booking".to_string(),
            workflow_timeout_secs: 300,
            uipath_process_url: "http://localhost:54322/orchestrator_/t/process/MBookingBot1".to_string(),
            uipath_access_token: "test-uipath-token".to_string(),
        }
    }
}

impl TestConfig {
    /// Config pointing every remote collaborator at one mock server.
    pub fn with_mock_server(uri: &str) -> Self {
        Self {
            supabase_url: uri.to_string(),
            booking_function_url: format!("{}/functions/v1/uipath-booking", uri),
            uipath_process_url: format!("{}/orchestrator_/t/process/MBookingBot1", uri),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            admin_password: self.admin_password.clone(),
            admin_session_secret: self.admin_session_secret.clone(),
            admin_session_hours: 12,
            booking_function_url: self.booking_function_url.clone(),
            workflow_timeout_secs: self.workflow_timeout_secs,
            uipath_process_url: self.uipath_process_url.clone(),
            uipath_access_token: self.uipath_access_token.clone(),
            port: 3000,
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_token(role: &str, secret: &str, exp_hours: i64) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours);

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let payload = json!({
            "sub": role,
            "role": role,
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_encoded = general_purpose::URL_SAFE_NO_PAD.encode(signature);

        format!("{}.{}", signing_input, signature_encoded)
    }

    pub fn create_admin_token(secret: &str) -> String {
        Self::create_token("admin", secret, 12)
    }

    pub fn create_expired_admin_token(secret: &str) -> String {
        Self::create_token("admin", secret, -1)
    }

    pub fn create_non_admin_token(secret: &str) -> String {
        Self::create_token("patient", secret, 12)
    }
}

pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn location_response(id: &str, name: &str) -> serde_json::Value {
        json!({
            "id": id,
            "name": name,
            "created_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn provider_response(id: &str, name: &str, location_id: &str) -> serde_json::Value {
        json!({
            "id": id,
            "name": name,
            "location_id": location_id,
            "created_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn provider_with_location_response(
        id: &str,
        name: &str,
        location_id: &str,
        location_name: &str,
    ) -> serde_json::Value {
        json!({
            "id": id,
            "name": name,
            "location_id": location_id,
            "created_at": "2024-01-01T00:00:00Z",
            "location": { "name": location_name }
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn slot_response(
        id: &str,
        date: &str,
        start_time: &str,
        end_time: &str,
        status: &str,
        provider_id: &str,
        provider_name: &str,
        location_id: &str,
        location_name: &str,
    ) -> serde_json::Value {
        json!({
            "id": id,
            "location_id": location_id,
            "provider_id": provider_id,
            "date": date,
            "start_time": start_time,
            "end_time": end_time,
            "status": status,
            "created_at": "2024-01-01T00:00:00Z",
            "provider": { "id": provider_id, "name": provider_name },
            "location": { "id": location_id, "name": location_name }
        })
    }

    pub fn patient_response(id: &str, email: &str, contact: &str, returning: bool) -> serde_json::Value {
        json!({
            "id": id,
            "first_name": "Jordan",
            "last_name": "Rivera",
            "email": email,
            "contact": contact,
            "returning_patient": returning,
            "created_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn booking_with_slot_date_response(patient_id: &str, date: Option<&str>) -> serde_json::Value {
        json!({
            "id": Uuid::new_v4().to_string(),
            "patient_id": patient_id,
            "appointment_slot_id": Uuid::new_v4().to_string(),
            "status": "confirmed",
            "created_at": "2024-01-01T00:00:00Z",
            "appointment_slot": date.map(|d| json!({ "date": d }))
        })
    }

    pub fn uipath_job_response() -> serde_json::Value {
        json!({
            "id": 482_913,
            "key": "6f1c2a4e-8d1b-4c3e-9a57-2b7f0e1d9c44",
            "state": "Pending",
            "creationTime": "2024-06-03T14:05:00Z",
            "organizationUnitId": 17
        })
    }

    pub fn booking_function_success() -> serde_json::Value {
        json!({
            "success": true,
            "processId": 482_913,
            "jobKey": "6f1c2a4e-8d1b-4c3e-9a57-2b7f0e1d9c44",
            "state": "Pending"
        })
    }

    pub fn error_response(message: &str, code: &str) -> serde_json::Value {
        json!({
            "message": message,
            "code": code
        })
    }
}
