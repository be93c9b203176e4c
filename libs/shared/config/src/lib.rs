use std::env;
use tracing::warn;

const DEFAULT_WORKFLOW_TIMEOUT_SECS: u64 = 300;
const DEFAULT_ADMIN_SESSION_HOURS: i64 = 12;
const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub admin_password: String,
    pub admin_session_secret: String,
    pub admin_session_hours: i64,
    pub booking_function_url: String,
    pub workflow_timeout_secs: u64,
    pub uipath_process_url: String,
    pub uipath_access_token: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let supabase_url = env::var("SUPABASE_URL")
            .unwrap_or_else(|_| {
                warn!("SUPABASE_URL not set, using empty value");
                String::new()
            });

        let config = Self {
            booking_function_url: env::var("BOOKING_FUNCTION_URL")
                .unwrap_or_else(|_| Self::default_booking_function_url(&supabase_url)),
            supabase_url,
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            admin_password: env::var("ADMIN_PASSWORD")
                .unwrap_or_else(|_| {
                    warn!("ADMIN_PASSWORD not set, admin login disabled");
                    String::new()
                }),
            admin_session_secret: env::var("ADMIN_SESSION_SECRET")
                .unwrap_or_else(|_| {
                    warn!("ADMIN_SESSION_SECRET not set, using empty value");
                    String::new()
                }),
            admin_session_hours: parse_or_default("ADMIN_SESSION_HOURS", DEFAULT_ADMIN_SESSION_HOURS),
            workflow_timeout_secs: parse_or_default("WORKFLOW_TIMEOUT_SECS", DEFAULT_WORKFLOW_TIMEOUT_SECS),
            uipath_process_url: env::var("UIPATH_PROCESS_URL")
                .unwrap_or_else(|_| {
                    warn!("UIPATH_PROCESS_URL not set, using empty value");
                    String::new()
                }),
            uipath_access_token: env::var("UIPATH_ACCESS_TOKEN")
                .unwrap_or_else(|_| {
                    warn!("UIPATH_ACCESS_TOKEN not set, using empty value");
                    String::new()
                }),
            port: parse_or_default("PORT", DEFAULT_PORT),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    /// Booking function path on the hosted project when no explicit URL is given.
    pub fn default_booking_function_url(supabase_url: &str) -> String {
        format!("{}/functions/v1/uipath-booking", supabase_url.trim_end_matches('/'))
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty()
            && !self.supabase_anon_key.is_empty()
    }

    pub fn is_admin_configured(&self) -> bool {
        !self.admin_password.is_empty()
            && !self.admin_session_secret.is_empty()
    }

    pub fn is_workflow_configured(&self) -> bool {
        !self.uipath_process_url.is_empty()
            && !self.uipath_access_token.is_empty()
    }
}

fn parse_or_default<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display + Copy,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has invalid value {:?}, using default {}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}
