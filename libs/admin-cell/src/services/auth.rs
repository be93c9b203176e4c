use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::{info, warn};

use shared_config::AppConfig;
use shared_models::auth::LoginResponse;
use shared_utils::jwt::sign_admin_token;

use crate::models::AdminError;

type HmacSha256 = Hmac<Sha256>;

fn password_tag(secret: &str, password: &str) -> Result<Vec<u8>, AdminError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| AdminError::Token("Failed to create HMAC".to_string()))?;
    mac.update(password.as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Constant-time password comparison over HMAC tags.
pub fn passwords_match(secret: &str, supplied: &str, expected: &str) -> Result<bool, AdminError> {
    let expected_tag = password_tag(secret, expected)?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| AdminError::Token("Failed to create HMAC".to_string()))?;
    mac.update(supplied.as_bytes());

    Ok(mac.verify_slice(&expected_tag).is_ok())
}

/// Shared-password gate for the admin console.
pub struct AdminAuthService<'a> {
    config: &'a AppConfig,
}

impl<'a> AdminAuthService<'a> {
    pub fn new(config: &'a AppConfig) -> Self {
        Self { config }
    }

    pub fn login(&self, password: &str) -> Result<LoginResponse, AdminError> {
        if !self.config.is_admin_configured() {
            warn!("Admin login attempted but admin access is not configured");
            return Err(AdminError::NotConfigured);
        }

        if !passwords_match(&self.config.admin_session_secret, password, &self.config.admin_password)? {
            warn!("Admin login rejected");
            return Err(AdminError::InvalidPassword);
        }

        let (token, expires_at) = sign_admin_token(
            &self.config.admin_session_secret,
            self.config.admin_session_hours,
        )
        .map_err(AdminError::Token)?;

        info!("Admin session issued, expires at {}", expires_at);

        Ok(LoginResponse {
            authenticated: true,
            token,
            expires_at,
        })
    }
}
