use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, TimeZone, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::debug;

use shared_models::auth::{AdminClaims, AdminSession, JwtHeader};

type HmacSha256 = Hmac<Sha256>;

pub const ADMIN_ROLE: &str = "admin";

fn sign(signing_input: &str, secret: &str) -> Result<String, String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| "Failed to create HMAC".to_string())?;
    mac.update(signing_input.as_bytes());
    Ok(URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes()))
}

/// Issue an HS256 admin session token valid for `valid_hours`.
pub fn sign_admin_token(
    secret: &str,
    valid_hours: i64,
) -> Result<(String, DateTime<Utc>), String> {
    if secret.is_empty() {
        return Err("Admin session secret is not set".to_string());
    }

    let now = Utc::now();
    let expires_at = now + Duration::hours(valid_hours);

    let header = JwtHeader {
        alg: "HS256".to_string(),
        typ: "JWT".to_string(),
    };
    let claims = AdminClaims {
        sub: ADMIN_ROLE.to_string(),
        role: ADMIN_ROLE.to_string(),
        iat: now.timestamp(),
        exp: expires_at.timestamp(),
    };

    let header_json = serde_json::to_string(&header).map_err(|e| e.to_string())?;
    let claims_json = serde_json::to_string(&claims).map_err(|e| e.to_string())?;

    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(header_json),
        URL_SAFE_NO_PAD.encode(claims_json)
    );
    let signature = sign(&signing_input, secret)?;

    Ok((format!("{}.{}", signing_input, signature), expires_at))
}

pub fn validate_admin_token(token: &str, secret: &str) -> Result<AdminSession, String> {
    if secret.is_empty() {
        return Err("Admin session secret is not set".to_string());
    }

    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err("Invalid token format".to_string());
    }

    let header_b64 = parts[0];
    let claims_b64 = parts[1];
    let signature_b64 = parts[2];

    let signature = match URL_SAFE_NO_PAD.decode(signature_b64) {
        Ok(sig) => sig,
        Err(e) => {
            debug!("Failed to decode signature: {}", e);
            return Err("Invalid signature encoding".to_string());
        }
    };

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| "Failed to create HMAC".to_string())?;
    mac.update(format!("{}.{}", header_b64, claims_b64).as_bytes());

    if mac.verify_slice(&signature).is_err() {
        debug!("Token signature verification failed");
        return Err("Invalid token signature".to_string());
    }

    let claims_json = URL_SAFE_NO_PAD
        .decode(claims_b64)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .ok_or_else(|| "Invalid claims encoding".to_string())?;

    let claims: AdminClaims = match serde_json::from_str(&claims_json) {
        Ok(c) => c,
        Err(e) => {
            debug!("Failed to parse claims: {}", e);
            return Err("Invalid claims format".to_string());
        }
    };

    if claims.role != ADMIN_ROLE {
        return Err("Token does not grant admin access".to_string());
    }

    let now = Utc::now().timestamp();
    if claims.exp < now {
        debug!("Token expired at {} (now: {})", claims.exp, now);
        return Err("Token expired".to_string());
    }

    Ok(AdminSession {
        subject: claims.sub,
        issued_at: Utc.timestamp_opt(claims.iat, 0).single(),
        expires_at: Utc.timestamp_opt(claims.exp, 0).single(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const SECRET: &str = "test-admin-session-secret";

    #[test]
    fn issued_token_validates() {
        let (token, expires_at) = sign_admin_token(SECRET, 12).unwrap();
        let session = validate_admin_token(&token, SECRET).unwrap();

        assert_eq!(session.subject, ADMIN_ROLE);
        assert_eq!(session.expires_at.map(|t| t.timestamp()), Some(expires_at.timestamp()));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let (token, _) = sign_admin_token(SECRET, 12).unwrap();
        assert_matches!(
            validate_admin_token(&token, "another-secret"),
            Err(msg) if msg == "Invalid token signature"
        );
    }

    #[test]
    fn expired_token_is_rejected() {
        let (token, _) = sign_admin_token(SECRET, -1).unwrap();
        assert_matches!(validate_admin_token(&token, SECRET), Err(msg) if msg == "Token expired");
    }

    #[test]
    fn malformed_token_is_rejected() {
        assert_matches!(
            validate_admin_token("not-a-token", SECRET),
            Err(msg) if msg == "Invalid token format"
        );
    }

    #[test]
    fn empty_secret_refuses_to_sign() {
        assert!(sign_admin_token("", 12).is_err());
    }
}
