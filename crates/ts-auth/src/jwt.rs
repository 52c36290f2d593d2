//! JWT authentication
//!
//! Bearer tokens are HS256-signed and carry the user's id, login, role, and
//! display name. Tokens expire after the configured lifetime (8 hours by
//! default); there is no refresh flow — clients log in again.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_core::Id;

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
    /// JWT ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
    /// Login name
    pub username: String,
    /// Role (0 = admin, 1 = employee)
    pub role: i64,
    /// Display name shown in the UI and stamped onto saved rows
    #[serde(rename = "firstName")]
    pub first_name: String,
}

impl Claims {
    /// Parse the subject back into a user id
    pub fn user_id(&self) -> Result<Id, JwtError> {
        self.sub
            .parse()
            .map_err(|_| JwtError::Invalid("invalid user id in token".to_string()))
    }
}

/// JWT errors
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Token is expired")]
    Expired,
    #[error("Invalid token: {0}")]
    Invalid(String),
    #[error("Missing token")]
    Missing,
    #[error("Token encoding failed: {0}")]
    EncodingFailed(String),
}

impl From<JwtError> for ts_core::AppError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::EncodingFailed(msg) => ts_core::AppError::internal(msg),
            other => ts_core::AppError::unauthorized(other.to_string()),
        }
    }
}

/// JWT service for creating and validating tokens
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expires_in_seconds: i64,
}

impl JwtService {
    /// Create a new JWT service with the given secret and token lifetime
    pub fn new(secret: &[u8], expires_in_seconds: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            expires_in_seconds,
        }
    }

    /// Create a new token for a user
    pub fn create_token(
        &self,
        user_id: Id,
        username: &str,
        role: i64,
        first_name: &str,
    ) -> Result<String, JwtError> {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))?
            .as_secs() as usize;

        let claims = Claims {
            sub: user_id.to_string(),
            exp: now + self.expires_in_seconds as usize,
            iat: now,
            jti: Some(uuid::Uuid::new_v4().to_string()),
            username: username.to_string(),
            role,
            first_name: first_name.to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Validate and decode a token
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::Invalid(e.to_string()),
            })?;

        Ok(token_data.claims)
    }
}

/// Extract the bearer token from an Authorization header value
pub fn extract_bearer_token(authorization: &str) -> Option<&str> {
    if authorization.to_lowercase().starts_with("bearer ") {
        Some(authorization[7..].trim())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ts_core::types::role;

    fn service() -> JwtService {
        JwtService::new(b"test-secret-key-at-least-32-bytes", 8 * 60 * 60)
    }

    #[test]
    fn test_create_and_validate_token() {
        let token = service()
            .create_token(7, "jdoe", role::EMPLOYEE, "Jane")
            .unwrap();

        let claims = service().validate_token(&token).unwrap();
        assert_eq!(claims.sub, "7");
        assert_eq!(claims.user_id().unwrap(), 7);
        assert_eq!(claims.username, "jdoe");
        assert_eq!(claims.role, role::EMPLOYEE);
        assert_eq!(claims.first_name, "Jane");
    }

    #[test]
    fn test_token_carries_eight_hour_expiry() {
        let token = service().create_token(1, "a", role::ADMIN, "A").unwrap();
        let claims = service().validate_token(&token).unwrap();
        assert_eq!(claims.exp - claims.iat, 8 * 60 * 60);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = service().create_token(1, "a", role::ADMIN, "A").unwrap();
        let other = JwtService::new(b"a-completely-different-secret-key", 3600);
        assert!(matches!(
            other.validate_token(&token),
            Err(JwtError::Invalid(_))
        ));
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc123"), Some("abc123"));
        assert_eq!(extract_bearer_token("bearer abc123"), Some("abc123"));
        assert_eq!(extract_bearer_token("Basic abc123"), None);
        assert_eq!(extract_bearer_token(""), None);
    }
}
