use crate::core::errors::AcquisitionsError;
use crate::core::models::user::{Role, UserSummary};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// Session token payload.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    pub id: i64,
    pub email: String,
    pub role: Role,
    pub iat: usize,
    pub exp: usize,
}

pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expires_in_secs: u64,
}

impl JwtService {
    pub fn new(secret: &str, expires_in_secs: u64) -> Self {
        JwtService {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expires_in_secs,
        }
    }

    pub fn generate_token(&self, user: &UserSummary) -> Result<String, AcquisitionsError> {
        let issued_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .map_err(|e| AcquisitionsError::InternalServerError(format!("Time error: {}", e)))?;

        let claims = Claims {
            id: user.id,
            email: user.email.clone(),
            role: user.role,
            iat: issued_at as usize,
            exp: (issued_at + self.expires_in_secs) as usize,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AcquisitionsError::InternalServerError(format!("JWT encoding error: {}", e)))
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, AcquisitionsError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map_err(|e| {
                debug!("Token rejected: {}", e);
                AcquisitionsError::Unauthorized("Invalid or expired token".to_string())
            })?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(role: Role) -> UserSummary {
        UserSummary {
            id: 7,
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            role,
        }
    }

    #[test]
    fn token_carries_identity_and_role() {
        let jwt = JwtService::new("test-secret", 60);
        let token = jwt.generate_token(&summary(Role::Admin)).unwrap();
        let claims = jwt.validate_token(&token).unwrap();
        assert_eq!(claims.id, 7);
        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.exp - claims.iat, 60);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let issuer = JwtService::new("one-secret", 60);
        let verifier = JwtService::new("another-secret", 60);
        let token = issuer.generate_token(&summary(Role::User)).unwrap();
        assert!(matches!(
            verifier.validate_token(&token),
            Err(AcquisitionsError::Unauthorized(_))
        ));
    }
}
