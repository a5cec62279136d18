//! JWT Token handling

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::billing::PlanType;

pub const ISSUER: &str = "imobi-contract";

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens
    pub secret: String,
    /// Token expiration time in hours
    pub expiration_hours: i64,
    /// Issuer claim
    pub issuer: String,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>, expiration_hours: i64) -> Self {
        Self {
            secret: secret.into(),
            expiration_hours,
            issuer: ISSUER.to_string(),
        }
    }

    /// Token lifetime in seconds, as reported to clients.
    pub fn expires_in(&self) -> i64 {
        self.expiration_hours * 3600
    }
}

/// JWT TokenClaims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TokenClaims {
    /// Subject (user ID)
    pub sub: String,
    pub email: String,
    /// Quota tier at the time the token was issued
    pub plan: PlanType,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Issuer
    pub iss: String,
}

impl TokenClaims {
    pub fn new(user_id: i32, email: &str, plan: PlanType, config: &JwtConfig) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(config.expiration_hours);

        Self {
            sub: user_id.to_string(),
            email: email.to_string(),
            plan,
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: config.issuer.clone(),
        }
    }

    /// `None` when the subject is not a numeric user id.
    pub fn user_id(&self) -> Option<i32> {
        self.sub.parse().ok()
    }
}

/// Create a JWT token for a user
pub fn create_token(
    user_id: i32,
    email: &str,
    plan: PlanType,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = TokenClaims::new(user_id, email, plan, config);

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Verify and decode a JWT token
pub fn verify_token(
    token: &str,
    config: &JwtConfig,
) -> Result<TokenClaims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.set_issuer(&[&config.issuer]);

    let token_data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> JwtConfig {
        JwtConfig::new("test-secret", 1)
    }

    #[test]
    fn token_round_trips_claims() {
        let token = create_token(42, "ana@example.com", PlanType::Pro, &config()).unwrap();
        let claims = verify_token(&token, &config()).unwrap();
        assert_eq!(claims.user_id(), Some(42));
        assert_eq!(claims.email, "ana@example.com");
        assert_eq!(claims.plan, PlanType::Pro);
        assert_eq!(claims.iss, ISSUER);
    }

    #[test]
    fn rejects_foreign_secret_and_issuer() {
        let token = create_token(1, "a@b.com", PlanType::Starter, &config()).unwrap();
        assert!(verify_token(&token, &JwtConfig::new("other", 1)).is_err());

        let mut foreign = config();
        foreign.issuer = "someone-else".into();
        let token = create_token(1, "a@b.com", PlanType::Starter, &foreign).unwrap();
        assert!(verify_token(&token, &config()).is_err());
    }

    #[test]
    fn expired_tokens_fail() {
        let expired = JwtConfig::new("test-secret", -2);
        let token = create_token(1, "a@b.com", PlanType::Starter, &expired).unwrap();
        assert!(verify_token(&token, &config()).is_err());
        assert_eq!(config().expires_in(), 3600);
    }
}
