//! HS256 session tokens.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use stockscan_core::{SessionId, UserId};

use crate::claims::{JwtClaims, TokenValidationError, validate_claims};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed or badly signed token: {0}")]
    Invalid(String),

    #[error(transparent)]
    Claims(#[from] TokenValidationError),

    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// Verifies a bearer token and returns its claims.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenError>;
}

/// Mints session tokens.
pub trait TokenIssuer: Send + Sync {
    fn issue(
        &self,
        user_id: UserId,
        session_id: SessionId,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError>;
}

/// Shared-secret HS256 implementation of both sides.
///
/// Timestamps are carried as RFC 3339 claims, so jsonwebtoken's numeric
/// `exp` check is disabled and [`validate_claims`] decides the time window.
pub struct Hs256Tokens {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl Hs256Tokens {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();
        validation
    }
}

impl JwtValidator for Hs256Tokens {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenError> {
        let data = jsonwebtoken::decode::<JwtClaims>(token, &self.decoding, &Self::validation())
            .map_err(|e| TokenError::Invalid(e.to_string()))?;
        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

impl TokenIssuer for Hs256Tokens {
    fn issue(
        &self,
        user_id: UserId,
        session_id: SessionId,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| TokenError::Signing("token lifetime out of range".to_string()))?;
        let claims = JwtClaims {
            sub: user_id,
            sid: session_id,
            email: email.to_string(),
            issued_at: now,
            expires_at,
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }
}
