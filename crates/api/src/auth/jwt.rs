//! Bearer tokens for the catalog API.
//!
//! Tokens are HS256 JWTs. Every token gets its own `jti`; logging out stores
//! that id in `revoked_tokens` until the token would have expired anyway.

use catalog_core::types::{DbId, Timestamp};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifetime used when `JWT_ACCESS_EXPIRY_MINS` is unset.
const DEFAULT_LIFETIME_MINS: i64 = 60;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User id.
    pub sub: DbId,
    pub iat: i64,
    pub exp: i64,
    /// Revocation key.
    pub jti: String,
}

impl Claims {
    fn issue(user_id: DbId, lifetime: Duration) -> Self {
        let issued_at = Utc::now();
        Self {
            sub: user_id,
            iat: issued_at.timestamp(),
            exp: (issued_at + lifetime).timestamp(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// `exp` as a timestamp, stored next to a revoked `jti`.
    pub fn expires_at(&self) -> Timestamp {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }
}

/// Signing secret and token lifetime.
#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub lifetime: Duration,
}

// Keeps the secret out of startup logs.
impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("lifetime", &self.lifetime)
            .finish()
    }
}

impl JwtConfig {
    /// Reads `JWT_SECRET` (required, non-empty) and `JWT_ACCESS_EXPIRY_MINS`
    /// (default `60`).
    ///
    /// # Panics
    ///
    /// Panics when the secret is missing or the expiry is not a positive integer.
    pub fn from_env() -> Self {
        let secret = std::env::var("JWT_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .expect("JWT_SECRET must be set to a non-empty value");

        let minutes = match std::env::var("JWT_ACCESS_EXPIRY_MINS") {
            Ok(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|m| *m > 0)
                .expect("JWT_ACCESS_EXPIRY_MINS must be a positive integer"),
            Err(_) => DEFAULT_LIFETIME_MINS,
        };

        Self {
            secret,
            lifetime: Duration::minutes(minutes),
        }
    }

    /// Reported to clients as `expires_in`.
    pub fn expires_in_secs(&self) -> i64 {
        self.lifetime.num_seconds()
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        // `sub` is numeric, so only `exp` goes through the claim presence check.
        validation.set_required_spec_claims(&["exp"]);
        validation
    }
}

pub fn generate_access_token(
    user_id: DbId,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    encode(
        &Header::new(Algorithm::HS256),
        &Claims::issue(user_id, config.lifetime),
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Check signature and expiry, then hand back the claims.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &JwtConfig::validation(),
    )
    .map(|data| data.claims)
}
