//! Bearer-token authentication as an axum extractor.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use catalog_core::error::CoreError;
use catalog_core::types::{DbId, Timestamp};
use catalog_db::repositories::RevokedTokenRepo;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// The caller, taken from `Authorization: Bearer <jwt>`.
///
/// Every catalog handler takes one; a token revoked by logout is refused
/// even before it expires.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
    /// Id of the presented token, needed to revoke it.
    pub jti: String,
    pub expires_at: Timestamp,
}

fn unauthorized(message: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(message.into()))
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| unauthorized("Missing Authorization header"))?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| unauthorized("Invalid Authorization format. Expected: Bearer <token>"))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        let claims = validate_token(token, &state.config.jwt)
            .map_err(|_| unauthorized("Invalid or expired token"))?;

        if RevokedTokenRepo::is_revoked(&state.pool, &claims.jti).await? {
            tracing::debug!(user_id = claims.sub, "Rejected revoked token");
            return Err(unauthorized("Token has been revoked"));
        }

        Ok(AuthUser {
            user_id: claims.sub,
            expires_at: claims.expires_at(),
            jti: claims.jti,
        })
    }
}
