//! Handlers for the `/auth` resource (register, login, current user, logout).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use catalog_core::catalog::MAX_NAME_LEN;
use catalog_core::error::CoreError;
use catalog_core::types::DbId;
use catalog_core::validation::FieldErrors;
use catalog_db::models::user::{CreateUser, UpdateUser, UserResponse};
use catalog_db::repositories::{RevokedTokenRepo, UserRepo};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::jwt::generate_access_token;
use crate::auth::password::{hash_password, verify_password, MIN_PASSWORD_LEN};
use crate::catalog::taken;
use crate::error::{AppError, AppResult};
use crate::extract::ValidJson;
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(
        min = 1,
        max = MAX_NAME_LEN,
        message = "The name must be between 1 and 255 characters."
    ))]
    pub name: String,
    #[validate(
        email(message = "The email must be a valid email address."),
        length(max = MAX_NAME_LEN, message = "The email may not be greater than 255 characters.")
    )]
    pub email: String,
    #[validate(length(
        min = MIN_PASSWORD_LEN,
        message = "The password must be at least 6 characters."
    ))]
    pub password: String,
    #[validate(must_match(
        other = "password",
        message = "The password_confirmation does not match the password."
    ))]
    pub password_confirmation: String,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "The email must be a valid email address."))]
    pub email: String,
    pub password: String,
}

/// Request body for `PUT /auth/user`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(
        min = 1,
        max = MAX_NAME_LEN,
        message = "The name must be between 1 and 255 characters."
    ))]
    pub name: Option<String>,
    #[validate(
        email(message = "The email must be a valid email address."),
        length(max = MAX_NAME_LEN, message = "The email may not be greater than 255 characters.")
    )]
    pub email: Option<String>,
}

/// Returned by register.
#[derive(Debug, Serialize)]
pub struct RegisteredUser {
    pub token: String,
    pub user: UserResponse,
}

/// Returned by login.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub token_type: &'static str,
    /// Token lifetime in seconds.
    pub expires_in: i64,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    ValidJson(input): ValidJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<RegisteredUser>>)> {
    let mut errors = FieldErrors::new();
    if UserRepo::email_taken(&state.pool, &input.email, None).await? {
        taken(&mut errors, "email");
    }
    errors.into_result()?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            name: input.name,
            email: input.email,
            password_hash,
        },
    )
    .await?;

    let token = issue_token(&state, user.id)?;
    tracing::info!(user_id = user.id, "User registered");

    Ok(ApiResponse::ok(
        "User registered",
        RegisteredUser {
            token,
            user: user.into(),
        },
    )
    .created())
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    ValidJson(input): ValidJson<LoginRequest>,
) -> AppResult<Json<ApiResponse<TokenResponse>>> {
    let invalid = || AppError::Core(CoreError::Unauthorized("Invalid credentials".into()));

    let user = UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .ok_or_else(invalid)?;

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::warn!(user_id = user.id, "Rejected login with wrong password");
        return Err(invalid());
    }

    let token = issue_token(&state, user.id)?;
    Ok(ApiResponse::ok(
        "Login successful",
        TokenResponse {
            token,
            token_type: "bearer",
            expires_in: state.config.jwt.expires_in_secs(),
        },
    )
    .into_json())
}

/// GET /api/auth/user
pub async fn get_user(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| user_not_found(auth.user_id))?;
    Ok(ApiResponse::ok("User found", UserResponse::from(user)).into_json())
}

/// PUT /api/auth/user
pub async fn update_user(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(input): ValidJson<UpdateUserRequest>,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    let mut errors = FieldErrors::new();
    if let Some(email) = input.email.as_deref() {
        if UserRepo::email_taken(&state.pool, email, Some(auth.user_id)).await? {
            taken(&mut errors, "email");
        }
    }
    errors.into_result()?;

    let user = UserRepo::update(
        &state.pool,
        auth.user_id,
        &UpdateUser {
            name: input.name,
            email: input.email,
        },
    )
    .await?
    .ok_or_else(|| user_not_found(auth.user_id))?;

    tracing::info!(user_id = user.id, "User updated");
    Ok(ApiResponse::ok("User updated", UserResponse::from(user)).into_json())
}

/// POST /api/auth/logout
///
/// Revokes the presented token; other tokens of the same user stay valid.
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<ApiResponse<()>>> {
    RevokedTokenRepo::revoke(&state.pool, &auth.jti, auth.user_id, auth.expires_at).await?;
    tracing::info!(user_id = auth.user_id, "User logged out");
    Ok(ApiResponse::message("Successfully logged out").into_json())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn issue_token(state: &AppState, user_id: DbId) -> AppResult<String> {
    generate_access_token(user_id, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))
}

fn user_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "User", id })
}
