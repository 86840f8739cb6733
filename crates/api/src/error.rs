use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use catalog_core::assets::AssetError;
use catalog_core::error::CoreError;
use catalog_core::validation::FieldErrors;
use serde_json::json;

/// Message attached to every `InvalidFields` response.
pub const VALIDATION_MESSAGE: &str = "The given data was invalid.";

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `catalog_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The asset store failed to write or remove a binary.
    #[error("Asset storage error: {0}")]
    Asset(#[from] AssetError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The body went over the configured upload limit.
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

/// Status, code, message and optional field errors of a failed request.
struct ErrorParts {
    status: StatusCode,
    code: &'static str,
    message: String,
    errors: Option<FieldErrors>,
}

impl ErrorParts {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            errors: None,
        }
    }

    fn invalid(errors: FieldErrors) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "VALIDATION_ERROR",
            message: VALIDATION_MESSAGE.to_string(),
            errors: Some(errors),
        }
    }

    fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "An internal error occurred",
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let parts = match self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => {
                    tracing::warn!(entity, id, "Entity not found");
                    ErrorParts::new(
                        StatusCode::NOT_FOUND,
                        "NOT_FOUND",
                        format!("{entity} with id {id} not found"),
                    )
                }
                CoreError::Validation(msg) => {
                    ErrorParts::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg)
                }
                CoreError::InvalidFields(errors) => {
                    tracing::debug!(fields = errors.len(), "Validation failed");
                    ErrorParts::invalid(errors)
                }
                CoreError::Unauthorized(msg) => {
                    ErrorParts::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg)
                }
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(&err),

            // --- Asset storage ---
            AppError::Asset(err) => {
                tracing::error!(error = %err, "Asset storage error");
                ErrorParts::internal()
            }

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => ErrorParts::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            AppError::PayloadTooLarge(msg) => {
                ErrorParts::new(StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", msg)
            }
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                ErrorParts::internal()
            }
        };

        let mut body = json!({
            "success": false,
            "message": parts.message,
            "code": parts.code,
        });
        if let Some(errors) = parts.errors {
            body["data"] = json!({ "errors": errors });
        }

        (parts.status, axum::Json(body)).into_response()
    }
}

/// Field reported for a violated unique constraint.
fn unique_constraint_field(constraint: &str) -> &'static str {
    match constraint {
        "uq_articles_external_id" | "uq_suppliers_external_id" => "external_id",
        "uq_users_email" => "email",
        _ => "value",
    }
}

/// Classify a sqlx error into a response.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to
///   a 400 field error, the same shape as a failed uniqueness pre-check.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> ErrorParts {
    match err {
        sqlx::Error::RowNotFound => {
            ErrorParts::new(StatusCode::NOT_FOUND, "NOT_FOUND", "Resource not found")
        }
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    let field = unique_constraint_field(constraint);
                    let mut errors = FieldErrors::new();
                    errors.add(field, format!("The {field} has already been taken."));
                    return ErrorParts::invalid(errors);
                }
            }
            tracing::error!(error = %db_err, "Database error");
            ErrorParts::internal()
        }
        other => {
            tracing::error!(error = %other, "Database error");
            ErrorParts::internal()
        }
    }
}
