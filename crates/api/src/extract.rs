//! Request extractors shared by handlers.

use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::Json;
use catalog_core::validation::validate_input;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::AppError;

/// JSON body that has also passed its `validator` rules.
///
/// Malformed JSON becomes a 400 `BAD_REQUEST`, a body over the upload limit
/// a 413; rule violations become a 400
/// `VALIDATION_ERROR` with the per-field map at `data.errors`.
#[derive(Debug, Clone)]
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| match rejection.status() {
                StatusCode::PAYLOAD_TOO_LARGE => AppError::PayloadTooLarge(rejection.body_text()),
                _ => AppError::BadRequest(rejection.body_text()),
            })?;
        validate_input(&value)?;
        Ok(ValidJson(value))
    }
}
