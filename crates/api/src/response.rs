//! Shared response envelope for API handlers.
//!
//! Every response body is `{ "success": bool, "message": string, "data"?: T }`.
//! Error bodies are produced by [`AppError`](crate::error::AppError) and add a
//! machine-readable `code`.

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

/// Standard response envelope.
///
/// ```ignore
/// Ok(ApiResponse::ok("Article found", detail).into_json())
/// ```
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn into_json(self) -> Json<Self> {
        Json(self)
    }

    /// Pair the envelope with `201 Created`.
    pub fn created(self) -> (StatusCode, Json<Self>) {
        (StatusCode::CREATED, Json(self))
    }
}

impl ApiResponse<()> {
    /// A success envelope without a `data` member.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }
}
