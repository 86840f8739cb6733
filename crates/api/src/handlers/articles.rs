//! Handlers for the `/articulos` resource.
//!
//! Create and update take `multipart/form-data` so images and documents can
//! travel with the article fields.

use axum::extract::multipart::{Field, MultipartError};
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use catalog_core::assets::UploadedFile;
use catalog_core::types::DbId;
use catalog_db::models::article::ArticleDetail;
use serde::Serialize;

use crate::catalog::articles::{self, ArticleForm};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Payload of `GET /articulos`.
#[derive(Debug, Serialize)]
pub struct ArticleList {
    pub articles: Vec<ArticleDetail>,
}

/// POST /api/articulos
pub async fn create_article(
    State(state): State<AppState>,
    _auth: AuthUser,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<ApiResponse<ArticleDetail>>)> {
    let form = read_article_form(multipart).await?;
    let detail = articles::create_article(&state.pool, state.storage.as_ref(), form).await?;
    Ok(ApiResponse::ok("Article created", detail).created())
}

/// GET /api/articulos
pub async fn list_articles(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> AppResult<Json<ApiResponse<ArticleList>>> {
    let articles = articles::list_articles(&state.pool).await?;
    tracing::debug!(count = articles.len(), "Listed articles");
    Ok(ApiResponse::ok("Article list", ArticleList { articles }).into_json())
}

/// GET /api/articulos/{id}
pub async fn get_article(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<ArticleDetail>>> {
    let detail = articles::get_article(&state.pool, id).await?;
    Ok(ApiResponse::ok("Article found", detail).into_json())
}

/// POST /api/articulos/{id}
///
/// Partial update; see [`articles::update_article`] for replacement rules.
pub async fn update_article(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<Json<ApiResponse<ArticleDetail>>> {
    let form = read_article_form(multipart).await?;
    let detail = articles::update_article(&state.pool, state.storage.as_ref(), id, form).await?;
    Ok(ApiResponse::ok("Article updated", detail).into_json())
}

/// DELETE /api/articulos/{id}
pub async fn delete_article(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<()>>> {
    articles::delete_article(&state.pool, state.storage.as_ref(), id).await?;
    Ok(ApiResponse::message("Article deleted").into_json())
}

// ---------------------------------------------------------------------------
// Multipart parsing
// ---------------------------------------------------------------------------

fn multipart_error(e: MultipartError) -> AppError {
    match e.status() {
        StatusCode::PAYLOAD_TOO_LARGE => AppError::PayloadTooLarge(e.body_text()),
        _ => AppError::BadRequest(format!("Invalid multipart body: {}", e.body_text())),
    }
}

/// Collect the article fields and files from a multipart body.
///
/// Repeated fields may be named with or without a `[]` suffix. Text values are
/// trimmed and kept even when empty, so validation can tell "sent empty" from
/// "not sent"; an empty `suppliers` value means "send an empty list".
async fn read_article_form(mut multipart: Multipart) -> AppResult<ArticleForm> {
    let mut form = ArticleForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.trim_end_matches("[]") {
            "images" => {
                if let Some(file) = read_file(field).await? {
                    form.images.push(file);
                }
            }
            "documents" => {
                if let Some(file) = read_file(field).await? {
                    form.documents.push(file);
                }
            }
            "suppliers" => {
                let value = field.text().await.map_err(multipart_error)?;
                let suppliers = form.suppliers.get_or_insert_with(Vec::new);
                if !value.trim().is_empty() {
                    suppliers.push(value.trim().to_string());
                }
            }
            "external_id" => form.external_id = read_text(field).await?,
            "name" => form.name = read_text(field).await?,
            "description" => form.description = read_text(field).await?,
            "base_price" => form.base_price = read_text(field).await?,
            "tax_category" => form.tax_category = read_text(field).await?,
            "tax_percentage" => form.tax_percentage = read_text(field).await?,
            other => tracing::debug!(field = other, "Ignoring unknown multipart field"),
        }
    }

    Ok(form)
}

async fn read_text(field: Field<'_>) -> AppResult<Option<String>> {
    let value = field.text().await.map_err(multipart_error)?;
    Ok(Some(value.trim().to_string()))
}

/// A file part, or `None` for the empty part browsers send for an unused
/// file input.
async fn read_file(field: Field<'_>) -> AppResult<Option<UploadedFile>> {
    let original_name = field.file_name().unwrap_or_default().to_string();
    let declared_mime = field.content_type().map(str::to_string);
    let data = field.bytes().await.map_err(multipart_error)?;

    if original_name.is_empty() && data.is_empty() {
        return Ok(None);
    }
    Ok(Some(UploadedFile {
        original_name,
        declared_mime,
        data: data.to_vec(),
    }))
}
