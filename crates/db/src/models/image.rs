//! Article image metadata.

use catalog_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `images` table. The binary lives in the asset store at
/// `storage_path`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Image {
    pub id: DbId,
    pub article_id: DbId,
    pub original_name: String,
    pub storage_path: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub sort_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateImage {
    pub article_id: DbId,
    pub original_name: String,
    pub storage_path: String,
    pub mime_type: String,
    pub size_bytes: i64,
    /// Zero-based position in the upload batch.
    pub sort_order: i32,
}
