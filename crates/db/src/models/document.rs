//! Article document metadata.

use catalog_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `documents` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Document {
    pub id: DbId,
    pub article_id: DbId,
    pub original_name: String,
    pub storage_path: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateDocument {
    pub article_id: DbId,
    pub original_name: String,
    pub storage_path: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub description: Option<String>,
}
