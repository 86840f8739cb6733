//! Rows produced when loading article/supplier links for many owners at once.

use catalog_core::types::DbId;
use sqlx::FromRow;

use crate::models::article::ArticleSummary;
use crate::models::supplier::SupplierSummary;

/// A supplier summary tagged with the article it is linked to.
#[derive(Debug, Clone, FromRow)]
pub struct LinkedSupplier {
    pub article_id: DbId,
    #[sqlx(flatten)]
    pub supplier: SupplierSummary,
}

/// An article summary tagged with the supplier it is linked to.
#[derive(Debug, Clone, FromRow)]
pub struct LinkedArticle {
    pub supplier_id: DbId,
    #[sqlx(flatten)]
    pub article: ArticleSummary,
}
