//! Article entity model and DTOs.

use catalog_core::catalog::TaxCategory;
use catalog_core::types::{Amount, DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use crate::models::document::Document;
use crate::models::image::Image;
use crate::models::supplier::SupplierSummary;

/// A row from the `articles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Article {
    pub id: DbId,
    pub external_id: String,
    pub name: String,
    pub description: Option<String>,
    pub base_price: Amount,
    #[sqlx(try_from = "String")]
    pub tax_category: TaxCategory,
    pub tax_percentage: Amount,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Compact article view embedded in supplier responses.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ArticleSummary {
    /// Internal key, used for grouping only; never sent to clients.
    #[serde(skip_serializing)]
    pub id: DbId,
    pub external_id: String,
    pub name: String,
    pub base_price: Amount,
}

/// An article with everything it owns or links to.
#[derive(Debug, Clone, Serialize)]
pub struct ArticleDetail {
    #[serde(flatten)]
    pub article: Article,
    /// Ordered by `sort_order`, then `id`.
    pub images: Vec<Image>,
    pub documents: Vec<Document>,
    pub suppliers: Vec<SupplierSummary>,
}

/// DTO for inserting a new article.
#[derive(Debug, Clone)]
pub struct CreateArticle {
    pub external_id: String,
    pub name: String,
    pub description: Option<String>,
    pub base_price: Amount,
    pub tax_category: TaxCategory,
    pub tax_percentage: Amount,
}

/// DTO for patching an article. `None` leaves the column unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateArticle {
    pub external_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub base_price: Option<Amount>,
    pub tax_category: Option<TaxCategory>,
    pub tax_percentage: Option<Amount>,
}
