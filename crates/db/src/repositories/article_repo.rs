//! Repository for the `articles` table.

use catalog_core::types::DbId;
use sqlx::PgPool;

use crate::models::article::{Article, CreateArticle, UpdateArticle};
use crate::DbTransaction;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, external_id, name, description, base_price, tax_category, \
                       tax_percentage, created_at, updated_at";

/// Provides CRUD operations for articles.
pub struct ArticleRepo;

impl ArticleRepo {
    /// Insert a new article, returning the created row.
    pub async fn create(
        tx: &mut DbTransaction<'_>,
        input: &CreateArticle,
    ) -> Result<Article, sqlx::Error> {
        let query = format!(
            "INSERT INTO articles
                (external_id, name, description, base_price, tax_category, tax_percentage)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Article>(&query)
            .bind(&input.external_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.base_price)
            .bind(input.tax_category.as_str())
            .bind(input.tax_percentage)
            .fetch_one(&mut **tx)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Article>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM articles WHERE id = $1");
        sqlx::query_as::<_, Article>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an article and lock its row until the transaction ends.
    pub async fn find_for_update(
        tx: &mut DbTransaction<'_>,
        id: DbId,
    ) -> Result<Option<Article>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM articles WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Article>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// List all articles ordered by id.
    pub async fn list(pool: &PgPool) -> Result<Vec<Article>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM articles ORDER BY id");
        sqlx::query_as::<_, Article>(&query).fetch_all(pool).await
    }

    /// Whether `external_id` belongs to an article other than `exclude_id`.
    pub async fn external_id_taken(
        pool: &PgPool,
        external_id: &str,
        exclude_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                SELECT 1 FROM articles
                WHERE external_id = $1 AND ($2::BIGINT IS NULL OR id <> $2)
             )",
        )
        .bind(external_id)
        .bind(exclude_id)
        .fetch_one(pool)
        .await
    }

    /// Update an article. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        tx: &mut DbTransaction<'_>,
        id: DbId,
        input: &UpdateArticle,
    ) -> Result<Option<Article>, sqlx::Error> {
        let query = format!(
            "UPDATE articles SET
                external_id = COALESCE($2, external_id),
                name = COALESCE($3, name),
                description = COALESCE($4, description),
                base_price = COALESCE($5, base_price),
                tax_category = COALESCE($6, tax_category),
                tax_percentage = COALESCE($7, tax_percentage)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Article>(&query)
            .bind(id)
            .bind(&input.external_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.base_price)
            .bind(input.tax_category.map(|c| c.as_str()))
            .bind(input.tax_percentage)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Delete an article. Links, images and documents go with it through
    /// the foreign-key cascade. Returns `true` if a row was removed.
    pub async fn delete(tx: &mut DbTransaction<'_>, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM articles WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
