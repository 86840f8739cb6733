//! Repository for the `images` table.

use catalog_core::types::DbId;
use sqlx::PgPool;

use crate::models::image::{CreateImage, Image};
use crate::DbTransaction;

const COLUMNS: &str = "id, article_id, original_name, storage_path, mime_type, size_bytes, \
                       sort_order, created_at, updated_at";

pub struct ImageRepo;

impl ImageRepo {
    pub async fn create(
        tx: &mut DbTransaction<'_>,
        input: &CreateImage,
    ) -> Result<Image, sqlx::Error> {
        let query = format!(
            "INSERT INTO images
                (article_id, original_name, storage_path, mime_type, size_bytes, sort_order)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Image>(&query)
            .bind(input.article_id)
            .bind(&input.original_name)
            .bind(&input.storage_path)
            .bind(&input.mime_type)
            .bind(input.size_bytes)
            .bind(input.sort_order)
            .fetch_one(&mut **tx)
            .await
    }

    /// Images of one article in display order.
    pub async fn list_for_article(
        pool: &PgPool,
        article_id: DbId,
    ) -> Result<Vec<Image>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM images WHERE article_id = $1 ORDER BY sort_order, id"
        );
        sqlx::query_as::<_, Image>(&query)
            .bind(article_id)
            .fetch_all(pool)
            .await
    }

    /// Images of one article, read inside the transaction that will retire them.
    pub async fn list_for_article_tx(
        tx: &mut DbTransaction<'_>,
        article_id: DbId,
    ) -> Result<Vec<Image>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM images WHERE article_id = $1 ORDER BY sort_order, id"
        );
        sqlx::query_as::<_, Image>(&query)
            .bind(article_id)
            .fetch_all(&mut **tx)
            .await
    }

    /// Images of several articles, grouped by article then display order.
    pub async fn list_for_articles(
        pool: &PgPool,
        article_ids: &[DbId],
    ) -> Result<Vec<Image>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM images
             WHERE article_id = ANY($1)
             ORDER BY article_id, sort_order, id"
        );
        sqlx::query_as::<_, Image>(&query)
            .bind(article_ids)
            .fetch_all(pool)
            .await
    }

    pub async fn delete(tx: &mut DbTransaction<'_>, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM images WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
