//! Repository for the `documents` table.

use catalog_core::types::DbId;
use sqlx::PgPool;

use crate::models::document::{CreateDocument, Document};
use crate::DbTransaction;

const COLUMNS: &str = "id, article_id, original_name, storage_path, mime_type, size_bytes, \
                       description, created_at, updated_at";

pub struct DocumentRepo;

impl DocumentRepo {
    pub async fn create(
        tx: &mut DbTransaction<'_>,
        input: &CreateDocument,
    ) -> Result<Document, sqlx::Error> {
        let query = format!(
            "INSERT INTO documents
                (article_id, original_name, storage_path, mime_type, size_bytes, description)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(input.article_id)
            .bind(&input.original_name)
            .bind(&input.storage_path)
            .bind(&input.mime_type)
            .bind(input.size_bytes)
            .bind(&input.description)
            .fetch_one(&mut **tx)
            .await
    }

    pub async fn list_for_article(
        pool: &PgPool,
        article_id: DbId,
    ) -> Result<Vec<Document>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM documents WHERE article_id = $1 ORDER BY id");
        sqlx::query_as::<_, Document>(&query)
            .bind(article_id)
            .fetch_all(pool)
            .await
    }

    pub async fn list_for_article_tx(
        tx: &mut DbTransaction<'_>,
        article_id: DbId,
    ) -> Result<Vec<Document>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM documents WHERE article_id = $1 ORDER BY id");
        sqlx::query_as::<_, Document>(&query)
            .bind(article_id)
            .fetch_all(&mut **tx)
            .await
    }

    pub async fn list_for_articles(
        pool: &PgPool,
        article_ids: &[DbId],
    ) -> Result<Vec<Document>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM documents WHERE article_id = ANY($1) ORDER BY article_id, id"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(article_ids)
            .fetch_all(pool)
            .await
    }

    pub async fn delete(tx: &mut DbTransaction<'_>, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
