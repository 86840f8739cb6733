//! Repository for the `article_suppliers` link table.
//!
//! Links are addressed by external ids on input. Ids that match no row are
//! dropped; the link set of the owner becomes exactly the resolved set.
//! Links present before and after a sync are not rewritten.

use std::collections::BTreeSet;

use catalog_core::types::DbId;
use sqlx::PgPool;

use crate::models::article::ArticleSummary;
use crate::models::association::{LinkedArticle, LinkedSupplier};
use crate::models::supplier::SupplierSummary;
use crate::DbTransaction;

pub struct AssociationRepo;

impl AssociationRepo {
    /// Replace the suppliers linked to `article_id` with those whose
    /// external ids are listed. Returns the number of linked suppliers.
    pub async fn sync_suppliers_for_article(
        tx: &mut DbTransaction<'_>,
        article_id: DbId,
        supplier_external_ids: &[String],
    ) -> Result<usize, sqlx::Error> {
        let requested = dedup(supplier_external_ids);
        let supplier_ids =
            resolve_ids(tx, "SELECT id FROM suppliers WHERE external_id = ANY($1)", &requested)
                .await?;

        sqlx::query(
            "DELETE FROM article_suppliers
             WHERE article_id = $1 AND NOT (supplier_id = ANY($2))",
        )
        .bind(article_id)
        .bind(&supplier_ids)
        .execute(&mut **tx)
        .await?;

        sqlx::query(
            "INSERT INTO article_suppliers (article_id, supplier_id)
             SELECT $1, UNNEST($2::BIGINT[])
             ON CONFLICT (article_id, supplier_id) DO NOTHING",
        )
        .bind(article_id)
        .bind(&supplier_ids)
        .execute(&mut **tx)
        .await?;

        log_dropped("supplier", requested.len(), supplier_ids.len());
        tracing::debug!(article_id, count = supplier_ids.len(), "Synced article suppliers");
        Ok(supplier_ids.len())
    }

    /// Replace the articles linked to `supplier_id` with those whose
    /// external ids are listed. Returns the number of linked articles.
    pub async fn sync_articles_for_supplier(
        tx: &mut DbTransaction<'_>,
        supplier_id: DbId,
        article_external_ids: &[String],
    ) -> Result<usize, sqlx::Error> {
        let requested = dedup(article_external_ids);
        let article_ids =
            resolve_ids(tx, "SELECT id FROM articles WHERE external_id = ANY($1)", &requested)
                .await?;

        sqlx::query(
            "DELETE FROM article_suppliers
             WHERE supplier_id = $1 AND NOT (article_id = ANY($2))",
        )
        .bind(supplier_id)
        .bind(&article_ids)
        .execute(&mut **tx)
        .await?;

        sqlx::query(
            "INSERT INTO article_suppliers (article_id, supplier_id)
             SELECT UNNEST($2::BIGINT[]), $1
             ON CONFLICT (article_id, supplier_id) DO NOTHING",
        )
        .bind(supplier_id)
        .bind(&article_ids)
        .execute(&mut **tx)
        .await?;

        log_dropped("article", requested.len(), article_ids.len());
        tracing::debug!(supplier_id, count = article_ids.len(), "Synced supplier articles");
        Ok(article_ids.len())
    }

    /// Suppliers linked to one article, ordered by supplier id.
    pub async fn suppliers_for_article(
        pool: &PgPool,
        article_id: DbId,
    ) -> Result<Vec<SupplierSummary>, sqlx::Error> {
        sqlx::query_as::<_, SupplierSummary>(
            "SELECT s.id, s.external_id, s.commercial_name, s.always_open
             FROM suppliers s
             JOIN article_suppliers l ON l.supplier_id = s.id
             WHERE l.article_id = $1
             ORDER BY s.id",
        )
        .bind(article_id)
        .fetch_all(pool)
        .await
    }

    /// Suppliers linked to any of `article_ids`, tagged with the article.
    pub async fn suppliers_for_articles(
        pool: &PgPool,
        article_ids: &[DbId],
    ) -> Result<Vec<LinkedSupplier>, sqlx::Error> {
        sqlx::query_as::<_, LinkedSupplier>(
            "SELECT l.article_id, s.id, s.external_id, s.commercial_name, s.always_open
             FROM suppliers s
             JOIN article_suppliers l ON l.supplier_id = s.id
             WHERE l.article_id = ANY($1)
             ORDER BY l.article_id, s.id",
        )
        .bind(article_ids)
        .fetch_all(pool)
        .await
    }

    /// Articles linked to one supplier, ordered by article id.
    pub async fn articles_for_supplier(
        pool: &PgPool,
        supplier_id: DbId,
    ) -> Result<Vec<ArticleSummary>, sqlx::Error> {
        sqlx::query_as::<_, ArticleSummary>(
            "SELECT a.id, a.external_id, a.name, a.base_price
             FROM articles a
             JOIN article_suppliers l ON l.article_id = a.id
             WHERE l.supplier_id = $1
             ORDER BY a.id",
        )
        .bind(supplier_id)
        .fetch_all(pool)
        .await
    }

    /// Articles linked to any of `supplier_ids`, tagged with the supplier.
    pub async fn articles_for_suppliers(
        pool: &PgPool,
        supplier_ids: &[DbId],
    ) -> Result<Vec<LinkedArticle>, sqlx::Error> {
        sqlx::query_as::<_, LinkedArticle>(
            "SELECT l.supplier_id, a.id, a.external_id, a.name, a.base_price
             FROM articles a
             JOIN article_suppliers l ON l.article_id = a.id
             WHERE l.supplier_id = ANY($1)
             ORDER BY l.supplier_id, a.id",
        )
        .bind(supplier_ids)
        .fetch_all(pool)
        .await
    }
}

fn dedup(external_ids: &[String]) -> Vec<String> {
    external_ids
        .iter()
        .map(|id| id.trim())
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

async fn resolve_ids(
    tx: &mut DbTransaction<'_>,
    query: &str,
    external_ids: &[String],
) -> Result<Vec<DbId>, sqlx::Error> {
    sqlx::query_scalar::<_, DbId>(query)
        .bind(external_ids)
        .fetch_all(&mut **tx)
        .await
}

fn log_dropped(entity: &str, requested: usize, resolved: usize) {
    if resolved < requested {
        tracing::debug!(
            entity,
            dropped = requested - resolved,
            "Ignored unknown external ids while syncing links"
        );
    }
}
