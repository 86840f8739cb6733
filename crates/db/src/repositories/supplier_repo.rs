//! Repository for the `suppliers` table.

use catalog_core::availability::{Weekday, WeeklySchedule};
use catalog_core::types::DbId;
use sqlx::PgPool;

use crate::models::supplier::{schedule_column_prefix, CreateSupplier, Supplier, UpdateSupplier};
use crate::DbTransaction;

const COLUMNS: &str = "id, external_id, commercial_name, always_open, \
                       monday_open, monday_close, tuesday_open, tuesday_close, \
                       wednesday_open, wednesday_close, thursday_open, thursday_close, \
                       friday_open, friday_close, saturday_open, saturday_close, \
                       sunday_open, sunday_close, created_at, updated_at";

/// The fourteen schedule columns in weekday order, open before close.
fn schedule_columns() -> Vec<String> {
    Weekday::ALL
        .into_iter()
        .flat_map(|day| {
            let prefix = schedule_column_prefix(day);
            [format!("{prefix}_open"), format!("{prefix}_close")]
        })
        .collect()
}

/// Bind a schedule's fourteen values in the order of [`schedule_columns`].
fn bind_schedule<'q>(
    mut query: sqlx::query::QueryAs<'q, sqlx::Postgres, Supplier, sqlx::postgres::PgArguments>,
    schedule: &WeeklySchedule,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, Supplier, sqlx::postgres::PgArguments> {
    for (_, entry) in schedule.entries() {
        query = query.bind(entry.open).bind(entry.close);
    }
    query
}

/// Provides CRUD operations for suppliers.
pub struct SupplierRepo;

impl SupplierRepo {
    /// Insert a new supplier, returning the created row.
    pub async fn create(
        tx: &mut DbTransaction<'_>,
        input: &CreateSupplier,
    ) -> Result<Supplier, sqlx::Error> {
        let columns = schedule_columns();
        let placeholders: Vec<String> = (4..4 + columns.len()).map(|i| format!("${i}")).collect();
        let query = format!(
            "INSERT INTO suppliers (external_id, commercial_name, always_open, {})
             VALUES ($1, $2, $3, {})
             RETURNING {COLUMNS}",
            columns.join(", "),
            placeholders.join(", "),
        );
        let q = sqlx::query_as::<_, Supplier>(&query)
            .bind(&input.external_id)
            .bind(&input.commercial_name)
            .bind(input.always_open);
        bind_schedule(q, &input.schedule)
            .fetch_one(&mut **tx)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Supplier>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM suppliers WHERE id = $1");
        sqlx::query_as::<_, Supplier>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a supplier and lock its row until the transaction ends.
    pub async fn find_for_update(
        tx: &mut DbTransaction<'_>,
        id: DbId,
    ) -> Result<Option<Supplier>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM suppliers WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Supplier>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// List all suppliers ordered by id.
    pub async fn list(pool: &PgPool) -> Result<Vec<Supplier>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM suppliers ORDER BY id");
        sqlx::query_as::<_, Supplier>(&query).fetch_all(pool).await
    }

    /// Whether `external_id` belongs to a supplier other than `exclude_id`.
    pub async fn external_id_taken(
        pool: &PgPool,
        external_id: &str,
        exclude_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                SELECT 1 FROM suppliers
                WHERE external_id = $1 AND ($2::BIGINT IS NULL OR id <> $2)
             )",
        )
        .bind(external_id)
        .bind(exclude_id)
        .fetch_one(pool)
        .await
    }

    /// Update a supplier. Only non-`None` fields in `input` are applied;
    /// a present schedule replaces all fourteen time columns.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        tx: &mut DbTransaction<'_>,
        id: DbId,
        input: &UpdateSupplier,
    ) -> Result<Option<Supplier>, sqlx::Error> {
        let mut assignments = vec![
            "external_id = COALESCE($2, external_id)".to_string(),
            "commercial_name = COALESCE($3, commercial_name)".to_string(),
            "always_open = COALESCE($4, always_open)".to_string(),
        ];
        if input.schedule.is_some() {
            assignments.extend(
                schedule_columns()
                    .iter()
                    .enumerate()
                    .map(|(i, column)| format!("{column} = ${}", i + 5)),
            );
        }
        let query = format!(
            "UPDATE suppliers SET {}
             WHERE id = $1
             RETURNING {COLUMNS}",
            assignments.join(", ")
        );

        let mut q = sqlx::query_as::<_, Supplier>(&query)
            .bind(id)
            .bind(&input.external_id)
            .bind(&input.commercial_name)
            .bind(input.always_open);
        if let Some(schedule) = &input.schedule {
            q = bind_schedule(q, schedule);
        }
        q.fetch_optional(&mut **tx).await
    }

    /// Delete a supplier; its article links go with it through the
    /// foreign-key cascade. Returns `true` if a row was removed.
    pub async fn delete(tx: &mut DbTransaction<'_>, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM suppliers WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
