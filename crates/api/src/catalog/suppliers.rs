//! Supplier operations and the availability check.

use std::collections::BTreeMap;

use catalog_core::availability::{DaySchedule, Weekday, WeeklySchedule};
use catalog_core::catalog::MAX_NAME_LEN;
use catalog_core::error::CoreError;
use catalog_core::types::DbId;
use catalog_core::validation::{parse_time_of_day, FieldErrors};
use catalog_db::models::supplier::{CreateSupplier, Supplier, SupplierDetail, UpdateSupplier};
use catalog_db::repositories::{AssociationRepo, SupplierRepo};
use catalog_db::{DbPool, DbTransaction};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{group_by, required, taken};
use crate::error::AppResult;

fn not_found(id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: "Supplier",
        id,
    }
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One day of a schedule as sent by the client (`"HH:MM:SS"` strings).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DayScheduleInput {
    #[serde(default)]
    pub open: Option<String>,
    #[serde(default)]
    pub close: Option<String>,
}

/// Request body for `POST /proveedores` and `PUT /proveedores/{id}`.
///
/// `schedule` maps weekday names to a day entry; `null` clears that day and
/// days not listed are left as they are. `article_ids` absent leaves links
/// untouched, an empty list detaches every article.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SupplierRequest {
    #[validate(length(
        min = 1,
        max = MAX_NAME_LEN,
        message = "The external_id must be between 1 and 255 characters."
    ))]
    pub external_id: Option<String>,
    #[validate(length(
        min = 1,
        max = MAX_NAME_LEN,
        message = "The commercial_name must be between 1 and 255 characters."
    ))]
    pub commercial_name: Option<String>,
    pub always_open: Option<bool>,
    #[serde(default)]
    pub schedule: BTreeMap<Weekday, Option<DayScheduleInput>>,
    pub article_ids: Option<Vec<String>>,
}

impl SupplierRequest {
    /// Fold the requested days into `schedule`, recording malformed times.
    fn merge_schedule(&self, schedule: &mut WeeklySchedule, errors: &mut FieldErrors) {
        for (day, entry) in &self.schedule {
            let Some(entry) = entry else {
                schedule.clear(*day);
                continue;
            };
            let open = parse_bound(errors, *day, "open", entry.open.as_deref());
            let close = parse_bound(errors, *day, "close", entry.close.as_deref());
            schedule.set(*day, DaySchedule::new(open, close));
        }
    }

    /// Validate for creation. `errors` may already hold findings.
    pub fn into_create(self, mut errors: FieldErrors) -> Result<NewSupplier, CoreError> {
        if self.external_id.is_none() {
            required(&mut errors, "external_id");
        }
        if self.commercial_name.is_none() {
            required(&mut errors, "commercial_name");
        }
        if self.always_open.is_none() {
            required(&mut errors, "always_open");
        }

        let mut schedule = WeeklySchedule::default();
        self.merge_schedule(&mut schedule, &mut errors);

        match (self.external_id, self.commercial_name, self.always_open) {
            (Some(external_id), Some(commercial_name), Some(always_open)) if errors.is_empty() => {
                Ok(NewSupplier {
                    supplier: CreateSupplier {
                        external_id,
                        commercial_name,
                        always_open,
                        schedule,
                    },
                    article_ids: self.article_ids,
                })
            }
            _ => Err(CoreError::InvalidFields(errors)),
        }
    }

    /// Validate for a partial update against the stored schedule.
    pub fn into_update(
        self,
        current: &WeeklySchedule,
        mut errors: FieldErrors,
    ) -> Result<SupplierChanges, CoreError> {
        let schedule = if self.schedule.is_empty() {
            None
        } else {
            let mut merged = current.clone();
            self.merge_schedule(&mut merged, &mut errors);
            Some(merged)
        };
        errors.into_result()?;

        Ok(SupplierChanges {
            supplier: UpdateSupplier {
                external_id: self.external_id,
                commercial_name: self.commercial_name,
                always_open: self.always_open,
                schedule,
            },
            article_ids: self.article_ids,
        })
    }
}

fn parse_bound(
    errors: &mut FieldErrors,
    day: Weekday,
    bound: &str,
    value: Option<&str>,
) -> Option<NaiveTime> {
    let value = value.filter(|v| !v.is_empty())?;
    let parsed = parse_time_of_day(value);
    if parsed.is_none() {
        let field = format!("schedule.{day}.{bound}");
        errors.add(
            &field,
            format!("The {field} does not match the format HH:MM:SS."),
        );
    }
    parsed
}

#[derive(Debug)]
pub struct NewSupplier {
    pub supplier: CreateSupplier,
    pub article_ids: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct SupplierChanges {
    pub supplier: UpdateSupplier,
    pub article_ids: Option<Vec<String>>,
}

/// Result of an availability check.
#[derive(Debug, Clone, Serialize)]
pub struct Availability {
    pub supplier_id: DbId,
    pub external_id: String,
    pub commercial_name: String,
    pub day: Weekday,
    pub time: Option<NaiveTime>,
    pub available: bool,
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

pub async fn create_supplier(pool: &DbPool, request: SupplierRequest) -> AppResult<SupplierDetail> {
    let mut errors = FieldErrors::new();
    if let Some(external_id) = request.external_id.as_deref() {
        if SupplierRepo::external_id_taken(pool, external_id, None).await? {
            taken(&mut errors, "external_id");
        }
    }
    let input = request.into_create(errors)?;

    let mut tx = pool.begin().await?;
    let supplier = SupplierRepo::create(&mut tx, &input.supplier).await?;
    if let Some(external_ids) = &input.article_ids {
        AssociationRepo::sync_articles_for_supplier(&mut tx, supplier.id, external_ids).await?;
    }
    tx.commit().await?;

    tracing::debug!(supplier_id = supplier.id, "Supplier created");
    get_supplier(pool, supplier.id).await
}

pub async fn get_supplier(pool: &DbPool, id: DbId) -> AppResult<SupplierDetail> {
    let supplier = find(pool, id).await?;
    let articles = AssociationRepo::articles_for_supplier(pool, id).await?;
    Ok(SupplierDetail::new(supplier, articles))
}

async fn find(pool: &DbPool, id: DbId) -> AppResult<Supplier> {
    SupplierRepo::find_by_id(pool, id)
        .await?
        .ok_or_else(|| not_found(id).into())
}

/// Apply a partial update. Schedule days in the request replace the stored
/// ones; the others are kept.
pub async fn update_supplier(
    pool: &DbPool,
    id: DbId,
    request: SupplierRequest,
) -> AppResult<SupplierDetail> {
    find(pool, id).await?;

    let mut errors = FieldErrors::new();
    if let Some(external_id) = request.external_id.as_deref() {
        if SupplierRepo::external_id_taken(pool, external_id, Some(id)).await? {
            taken(&mut errors, "external_id");
        }
    }

    let mut tx = pool.begin().await?;
    apply_update(&mut tx, id, request, errors).await?;
    tx.commit().await?;

    tracing::debug!(supplier_id = id, "Supplier updated");
    get_supplier(pool, id).await
}

async fn apply_update(
    tx: &mut DbTransaction<'_>,
    id: DbId,
    request: SupplierRequest,
    errors: FieldErrors,
) -> AppResult<()> {
    // The schedule merge reads the locked row so concurrent day updates do
    // not overwrite each other.
    let current = SupplierRepo::find_for_update(tx, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let changes = request.into_update(&current.schedule(), errors)?;

    SupplierRepo::update(tx, id, &changes.supplier)
        .await?
        .ok_or_else(|| not_found(id))?;
    if let Some(external_ids) = &changes.article_ids {
        AssociationRepo::sync_articles_for_supplier(tx, id, external_ids).await?;
    }
    Ok(())
}

/// Delete a supplier. Its article links go with it through the FK cascade.
pub async fn delete_supplier(pool: &DbPool, id: DbId) -> AppResult<()> {
    let mut tx = pool.begin().await?;
    if !SupplierRepo::delete(&mut tx, id).await? {
        tracing::warn!(supplier_id = id, "Supplier not found for deletion");
        return Err(not_found(id).into());
    }
    tx.commit().await?;
    tracing::debug!(supplier_id = id, "Supplier deleted");
    Ok(())
}

/// Every supplier with its linked articles, ordered by id.
pub async fn list_suppliers(pool: &DbPool) -> AppResult<Vec<SupplierDetail>> {
    let suppliers = SupplierRepo::list(pool).await?;
    let ids: Vec<DbId> = suppliers.iter().map(|s| s.id).collect();
    let mut articles = group_by(
        AssociationRepo::articles_for_suppliers(pool, &ids).await?,
        |link| link.supplier_id,
    );

    Ok(suppliers
        .into_iter()
        .map(|supplier| {
            let linked = articles
                .remove(&supplier.id)
                .unwrap_or_default()
                .into_iter()
                .map(|link| link.article)
                .collect();
            SupplierDetail::new(supplier, linked)
        })
        .collect())
}

/// Whether supplier `id` is open on `day` (and at `time`, when given).
///
/// An unknown supplier is reported before any parameter problem.
pub async fn check_availability(
    pool: &DbPool,
    id: DbId,
    day: Option<&str>,
    time: Option<&str>,
) -> AppResult<Availability> {
    let supplier = find(pool, id).await?;
    let (day, time) = parse_availability_query(day, time)?;
    let available = supplier.calendar().is_available(day, time);

    tracing::debug!(supplier_id = id, %day, available, "Availability checked");
    Ok(Availability {
        supplier_id: supplier.id,
        external_id: supplier.external_id,
        commercial_name: supplier.commercial_name,
        day,
        time,
        available,
    })
}

fn parse_availability_query(
    day: Option<&str>,
    time: Option<&str>,
) -> Result<(Weekday, Option<NaiveTime>), CoreError> {
    let mut errors = FieldErrors::new();

    let day = match day.filter(|d| !d.is_empty()) {
        None => {
            required(&mut errors, "dia");
            None
        }
        Some(value) => match value.parse::<Weekday>() {
            Ok(day) => Some(day),
            Err(_) => {
                errors.add("dia", "The selected dia is invalid.");
                None
            }
        },
    };

    let time = match time.filter(|t| !t.is_empty()) {
        None => None,
        Some(value) => {
            let parsed = parse_time_of_day(value);
            if parsed.is_none() {
                errors.add("hora", "The hora does not match the format HH:MM:SS.");
            }
            parsed
        }
    };

    match day {
        Some(day) if errors.is_empty() => Ok((day, time)),
        _ => Err(CoreError::InvalidFields(errors)),
    }
}
