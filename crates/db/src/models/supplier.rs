//! Supplier entity model and DTOs.
//!
//! The weekly schedule is stored as fourteen nullable `TIME` columns
//! (`monday_open`, `monday_close`, ... `sunday_close`). The row struct mirrors
//! them one-to-one; [`Supplier::calendar`] folds them into the domain type.

use catalog_core::availability::{DaySchedule, SupplierCalendar, Weekday, WeeklySchedule};
use catalog_core::types::{DbId, Timestamp};
use chrono::NaiveTime;
use serde::Serialize;
use sqlx::FromRow;

use crate::models::article::ArticleSummary;

/// Column-name prefix of each weekday's open/close pair.
pub fn schedule_column_prefix(day: Weekday) -> &'static str {
    match day {
        Weekday::Monday => "monday",
        Weekday::Tuesday => "tuesday",
        Weekday::Wednesday => "wednesday",
        Weekday::Thursday => "thursday",
        Weekday::Friday => "friday",
        Weekday::Saturday => "saturday",
        Weekday::Sunday => "sunday",
    }
}

/// A row from the `suppliers` table.
#[derive(Debug, Clone, FromRow)]
pub struct Supplier {
    pub id: DbId,
    pub external_id: String,
    pub commercial_name: String,
    pub always_open: bool,
    pub monday_open: Option<NaiveTime>,
    pub monday_close: Option<NaiveTime>,
    pub tuesday_open: Option<NaiveTime>,
    pub tuesday_close: Option<NaiveTime>,
    pub wednesday_open: Option<NaiveTime>,
    pub wednesday_close: Option<NaiveTime>,
    pub thursday_open: Option<NaiveTime>,
    pub thursday_close: Option<NaiveTime>,
    pub friday_open: Option<NaiveTime>,
    pub friday_close: Option<NaiveTime>,
    pub saturday_open: Option<NaiveTime>,
    pub saturday_close: Option<NaiveTime>,
    pub sunday_open: Option<NaiveTime>,
    pub sunday_close: Option<NaiveTime>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Supplier {
    pub fn schedule(&self) -> WeeklySchedule {
        let mut schedule = WeeklySchedule::default();
        let pairs = [
            (self.monday_open, self.monday_close),
            (self.tuesday_open, self.tuesday_close),
            (self.wednesday_open, self.wednesday_close),
            (self.thursday_open, self.thursday_close),
            (self.friday_open, self.friday_close),
            (self.saturday_open, self.saturday_close),
            (self.sunday_open, self.sunday_close),
        ];
        for (day, (open, close)) in Weekday::ALL.into_iter().zip(pairs) {
            schedule.set(day, DaySchedule::new(open, close));
        }
        schedule
    }

    /// The inputs of the availability rule.
    pub fn calendar(&self) -> SupplierCalendar {
        SupplierCalendar {
            always_open: self.always_open,
            schedule: self.schedule(),
        }
    }
}

/// Compact supplier view embedded in article responses.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SupplierSummary {
    /// Internal key, used for grouping only; never sent to clients.
    #[serde(skip_serializing)]
    pub id: DbId,
    pub external_id: String,
    pub commercial_name: String,
    pub always_open: bool,
}

/// A supplier as returned by the API: schedule keyed by weekday plus linked
/// articles.
#[derive(Debug, Clone, Serialize)]
pub struct SupplierDetail {
    pub id: DbId,
    pub external_id: String,
    pub commercial_name: String,
    pub always_open: bool,
    pub schedule: WeeklySchedule,
    pub articles: Vec<ArticleSummary>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl SupplierDetail {
    pub fn new(supplier: Supplier, articles: Vec<ArticleSummary>) -> Self {
        let schedule = supplier.schedule();
        Self {
            id: supplier.id,
            external_id: supplier.external_id,
            commercial_name: supplier.commercial_name,
            always_open: supplier.always_open,
            schedule,
            articles,
            created_at: supplier.created_at,
            updated_at: supplier.updated_at,
        }
    }
}

/// DTO for inserting a new supplier.
#[derive(Debug, Clone)]
pub struct CreateSupplier {
    pub external_id: String,
    pub commercial_name: String,
    pub always_open: bool,
    pub schedule: WeeklySchedule,
}

/// DTO for patching a supplier.
///
/// `schedule`, when present, overwrites all fourteen columns; callers merge
/// partial day updates into the current schedule first.
#[derive(Debug, Clone, Default)]
pub struct UpdateSupplier {
    pub external_id: Option<String>,
    pub commercial_name: Option<String>,
    pub always_open: Option<bool>,
    pub schedule: Option<WeeklySchedule>,
}
