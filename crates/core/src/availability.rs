//! Supplier weekly calendars and the availability rule.
//!
//! A supplier is either flagged as always open, or carries up to seven
//! per-weekday entries, each with an optional open and close time. Times are
//! local wall-clock values with no timezone.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveTime;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Weekday
// ---------------------------------------------------------------------------

/// Day of the week. Wire names are the Spanish day names used by the API;
/// English names are accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weekday {
    #[serde(rename = "lunes", alias = "monday")]
    Monday,
    #[serde(rename = "martes", alias = "tuesday")]
    Tuesday,
    #[serde(rename = "miercoles", alias = "wednesday")]
    Wednesday,
    #[serde(rename = "jueves", alias = "thursday")]
    Thursday,
    #[serde(rename = "viernes", alias = "friday")]
    Friday,
    #[serde(rename = "sabado", alias = "saturday")]
    Saturday,
    #[serde(rename = "domingo", alias = "sunday")]
    Sunday,
}

impl Weekday {
    /// Monday first, matching the schedule column order.
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// Wire name (`"lunes"`, `"martes"`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Weekday::Monday => "lunes",
            Weekday::Tuesday => "martes",
            Weekday::Wednesday => "miercoles",
            Weekday::Thursday => "jueves",
            Weekday::Friday => "viernes",
            Weekday::Saturday => "sabado",
            Weekday::Sunday => "domingo",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Weekday {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lunes" | "monday" => Ok(Weekday::Monday),
            "martes" | "tuesday" => Ok(Weekday::Tuesday),
            "miercoles" | "miércoles" | "wednesday" => Ok(Weekday::Wednesday),
            "jueves" | "thursday" => Ok(Weekday::Thursday),
            "viernes" | "friday" => Ok(Weekday::Friday),
            "sabado" | "sábado" | "saturday" => Ok(Weekday::Saturday),
            "domingo" | "sunday" => Ok(Weekday::Sunday),
            other => Err(CoreError::Validation(format!(
                "Unknown weekday '{other}'. Must be one of: lunes, martes, miercoles, \
                 jueves, viernes, sabado, domingo"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Schedules
// ---------------------------------------------------------------------------

/// Opening hours for one weekday. Either bound may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySchedule {
    pub open: Option<NaiveTime>,
    pub close: Option<NaiveTime>,
}

impl DaySchedule {
    pub fn new(open: Option<NaiveTime>, close: Option<NaiveTime>) -> Self {
        Self { open, close }
    }

    /// An entry with neither bound counts as no entry at all.
    pub fn is_empty(&self) -> bool {
        self.open.is_none() && self.close.is_none()
    }

    /// Inclusive `open <= time <= close`. Incomplete entries match nothing,
    /// and there is no wrap past midnight: `close < open` matches nothing.
    pub fn contains(&self, time: NaiveTime) -> bool {
        match (self.open, self.close) {
            (Some(open), Some(close)) => open <= time && time <= close,
            _ => false,
        }
    }
}

/// Seven optional day entries, Monday through Sunday.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeeklySchedule {
    days: [DaySchedule; 7],
}

impl WeeklySchedule {
    /// The entry for `day`, or `None` when the day has no hours.
    pub fn get(&self, day: Weekday) -> Option<&DaySchedule> {
        let entry = &self.days[day.index()];
        (!entry.is_empty()).then_some(entry)
    }

    pub fn set(&mut self, day: Weekday, entry: DaySchedule) {
        self.days[day.index()] = entry;
    }

    pub fn clear(&mut self, day: Weekday) {
        self.days[day.index()] = DaySchedule::default();
    }

    /// All seven raw entries in weekday order (empty entries included).
    pub fn entries(&self) -> impl Iterator<Item = (Weekday, &DaySchedule)> {
        Weekday::ALL.iter().map(move |d| (*d, &self.days[d.index()]))
    }
}

impl Serialize for WeeklySchedule {
    /// `{ "lunes": { "open": "09:00:00", "close": "18:00:00" }, "martes": null, ... }`
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(7))?;
        for day in Weekday::ALL {
            map.serialize_entry(day.as_str(), &self.get(day))?;
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// Availability rule
// ---------------------------------------------------------------------------

/// The parts of a supplier that decide availability.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupplierCalendar {
    pub always_open: bool,
    pub schedule: WeeklySchedule,
}

impl SupplierCalendar {
    /// Whether the supplier is open on `day` (and at `time`, when given).
    ///
    /// `always_open` wins over any stored schedule. Without a time, having
    /// any entry for the day is enough.
    pub fn is_available(&self, day: Weekday, time: Option<NaiveTime>) -> bool {
        if self.always_open {
            return true;
        }

        let Some(entry) = self.schedule.get(day) else {
            return false;
        };

        match time {
            None => true,
            Some(time) => entry.contains(time),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    fn office_hours() -> DaySchedule {
        DaySchedule::new(Some(t(9, 0, 0)), Some(t(18, 0, 0)))
    }

    fn weekdays_only() -> SupplierCalendar {
        let mut schedule = WeeklySchedule::default();
        for day in &Weekday::ALL[..5] {
            schedule.set(*day, office_hours());
        }
        SupplierCalendar {
            always_open: false,
            schedule,
        }
    }

    #[test]
    fn always_open_ignores_day_and_time() {
        let calendar = SupplierCalendar {
            always_open: true,
            schedule: WeeklySchedule::default(),
        };
        for day in Weekday::ALL {
            assert!(calendar.is_available(day, None));
            assert!(calendar.is_available(day, Some(t(3, 0, 0))));
            assert!(calendar.is_available(day, Some(t(23, 59, 59))));
        }
    }

    #[test]
    fn always_open_wins_over_schedule() {
        let mut calendar = weekdays_only();
        calendar.always_open = true;
        assert!(calendar.is_available(Weekday::Monday, Some(t(22, 0, 0))));
        assert!(calendar.is_available(Weekday::Sunday, Some(t(22, 0, 0))));
    }

    #[test]
    fn day_without_schedule_is_closed() {
        let calendar = weekdays_only();
        assert!(!calendar.is_available(Weekday::Saturday, None));
        assert!(!calendar.is_available(Weekday::Sunday, Some(t(12, 0, 0))));
    }

    #[test]
    fn day_with_schedule_and_no_time_is_open() {
        assert!(weekdays_only().is_available(Weekday::Wednesday, None));
    }

    #[test]
    fn bounds_are_inclusive() {
        let calendar = weekdays_only();
        let d = Weekday::Tuesday;
        assert!(calendar.is_available(d, Some(t(9, 0, 0))));
        assert!(calendar.is_available(d, Some(t(18, 0, 0))));
        assert!(calendar.is_available(d, Some(t(12, 30, 0))));
        assert!(!calendar.is_available(d, Some(t(8, 59, 59))));
        assert!(!calendar.is_available(d, Some(t(18, 0, 1))));
    }

    #[test]
    fn incomplete_entry_is_closed_at_any_time() {
        let mut schedule = WeeklySchedule::default();
        schedule.set(Weekday::Monday, DaySchedule::new(Some(t(9, 0, 0)), None));
        let calendar = SupplierCalendar {
            always_open: false,
            schedule,
        };
        // The day has an entry, so it operates that day...
        assert!(calendar.is_available(Weekday::Monday, None));
        // ...but without both bounds no time is inside it.
        assert!(!calendar.is_available(Weekday::Monday, Some(t(10, 0, 0))));
    }

    #[test]
    fn overnight_range_does_not_wrap() {
        let mut schedule = WeeklySchedule::default();
        schedule.set(
            Weekday::Friday,
            DaySchedule::new(Some(t(22, 0, 0)), Some(t(2, 0, 0))),
        );
        let calendar = SupplierCalendar {
            always_open: false,
            schedule,
        };
        assert!(!calendar.is_available(Weekday::Friday, Some(t(23, 0, 0))));
        assert!(!calendar.is_available(Weekday::Friday, Some(t(1, 0, 0))));
        assert!(!calendar.is_available(Weekday::Friday, Some(t(12, 0, 0))));
    }

    #[test]
    fn empty_entry_counts_as_absent() {
        let mut schedule = WeeklySchedule::default();
        schedule.set(Weekday::Monday, DaySchedule::default());
        assert!(schedule.get(Weekday::Monday).is_none());

        schedule.set(Weekday::Monday, office_hours());
        schedule.clear(Weekday::Monday);
        assert!(schedule.get(Weekday::Monday).is_none());
    }

    #[test]
    fn weekday_parsing_accepts_spanish_and_english() {
        assert_eq!("lunes".parse::<Weekday>().unwrap(), Weekday::Monday);
        assert_eq!("Miércoles".parse::<Weekday>().unwrap(), Weekday::Wednesday);
        assert_eq!("sunday".parse::<Weekday>().unwrap(), Weekday::Sunday);
        assert!("funday".parse::<Weekday>().is_err());
    }

    #[test]
    fn weekday_serde_round_trips_wire_names() {
        let json = serde_json::to_value(Weekday::Saturday).unwrap();
        assert_eq!(json, "sabado");
        let parsed: Weekday = serde_json::from_value(serde_json::json!("thursday")).unwrap();
        assert_eq!(parsed, Weekday::Thursday);
    }

    #[test]
    fn schedule_serializes_every_day() {
        let calendar = weekdays_only();
        let json = serde_json::to_value(&calendar.schedule).unwrap();
        assert_eq!(json["lunes"]["open"], "09:00:00");
        assert_eq!(json["viernes"]["close"], "18:00:00");
        assert!(json["sabado"].is_null());
        assert_eq!(json.as_object().unwrap().len(), 7);
    }
}
