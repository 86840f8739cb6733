//! Field-level validation errors and shared field validators.
//!
//! Request DTOs derive [`validator::Validate`]; their errors are folded into
//! [`FieldErrors`] so every rejection reaches the client as the same
//! `{ field: [messages] }` map, whether it came from a derive attribute, a
//! hand-written check, or a uniqueness lookup.

use std::borrow::Cow;
use std::collections::BTreeMap;

use chrono::NaiveTime;
use serde::Serialize;
use validator::{ValidationError, ValidationErrors};

use crate::error::CoreError;
use crate::types::Amount;

/// Wire format for times of day (`HH:MM:SS`, 24-hour).
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// Per-field validation messages, ordered by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message against `field`.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Absorb every message from `other`.
    pub fn merge(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// `Ok(())` when empty, otherwise [`CoreError::InvalidFields`].
    pub fn into_result(self) -> Result<(), CoreError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(CoreError::InvalidFields(self))
        }
    }
}

impl From<&ValidationErrors> for FieldErrors {
    fn from(errors: &ValidationErrors) -> Self {
        let mut out = FieldErrors::new();
        for (field, field_errors) in errors.field_errors() {
            for err in field_errors.iter() {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("The {field} field is invalid ({}).", err.code));
                out.add(&field, message);
            }
        }
        out
    }
}

impl From<ValidationErrors> for CoreError {
    fn from(errors: ValidationErrors) -> Self {
        CoreError::InvalidFields(FieldErrors::from(&errors))
    }
}

/// Run a DTO's derived validation, mapping failures to [`CoreError::InvalidFields`].
pub fn validate_input<T: validator::Validate>(input: &T) -> Result<(), CoreError> {
    input.validate().map_err(CoreError::from)
}

// ---------------------------------------------------------------------------
// Amount and time checks applied while parsing article and supplier input
// ---------------------------------------------------------------------------

fn rejected(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

/// Amounts such as the base price must be zero or positive.
pub fn validate_non_negative(value: &Amount) -> Result<(), ValidationError> {
    if *value < Amount::ZERO {
        return Err(rejected("min", "The value must be at least 0."));
    }
    Ok(())
}

/// Percentages must lie in `0..=100`.
pub fn validate_percentage(value: &Amount) -> Result<(), ValidationError> {
    if *value < Amount::ZERO || *value > Amount::ONE_HUNDRED {
        return Err(rejected("range", "The value must be between 0 and 100."));
    }
    Ok(())
}

/// Parse a strict `HH:MM:SS` time. Anything else is `None`.
pub fn parse_time_of_day(value: &str) -> Option<NaiveTime> {
    // chrono accepts single-digit components; the wire format is fixed-width.
    if value.len() != 8 {
        return None;
    }
    NaiveTime::parse_from_str(value, TIME_FORMAT).ok()
}
