//! Catalog consistency manager.
//!
//! Every write to an article or supplier goes through here. One operation is
//! one database transaction; binaries written to the asset store during an
//! operation are removed again if the transaction does not commit. Reads
//! assemble the enriched detail views (images, documents, linked records).

pub mod articles;
pub mod assets;
pub mod suppliers;

use std::collections::HashMap;

use catalog_core::types::DbId;
use catalog_core::validation::FieldErrors;

/// Standard message for a required field that was not sent.
pub(crate) fn required(errors: &mut FieldErrors, field: &str) {
    errors.add(field, format!("The {field} field is required."));
}

/// Standard message for a unique field whose value is already in use.
pub(crate) fn taken(errors: &mut FieldErrors, field: &str) {
    errors.add(field, format!("The {field} has already been taken."));
}

/// Group rows by owner id, keeping their order within each group.
pub(crate) fn group_by<T>(rows: Vec<T>, key: impl Fn(&T) -> DbId) -> HashMap<DbId, Vec<T>> {
    let mut groups: HashMap<DbId, Vec<T>> = HashMap::new();
    for row in rows {
        groups.entry(key(&row)).or_default().push(row);
    }
    groups
}
