//! Domain logic for the catalog backend.
//!
//! Pure rules (supplier availability, article field validation, upload
//! policy) plus the binary asset store abstraction. Nothing in this crate
//! talks to the database.

pub mod assets;
pub mod availability;
pub mod catalog;
pub mod error;
pub mod types;
pub mod validation;
