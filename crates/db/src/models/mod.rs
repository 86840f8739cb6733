//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - A create DTO for inserts and, where rows are mutable, an all-`Option`
//!   update DTO
//! - The enriched `*Detail` views returned by the API

pub mod article;
pub mod association;
pub mod document;
pub mod image;
pub mod supplier;
pub mod user;
