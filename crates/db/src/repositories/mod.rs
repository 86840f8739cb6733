//! Repository layer.
//!
//! Each repository is a zero-sized struct. Reads take `&PgPool`; writes that
//! belong to a multi-step catalog operation take the operation's
//! [`DbTransaction`](crate::DbTransaction) so they commit or roll back together.

pub mod article_repo;
pub mod association_repo;
pub mod document_repo;
pub mod image_repo;
pub mod revoked_token_repo;
pub mod supplier_repo;
pub mod user_repo;

pub use article_repo::ArticleRepo;
pub use association_repo::AssociationRepo;
pub use document_repo::DocumentRepo;
pub use image_repo::ImageRepo;
pub use revoked_token_repo::RevokedTokenRepo;
pub use supplier_repo::SupplierRepo;
pub use user_repo::UserRepo;
