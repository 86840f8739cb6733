//! Uploaded binary assets owned by an article.
//!
//! This module decides which uploads are acceptable ([`policy`]) and where
//! their bytes live ([`store`]). It does NOT depend on the database crate;
//! metadata rows are written by the caller.

pub mod policy;
pub mod store;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::DbId;

pub use policy::{check_upload, AcceptedUpload, UploadedFile};
pub use store::{AssetStore, LocalAssetStore};

/// Root namespace for everything owned by articles.
pub const ARTICLES_PREFIX: &str = "articles";

/// Asset-storage error type.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("Invalid storage path: {0}")]
    InvalidPath(String),

    #[error("Storage I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// The two kinds of file an article can own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Image,
    Document,
}

impl AssetKind {
    /// Directory segment under [`ARTICLES_PREFIX`].
    pub fn dir_name(self) -> &'static str {
        match self {
            AssetKind::Image => "images",
            AssetKind::Document => "documents",
        }
    }

    /// Per-article namespace, e.g. `articles/images/42`.
    pub fn article_dir(self, article_id: DbId) -> String {
        format!("{ARTICLES_PREFIX}/{}/{article_id}", self.dir_name())
    }

    /// Relative path for a new binary of this kind.
    ///
    /// The file name is a random UUID plus the (already validated) extension,
    /// so client-supplied names can never collide or escape the namespace.
    pub fn new_storage_path(self, article_id: DbId, extension: &str) -> String {
        format!(
            "{}/{}.{extension}",
            self.article_dir(article_id),
            uuid::Uuid::new_v4()
        )
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetKind::Image => f.write_str("image"),
            AssetKind::Document => f.write_str("document"),
        }
    }
}
