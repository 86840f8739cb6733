//! Binary storage for article assets.
//!
//! Paths handed to an [`AssetStore`] are always relative (e.g.
//! `articles/images/42/<uuid>.png`); the store decides where they live.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use super::AssetError;

/// Where article binaries are written and removed.
///
/// Removal of something that is already gone is not an error: asset cleanup
/// runs after partial failures and must be repeatable.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Write `data` at `path`, creating parent directories as needed.
    async fn put(&self, path: &str, data: &[u8]) -> Result<(), AssetError>;

    /// Delete the file at `path`. Returns `false` when it did not exist.
    async fn delete(&self, path: &str) -> Result<bool, AssetError>;

    /// Recursively remove the directory at `dir`. Missing directories are a no-op.
    async fn remove_dir(&self, dir: &str) -> Result<(), AssetError>;

    /// Remove `dir` only if it holds nothing. Returns whether it was removed.
    async fn remove_empty_dir(&self, dir: &str) -> Result<bool, AssetError>;

    async fn exists(&self, path: &str) -> Result<bool, AssetError>;
}

/// [`AssetStore`] backed by a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalAssetStore {
    root: PathBuf,
}

impl LocalAssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Join `relative` onto the root, refusing anything that could escape it.
    fn resolve(&self, relative: &str) -> Result<PathBuf, AssetError> {
        let rel = Path::new(relative);
        if relative.is_empty()
            || !rel
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(AssetError::InvalidPath(relative.to_string()));
        }
        Ok(self.root.join(rel))
    }
}

fn io_error(path: &str, source: std::io::Error) -> AssetError {
    AssetError::Io {
        path: path.to_string(),
        source,
    }
}

#[async_trait]
impl AssetStore for LocalAssetStore {
    async fn put(&self, path: &str, data: &[u8]) -> Result<(), AssetError> {
        let full = self.resolve(path)?;
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error(path, e))?;
        }
        tokio::fs::write(&full, data)
            .await
            .map_err(|e| io_error(path, e))?;
        tracing::debug!(path, bytes = data.len(), "Stored asset");
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<bool, AssetError> {
        let full = self.resolve(path)?;
        match tokio::fs::remove_file(&full).await {
            Ok(()) => {
                tracing::debug!(path, "Deleted asset");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path, "Asset already absent");
                Ok(false)
            }
            Err(e) => Err(io_error(path, e)),
        }
    }

    async fn remove_dir(&self, dir: &str) -> Result<(), AssetError> {
        let full = self.resolve(dir)?;
        match tokio::fs::remove_dir_all(&full).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(dir, e)),
        }
    }

    async fn remove_empty_dir(&self, dir: &str) -> Result<bool, AssetError> {
        let full = self.resolve(dir)?;
        let mut entries = match tokio::fs::read_dir(&full).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(io_error(dir, e)),
        };
        if entries
            .next_entry()
            .await
            .map_err(|e| io_error(dir, e))?
            .is_some()
        {
            return Ok(false);
        }
        tokio::fs::remove_dir(&full)
            .await
            .map_err(|e| io_error(dir, e))?;
        Ok(true)
    }

    async fn exists(&self, path: &str) -> Result<bool, AssetError> {
        let full = self.resolve(path)?;
        tokio::fs::try_exists(&full)
            .await
            .map_err(|e| io_error(path, e))
    }
}
