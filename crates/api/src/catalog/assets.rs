//! File asset lifecycle inside a catalog transaction.
//!
//! New binaries are written before their metadata row is inserted and are
//! tracked in [`WrittenAssets`] so a failed operation can remove them after
//! rollback. Existing assets are retired binary first, then metadata row, then
//! the per-article directory.

use std::collections::BTreeSet;

use catalog_core::assets::{AcceptedUpload, AssetKind, AssetStore};
use catalog_core::types::DbId;
use catalog_db::models::document::{CreateDocument, Document};
use catalog_db::models::image::{CreateImage, Image};
use catalog_db::repositories::{DocumentRepo, ImageRepo};
use catalog_db::DbTransaction;

use crate::error::AppResult;

/// Binaries written by the current operation, and the per-article
/// directories they went into.
pub struct WrittenAssets<'a> {
    store: &'a dyn AssetStore,
    paths: Vec<String>,
    dirs: BTreeSet<String>,
}

impl<'a> WrittenAssets<'a> {
    pub fn new(store: &'a dyn AssetStore) -> Self {
        Self {
            store,
            paths: Vec::new(),
            dirs: BTreeSet::new(),
        }
    }

    async fn put(
        &mut self,
        kind: AssetKind,
        article_id: DbId,
        upload: &AcceptedUpload,
    ) -> AppResult<String> {
        let path = kind.new_storage_path(article_id, &upload.extension);
        self.dirs.insert(kind.article_dir(article_id));
        self.store.put(&path, &upload.data).await?;
        self.paths.push(path.clone());
        Ok(path)
    }

    /// Store `uploads` as the article's images, `sort_order` following upload order.
    pub async fn store_images(
        &mut self,
        tx: &mut DbTransaction<'_>,
        article_id: DbId,
        uploads: &[AcceptedUpload],
    ) -> AppResult<Vec<Image>> {
        let mut images = Vec::with_capacity(uploads.len());
        for (position, upload) in uploads.iter().enumerate() {
            let storage_path = self.put(AssetKind::Image, article_id, upload).await?;
            let image = ImageRepo::create(
                tx,
                &CreateImage {
                    article_id,
                    original_name: upload.original_name.clone(),
                    storage_path,
                    mime_type: upload.mime_type.clone(),
                    size_bytes: upload.size_bytes(),
                    sort_order: position as i32,
                },
            )
            .await?;
            images.push(image);
        }
        tracing::debug!(article_id, count = images.len(), "Stored article images");
        Ok(images)
    }

    pub async fn store_documents(
        &mut self,
        tx: &mut DbTransaction<'_>,
        article_id: DbId,
        uploads: &[AcceptedUpload],
    ) -> AppResult<Vec<Document>> {
        let mut documents = Vec::with_capacity(uploads.len());
        for upload in uploads {
            let storage_path = self.put(AssetKind::Document, article_id, upload).await?;
            let document = DocumentRepo::create(
                tx,
                &CreateDocument {
                    article_id,
                    original_name: upload.original_name.clone(),
                    storage_path,
                    mime_type: upload.mime_type.clone(),
                    size_bytes: upload.size_bytes(),
                    description: None,
                },
            )
            .await?;
            documents.push(document);
        }
        tracing::debug!(article_id, count = documents.len(), "Stored article documents");
        Ok(documents)
    }

    /// Remove every binary this operation wrote, then any per-article
    /// directory left empty. Failures are logged, not returned: this runs after
    /// the operation has already failed.
    pub async fn discard(self) {
        for path in &self.paths {
            if let Err(e) = self.store.delete(path).await {
                tracing::error!(path, error = %e, "Failed to remove asset of rolled-back operation");
            }
        }
        for dir in &self.dirs {
            if let Err(e) = self.store.remove_empty_dir(dir).await {
                tracing::error!(dir, error = %e, "Failed to remove asset directory of rolled-back operation");
            }
        }
        if !self.paths.is_empty() {
            tracing::warn!(count = self.paths.len(), "Removed assets of rolled-back operation");
        }
    }
}

/// Commit `tx` when `outcome` is `Ok`; otherwise roll back and discard the
/// binaries in `written`. A failed commit is treated like a failed operation.
pub async fn settle<T>(
    tx: DbTransaction<'_>,
    written: WrittenAssets<'_>,
    outcome: AppResult<T>,
) -> AppResult<T> {
    match outcome {
        Ok(value) => match tx.commit().await {
            Ok(()) => Ok(value),
            Err(e) => {
                written.discard().await;
                Err(e.into())
            }
        },
        Err(e) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::error!(error = %rollback_err, "Rollback failed");
            }
            written.discard().await;
            Err(e)
        }
    }
}

/// Delete all images of an article: each binary, then its row, then the
/// article's image directory. Returns the number of images removed.
pub async fn retire_images(
    tx: &mut DbTransaction<'_>,
    store: &dyn AssetStore,
    article_id: DbId,
) -> AppResult<usize> {
    let images = ImageRepo::list_for_article_tx(tx, article_id).await?;
    for image in &images {
        store.delete(&image.storage_path).await?;
        ImageRepo::delete(tx, image.id).await?;
    }
    store
        .remove_dir(&AssetKind::Image.article_dir(article_id))
        .await?;
    tracing::debug!(article_id, count = images.len(), "Retired article images");
    Ok(images.len())
}

/// Delete all documents of an article, same order as [`retire_images`].
pub async fn retire_documents(
    tx: &mut DbTransaction<'_>,
    store: &dyn AssetStore,
    article_id: DbId,
) -> AppResult<usize> {
    let documents = DocumentRepo::list_for_article_tx(tx, article_id).await?;
    for document in &documents {
        store.delete(&document.storage_path).await?;
        DocumentRepo::delete(tx, document.id).await?;
    }
    store
        .remove_dir(&AssetKind::Document.article_dir(article_id))
        .await?;
    tracing::debug!(article_id, count = documents.len(), "Retired article documents");
    Ok(documents.len())
}
