//! # Listing Images
//!
//! Uploads card, capa and gallery images to object storage, keeps the
//! `fx_property_images` rows in step and serves the organised image set of
//! each listing through a short-lived cache.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use sea_orm::DatabaseConnection;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::ImageConfig;
use crate::error::RepositoryError;
use crate::models::ImageKind;
use crate::repositories::PropertyImageRepository;
use crate::storage::ObjectStorage;

pub mod batch;
pub mod cache;
pub mod organize;
pub mod paths;
pub mod validation;

pub use batch::{BatchTaskOutcome, BatchUpload, BatchUploadSummary};
pub use cache::{CacheStats, ImageCache};
pub use organize::{
    DEFAULT_CARD_IMAGE, GalleryImage, PropertyImages, card_image_url, organize,
};
pub use validation::{ImageValidationError, validate_image};

/// A file received from a multipart form.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Outcome of uploading one file.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct UploadResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UploadResult {
    pub fn uploaded(url: String) -> Self {
        Self {
            success: true,
            url: Some(url),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            url: None,
            error: Some(error.into()),
        }
    }
}

/// Outcome of uploading a batch of files into one gallery.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct GalleryUploadResult {
    /// True when at least one file was stored and recorded.
    pub success: bool,
    pub results: Vec<UploadResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub struct ImageService {
    db: DatabaseConnection,
    storage: Arc<dyn ObjectStorage>,
    cache: ImageCache,
    max_bytes: usize,
}

impl ImageService {
    pub fn new(db: DatabaseConnection, storage: Arc<dyn ObjectStorage>, config: &ImageConfig) -> Self {
        Self {
            db,
            storage,
            cache: ImageCache::new(
                config.cache_capacity,
                Duration::from_secs(config.cache_ttl_seconds),
            ),
            max_bytes: config.max_image_bytes(),
        }
    }

    fn repository(&self) -> PropertyImageRepository<'_> {
        PropertyImageRepository::new(&self.db)
    }

    /// Replaces the card or capa image of a listing.
    pub async fn upload_main_image(
        &self,
        property_id: Uuid,
        kind: ImageKind,
        file: UploadFile,
    ) -> UploadResult {
        if !kind.is_main() {
            return UploadResult::failed("Only card and capa images have a fixed slot");
        }
        if let Err(err) = validate_image(&file.content_type, &file.bytes, self.max_bytes) {
            return UploadResult::failed(err.to_string());
        }

        let path = paths::main_image_path(property_id, kind);
        if let Err(err) = self
            .storage
            .upload(&path, file.bytes, &file.content_type, true)
            .await
        {
            tracing::error!(property_id = %property_id, kind = %kind, error = %err, "Main image upload failed");
            return UploadResult::failed(err.to_string());
        }

        let url = self.storage.public_url(&path);
        let saved = self.repository().upsert_main(property_id, kind, &url).await;
        self.cache.invalidate(&property_id).await;

        match saved {
            Ok(_) => {
                tracing::info!(property_id = %property_id, kind = %kind, "Main image stored");
                UploadResult::uploaded(url)
            }
            Err(err) => {
                tracing::error!(property_id = %property_id, kind = %kind, error = %err, "Saving main image row failed");
                UploadResult::failed(err.to_string())
            }
        }
    }

    /// Uploads every file to a fresh path in `gallery`, then records the
    /// stored ones in a single insert continuing the gallery's order.
    pub async fn upload_gallery_images(
        &self,
        property_id: Uuid,
        gallery: &str,
        files: Vec<UploadFile>,
    ) -> GalleryUploadResult {
        let gallery = gallery.trim();
        if !paths::is_valid_gallery_name(gallery) {
            return GalleryUploadResult {
                success: false,
                results: Vec::new(),
                error: Some("Gallery name must be non-empty and cannot contain '/'".to_string()),
            };
        }

        let mut results = Vec::with_capacity(files.len());
        let mut stored_urls = Vec::new();

        for file in files {
            if let Err(err) = validate_image(&file.content_type, &file.bytes, self.max_bytes) {
                tracing::debug!(file = %file.file_name, error = %err, "Rejected gallery file");
                results.push(UploadResult::failed(err.to_string()));
                continue;
            }

            let path =
                paths::gallery_image_path(property_id, gallery, &paths::new_gallery_file_name());
            match self
                .storage
                .upload(&path, file.bytes, &file.content_type, false)
                .await
            {
                Ok(()) => {
                    let url = self.storage.public_url(&path);
                    stored_urls.push(url.clone());
                    results.push(UploadResult::uploaded(url));
                }
                Err(err) => {
                    tracing::warn!(file = %file.file_name, gallery, error = %err, "Gallery upload failed");
                    results.push(UploadResult::failed(err.to_string()));
                }
            }
        }

        if !stored_urls.is_empty() {
            let recorded = self.record_gallery(property_id, gallery, &stored_urls).await;
            self.cache.invalidate(&property_id).await;

            if let Err(err) = recorded {
                tracing::error!(property_id = %property_id, gallery, error = %err, "Saving gallery rows failed");
                return GalleryUploadResult {
                    success: false,
                    results,
                    error: Some(format!("Failed to save gallery images: {err}")),
                };
            }
        }

        let stored = stored_urls.len();
        tracing::info!(
            property_id = %property_id,
            gallery,
            stored,
            failed = results.len() - stored,
            "Gallery upload finished"
        );

        GalleryUploadResult {
            success: stored > 0,
            results,
            error: None,
        }
    }

    async fn record_gallery(
        &self,
        property_id: Uuid,
        gallery: &str,
        urls: &[String],
    ) -> Result<(), RepositoryError> {
        let repository = self.repository();
        let first_order = repository
            .max_gallery_order(property_id, gallery)
            .await?
            .map_or(0, |ordem| ordem + 1);
        repository
            .insert_gallery_batch(property_id, gallery, urls, first_order)
            .await?;
        Ok(())
    }

    /// Removes one image. A storage failure is only logged; the row is
    /// always deleted.
    pub async fn delete_image(
        &self,
        property_id: Uuid,
        url: &str,
        kind: ImageKind,
        gallery: Option<&str>,
    ) -> Result<u64, RepositoryError> {
        match paths::storage_path_for_url(property_id, url, kind, gallery) {
            Some(path) => {
                if let Err(err) = self.storage.remove(&[path.clone()]).await {
                    tracing::warn!(path = %path, error = %err, "Removing stored image failed");
                }
            }
            None => {
                tracing::warn!(property_id = %property_id, url, "Could not derive storage path for image");
            }
        }

        let deleted = self.repository().delete_by_url(property_id, url).await;
        self.cache.invalidate(&property_id).await;
        deleted
    }

    /// Removes every image of a gallery. Returns how many rows were deleted.
    pub async fn delete_gallery(
        &self,
        property_id: Uuid,
        gallery: &str,
    ) -> Result<u64, RepositoryError> {
        // Same normalisation as uploads, so `Lazer ` finds the `Lazer` rows.
        let gallery = gallery.trim();
        if !paths::is_valid_gallery_name(gallery) {
            return Ok(0);
        }

        let urls = self.repository().gallery_urls(property_id, gallery).await?;

        let mut deleted = 0;
        for url in &urls {
            match self
                .delete_image(property_id, url, ImageKind::Galeria, Some(gallery))
                .await
            {
                Ok(rows) => deleted += rows,
                Err(err) => {
                    tracing::warn!(property_id = %property_id, gallery, url, error = %err, "Deleting gallery image failed");
                }
            }
        }

        Ok(deleted)
    }

    /// Removes the stored objects behind `rows`, ignoring failures. Used once
    /// the rows themselves are already gone.
    pub async fn remove_stored_objects(
        &self,
        property_id: Uuid,
        rows: &[crate::models::property_image::Model],
    ) {
        let paths: Vec<String> = rows
            .iter()
            .filter_map(|row| {
                let kind = row.kind()?;
                paths::storage_path_for_url(property_id, &row.url, kind, row.nome_galeria.as_deref())
            })
            .collect();

        if let Err(err) = self.storage.remove(&paths).await {
            tracing::warn!(property_id = %property_id, count = paths.len(), error = %err, "Removing stored images failed");
        }
        self.cache.invalidate(&property_id).await;
    }

    pub async fn get_property_images(
        &self,
        property_id: Uuid,
    ) -> Result<PropertyImages, RepositoryError> {
        if let Some(images) = self.cache.get(&property_id).await {
            return Ok(images);
        }

        let rows = self.repository().list_for_property(property_id).await?;
        let images = organize(&rows);
        self.cache.put(property_id, images.clone()).await;
        Ok(images)
    }

    /// Images of several listings in one query; ids without rows map to an
    /// empty set.
    pub async fn get_multiple_property_images(
        &self,
        property_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, PropertyImages>, RepositoryError> {
        let mut found = HashMap::with_capacity(property_ids.len());
        let mut missing = Vec::new();

        for id in property_ids {
            if found.contains_key(id) || missing.contains(id) {
                continue;
            }
            match self.cache.get(id).await {
                Some(images) => {
                    found.insert(*id, images);
                }
                None => missing.push(*id),
            }
        }

        if missing.is_empty() {
            return Ok(found);
        }

        let rows = self.repository().list_for_properties(&missing).await?;
        let mut grouped: HashMap<Uuid, Vec<_>> = HashMap::new();
        for row in &rows {
            grouped.entry(row.imovel_id).or_default().push(row);
        }

        for id in missing {
            let images = grouped
                .remove(&id)
                .map(|rows| organize(rows))
                .unwrap_or_default();
            self.cache.put(id, images.clone()).await;
            found.insert(id, images);
        }

        Ok(found)
    }

    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }
}
