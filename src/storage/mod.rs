//! # Object Storage
//!
//! Abstraction over the bucket that holds listing images, with a hosted
//! REST implementation and an in-memory one for local runs and tests.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::StorageConfig;

pub mod memory;
pub mod supabase;

pub use memory::MemoryStorage;
pub use supabase::SupabaseStorage;

/// `Cache-Control` max-age applied to every uploaded object.
pub const CACHE_CONTROL_SECONDS: u32 = 3600;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage network error: {0}")]
    Network(String),
    #[error("storage returned status {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("object already exists: {0}")]
    AlreadyExists(String),
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("invalid storage configuration: {0}")]
    InvalidConfiguration(String),
}

/// Minimal bucket operations used by the image service.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Stores `bytes` at `path`. With `upsert == false` an existing object is
    /// an [`StorageError::AlreadyExists`] error.
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        upsert: bool,
    ) -> Result<(), StorageError>;

    /// Removes the given object paths. Missing objects are not an error.
    async fn remove(&self, paths: &[String]) -> Result<(), StorageError>;

    /// Public URL of `path`. Performs no I/O.
    fn public_url(&self, path: &str) -> String;
}

/// Builds the storage backend for `config`: the hosted bucket when a URL is
/// configured, otherwise an in-memory bucket.
pub fn from_config(config: &StorageConfig) -> Result<Arc<dyn ObjectStorage>, StorageError> {
    match (&config.url, &config.service_key) {
        (Some(url), Some(key)) => Ok(Arc::new(SupabaseStorage::new(url, key, &config.bucket)?)),
        (Some(_), None) => Err(StorageError::InvalidConfiguration(
            "storage service key is missing".to_string(),
        )),
        (None, _) => {
            tracing::warn!(
                bucket = %config.bucket,
                "No storage URL configured; uploads are kept in memory"
            );
            Ok(Arc::new(MemoryStorage::new(&config.bucket)))
        }
    }
}
