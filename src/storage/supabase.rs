//! Hosted storage REST client.
//!
//! Talks to the `/storage/v1` API of the database-as-a-service project that
//! owns the `imagens-imoveis` bucket, authenticating with the service key.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, header};
use serde_json::json;
use url::Url;

use super::{CACHE_CONTROL_SECONDS, ObjectStorage, StorageError};

#[derive(Debug, Clone)]
pub struct SupabaseStorage {
    http_client: Client,
    base_url: Url,
    service_key: String,
    bucket: String,
}

impl SupabaseStorage {
    pub fn new(base_url: &str, service_key: &str, bucket: &str) -> Result<Self, StorageError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| StorageError::InvalidConfiguration(format!("invalid url: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(StorageError::InvalidConfiguration(format!(
                "storage url '{base_url}' cannot be used as a base"
            )));
        }

        let http_client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| StorageError::InvalidConfiguration(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url,
            service_key: service_key.to_string(),
            bucket: bucket.to_string(),
        })
    }

    /// `{base}/storage/v1/object/{scope..}/{bucket}/{path..}` with each path
    /// segment percent-encoded.
    fn object_url(&self, scope: &[&str], path: Option<&str>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["storage", "v1", "object"])
                .extend(scope)
                .push(&self.bucket);
            if let Some(path) = path {
                segments.extend(path.split('/').filter(|segment| !segment.is_empty()));
            }
        }
        url
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
    }
}

#[async_trait]
impl ObjectStorage for SupabaseStorage {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        upsert: bool,
    ) -> Result<(), StorageError> {
        let url = self.object_url(&[], Some(path));
        let response = self
            .authorized(self.http_client.post(url))
            .header(header::CONTENT_TYPE, content_type)
            .header(
                header::CACHE_CONTROL,
                format!("max-age={CACHE_CONTROL_SECONDS}"),
            )
            .header("x-upsert", if upsert { "true" } else { "false" })
            .body(bytes)
            .send()
            .await
            .map_err(|e| StorageError::Network(format!("upload of {path} failed: {e}")))?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(path, upsert, "Stored object");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        // Duplicate objects come back either as 409 or as a 400 whose body
        // names the conflict.
        if status == StatusCode::CONFLICT || body.contains("Duplicate") {
            return Err(StorageError::AlreadyExists(path.to_string()));
        }
        Err(StorageError::Upstream {
            status: status.as_u16(),
            body,
        })
    }

    async fn remove(&self, paths: &[String]) -> Result<(), StorageError> {
        if paths.is_empty() {
            return Ok(());
        }

        let url = self.object_url(&[], None);
        let response = self
            .authorized(self.http_client.delete(url))
            .json(&json!({ "prefixes": paths }))
            .send()
            .await
            .map_err(|e| StorageError::Network(format!("remove failed: {e}")))?;

        let status = response.status();
        if status.is_success() || status == StatusCode::NOT_FOUND {
            return Ok(());
        }

        Err(StorageError::Upstream {
            status: status.as_u16(),
            body: response.text().await.unwrap_or_default(),
        })
    }

    fn public_url(&self, path: &str) -> String {
        self.object_url(&["public"], Some(path)).to_string()
    }
}
