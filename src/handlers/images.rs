//! # Admin Image Handlers
//!
//! Multipart uploads and deletions for the card, capa and gallery images of
//! a listing. Every route checks the listing exists first.

use axum::{
    extract::{Multipart, Path, State, multipart::MultipartError},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::AdminUser;
use crate::error::ApiError;
use crate::handlers::admin_properties::property_not_found;
use crate::handlers::types::{DeletedResponse, parse_property_id};
use crate::images::{
    BatchUpload, BatchUploadSummary, CacheStats, GalleryUploadResult, ImageValidationError,
    PropertyImages, UploadFile, UploadResult, validate_image,
};
use crate::models::ImageKind;
use crate::repositories::PropertyRepository;
use crate::server::AppState;

/// Multipart field prefix naming the gallery of a batch upload file.
const GALLERY_FIELD_PREFIX: &str = "galeria:";

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteImageRequest {
    pub url: String,
    pub tipo: ImageKind,
    #[serde(default)]
    pub nome_galeria: Option<String>,
}

fn multipart_error(err: MultipartError) -> ApiError {
    let status = err.status();
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::new(status, "PAYLOAD_TOO_LARGE", err.body_text())
    } else {
        ApiError::new(StatusCode::BAD_REQUEST, "VALIDATION_FAILED", err.body_text())
    }
}

fn image_rejected(err: ImageValidationError) -> ApiError {
    match err {
        ImageValidationError::TooLarge { .. } => {
            ApiError::new(StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", err.to_string())
        }
        other => ApiError::new(StatusCode::BAD_REQUEST, "VALIDATION_FAILED", other.to_string()),
    }
}

fn missing_field(name: &str) -> ApiError {
    ApiError::new(
        StatusCode::BAD_REQUEST,
        "VALIDATION_FAILED",
        format!("multipart field '{name}' is required"),
    )
}

async fn read_field(field: axum::extract::multipart::Field<'_>) -> Result<UploadFile, ApiError> {
    let file_name = field.file_name().unwrap_or("upload").to_string();
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();
    let bytes = field.bytes().await.map_err(multipart_error)?;

    Ok(UploadFile {
        file_name,
        content_type,
        bytes: bytes.to_vec(),
    })
}

/// Reads every file sent under `name`, ignoring other fields.
async fn read_files(multipart: &mut Multipart, name: &str) -> Result<Vec<UploadFile>, ApiError> {
    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() == Some(name) {
            files.push(read_field(field).await?);
        }
    }
    Ok(files)
}

async fn read_batch(multipart: &mut Multipart) -> Result<BatchUpload, ApiError> {
    let mut batch = BatchUpload::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match name.as_str() {
            "card" => batch.card = Some(read_field(field).await?),
            "capa" => batch.capa = Some(read_field(field).await?),
            other => {
                let Some(gallery) = other.strip_prefix(GALLERY_FIELD_PREFIX) else {
                    tracing::debug!(field = %other, "Ignoring unknown multipart field");
                    continue;
                };
                let gallery = gallery.trim().to_string();
                let file = read_field(field).await?;
                match batch.galleries.iter_mut().find(|(existing, _)| *existing == gallery) {
                    Some((_, files)) => files.push(file),
                    None => batch.galleries.push((gallery, vec![file])),
                }
            }
        }
    }

    Ok(batch)
}

async fn existing_property(state: &AppState, raw_id: &str) -> Result<Uuid, ApiError> {
    let id = parse_property_id(raw_id)?;
    PropertyRepository::new(&state.db)
        .find_by_id(id)
        .await?
        .ok_or_else(property_not_found)?;
    Ok(id)
}

/// Organised images of one listing
#[utoipa::path(
    get,
    path = "/api/admin/properties/{id}/images",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Listing id")),
    responses(
        (status = 200, description = "Card, capa and galleries", body = PropertyImages),
        (status = 404, description = "Unknown id", body = ApiError)
    ),
    tag = "images"
)]
pub async fn list_images(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> Result<Json<PropertyImages>, ApiError> {
    let id = existing_property(&state, &id).await?;
    Ok(Json(state.images.get_property_images(id).await?))
}

/// Replace the card or capa image
#[utoipa::path(
    put,
    path = "/api/admin/properties/{id}/images/{tipo}",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Listing id"),
        ("tipo" = String, Path, description = "`card` or `capa`")
    ),
    request_body(content_type = "multipart/form-data", description = "Image in field `file`"),
    responses(
        (status = 200, description = "Image stored", body = UploadResult),
        (status = 400, description = "Invalid type or file", body = ApiError),
        (status = 404, description = "Unknown id", body = ApiError),
        (status = 413, description = "File too large", body = ApiError),
        (status = 502, description = "Storage failure", body = ApiError)
    ),
    tag = "images"
)]
pub async fn upload_main_image(
    State(state): State<AppState>,
    admin: AdminUser,
    Path((id, tipo)): Path<(String, String)>,
    mut multipart: Multipart,
) -> Result<Json<UploadResult>, ApiError> {
    let kind = tipo
        .parse::<ImageKind>()
        .ok()
        .filter(ImageKind::is_main)
        .ok_or_else(|| {
            ApiError::new(
                StatusCode::BAD_REQUEST,
                "VALIDATION_FAILED",
                "image type must be 'card' or 'capa'",
            )
        })?;
    let id = existing_property(&state, &id).await?;

    let file = read_files(&mut multipart, "file")
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| missing_field("file"))?;
    validate_image(&file.content_type, &file.bytes, state.config.images.max_image_bytes())
        .map_err(image_rejected)?;

    let result = state.images.upload_main_image(id, kind, file).await;
    if !result.success {
        return Err(ApiError::new(
            StatusCode::BAD_GATEWAY,
            "STORAGE_ERROR",
            result.error.unwrap_or_else(|| "Image upload failed".to_string()),
        ));
    }

    tracing::info!(property_id = %id, kind = %kind, author = %admin.username, "Main image replaced");
    Ok(Json(result))
}

/// Delete one image by its public URL
#[utoipa::path(
    delete,
    path = "/api/admin/properties/{id}/images",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Listing id")),
    request_body = DeleteImageRequest,
    responses(
        (status = 200, description = "Rows removed", body = DeletedResponse),
        (status = 404, description = "Unknown id", body = ApiError)
    ),
    tag = "images"
)]
pub async fn delete_image(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<String>,
    Json(request): Json<DeleteImageRequest>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let id = existing_property(&state, &id).await?;

    let deleted = state
        .images
        .delete_image(id, &request.url, request.tipo, request.nome_galeria.as_deref())
        .await?;

    tracing::info!(property_id = %id, kind = %request.tipo, deleted, author = %admin.username, "Image deleted");
    Ok(Json(DeletedResponse {
        success: true,
        deleted,
    }))
}

/// Append images to a gallery
#[utoipa::path(
    post,
    path = "/api/admin/properties/{id}/galleries/{name}",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Listing id"),
        ("name" = String, Path, description = "Gallery name")
    ),
    request_body(content_type = "multipart/form-data", description = "Images in repeated field `files`"),
    responses(
        (status = 200, description = "Per-file results", body = GalleryUploadResult),
        (status = 400, description = "No files sent", body = ApiError),
        (status = 404, description = "Unknown id", body = ApiError)
    ),
    tag = "images"
)]
pub async fn upload_gallery(
    State(state): State<AppState>,
    admin: AdminUser,
    Path((id, name)): Path<(String, String)>,
    mut multipart: Multipart,
) -> Result<Json<GalleryUploadResult>, ApiError> {
    let id = existing_property(&state, &id).await?;

    let files = read_files(&mut multipart, "files").await?;
    if files.is_empty() {
        return Err(missing_field("files"));
    }

    let result = state.images.upload_gallery_images(id, &name, files).await;
    tracing::info!(property_id = %id, gallery = %name, success = result.success, author = %admin.username, "Gallery upload handled");
    Ok(Json(result))
}

/// Delete a whole gallery
#[utoipa::path(
    delete,
    path = "/api/admin/properties/{id}/galleries/{name}",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Listing id"),
        ("name" = String, Path, description = "Gallery name")
    ),
    responses(
        (status = 200, description = "Rows removed", body = DeletedResponse),
        (status = 404, description = "Unknown id", body = ApiError)
    ),
    tag = "images"
)]
pub async fn delete_gallery(
    State(state): State<AppState>,
    admin: AdminUser,
    Path((id, name)): Path<(String, String)>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let id = existing_property(&state, &id).await?;
    let deleted = state.images.delete_gallery(id, &name).await?;

    tracing::info!(property_id = %id, gallery = %name, deleted, author = %admin.username, "Gallery deleted");
    Ok(Json(DeletedResponse {
        success: true,
        deleted,
    }))
}

/// Upload card, capa and galleries in one request
///
/// Fields: `card`, `capa` and any number of `galeria:{name}`. Each part runs
/// concurrently; failures are reported per task in the summary.
#[utoipa::path(
    post,
    path = "/api/admin/properties/{id}/uploads",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Listing id")),
    request_body(content_type = "multipart/form-data", description = "Fields `card`, `capa`, `galeria:{name}`"),
    responses(
        (status = 200, description = "Per-task outcomes", body = BatchUploadSummary),
        (status = 400, description = "No files sent", body = ApiError),
        (status = 404, description = "Unknown id", body = ApiError)
    ),
    tag = "images"
)]
pub async fn batch_upload(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<BatchUploadSummary>, ApiError> {
    let id = existing_property(&state, &id).await?;

    let batch = read_batch(&mut multipart).await?;
    if batch.is_empty() {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "VALIDATION_FAILED",
            "no image fields were sent",
        ));
    }

    let summary = state.images.upload_all(id, batch).await;

    tracing::info!(
        property_id = %id,
        total = summary.total,
        succeeded = summary.succeeded,
        failed = summary.failed,
        author = %admin.username,
        "Batch upload finished"
    );
    Ok(Json(summary))
}

/// Size and settings of the listing image cache
#[utoipa::path(
    get,
    path = "/api/admin/cache/images",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Cache statistics", body = CacheStats),
        (status = 401, description = "Missing or invalid session", body = ApiError)
    ),
    tag = "images"
)]
pub async fn image_cache_stats(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Json<CacheStats> {
    Json(state.images.cache_stats().await)
}

/// Drop every cached image set
#[utoipa::path(
    delete,
    path = "/api/admin/cache/images",
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Cache cleared"),
        (status = 401, description = "Missing or invalid session", body = ApiError)
    ),
    tag = "images"
)]
pub async fn clear_image_cache(State(state): State<AppState>, admin: AdminUser) -> StatusCode {
    state.images.clear_cache().await;
    tracing::info!(author = %admin.username, "Image cache cleared");
    StatusCode::NO_CONTENT
}
