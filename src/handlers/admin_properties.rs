//! # Admin Listing Handlers
//!
//! Back-office CRUD on listings. Every route requires an admin session.

use axum::{
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::auth::AdminUser;
use crate::error::{ApiError, RepositoryError, validation_error};
use crate::handlers::types::{PropertyResponse, parse_property_id};
use crate::properties::{FieldErrors, PropertyForm};
use crate::repositories::PropertyRepository;
use crate::server::AppState;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AdminListQuery {
    /// Case-insensitive match on title, city, stage or address
    pub search: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AdminPropertyList {
    pub properties: Vec<PropertyResponse>,
    pub total: usize,
}

fn invalid_form(errors: FieldErrors) -> ApiError {
    validation_error("Property form has invalid fields", json!(errors))
}

/// Slug conflicts get their own code so the form can highlight the field.
fn map_write_error(err: RepositoryError, slug: &str) -> ApiError {
    match err {
        RepositoryError::Conflict(_) => ApiError::new(
            StatusCode::CONFLICT,
            "SLUG_TAKEN",
            format!("The slug '{slug}' is already used by another property"),
        )
        .with_details(json!({ "field": "slug" })),
        other => other.into(),
    }
}

/// All listings, newest first
#[utoipa::path(
    get,
    path = "/api/admin/properties",
    security(("bearer_auth" = [])),
    params(AdminListQuery),
    responses(
        (status = 200, description = "Listings", body = AdminPropertyList),
        (status = 401, description = "Missing or invalid session", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn list_properties(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<AdminListQuery>,
) -> Result<Json<AdminPropertyList>, ApiError> {
    let properties = PropertyRepository::new(&state.db)
        .list_admin(query.search.as_deref())
        .await?;

    Ok(Json(AdminPropertyList {
        total: properties.len(),
        properties: properties.into_iter().map(PropertyResponse::from).collect(),
    }))
}

/// Create a listing
#[utoipa::path(
    post,
    path = "/api/admin/properties",
    security(("bearer_auth" = [])),
    request_body = PropertyForm,
    responses(
        (status = 201, description = "Listing created", body = PropertyResponse),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 401, description = "Missing or invalid session", body = ApiError),
        (status = 409, description = "Slug already in use", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn create_property(
    State(state): State<AppState>,
    admin: AdminUser,
    payload: Result<Json<PropertyForm>, JsonRejection>,
) -> Result<(StatusCode, Json<PropertyResponse>), ApiError> {
    let Json(form) = payload?;
    let form = form.normalize().map_err(invalid_form)?;
    let slug = form.slug.clone();

    let property = PropertyRepository::new(&state.db)
        .create(form, Some(&admin.username))
        .await
        .map_err(|err| map_write_error(err, &slug))?;

    tracing::info!(property_id = %property.id, slug = %property.slug, author = %admin.username, "Property created");
    Ok((StatusCode::CREATED, Json(property.into())))
}

/// One listing by id
#[utoipa::path(
    get,
    path = "/api/admin/properties/{id}",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Listing id")),
    responses(
        (status = 200, description = "Listing", body = PropertyResponse),
        (status = 404, description = "Unknown id", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn get_property(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> Result<Json<PropertyResponse>, ApiError> {
    let id = parse_property_id(&id)?;
    let property = PropertyRepository::new(&state.db)
        .find_by_id(id)
        .await?
        .ok_or_else(property_not_found)?;

    Ok(Json(property.into()))
}

/// Replace the editable fields of a listing
#[utoipa::path(
    put,
    path = "/api/admin/properties/{id}",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Listing id")),
    request_body = PropertyForm,
    responses(
        (status = 200, description = "Listing updated", body = PropertyResponse),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 404, description = "Unknown id", body = ApiError),
        (status = 409, description = "Slug already in use", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn update_property(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<String>,
    payload: Result<Json<PropertyForm>, JsonRejection>,
) -> Result<Json<PropertyResponse>, ApiError> {
    let id = parse_property_id(&id)?;
    let Json(form) = payload?;
    let form = form.normalize().map_err(invalid_form)?;
    let slug = form.slug.clone();

    let property = PropertyRepository::new(&state.db)
        .update(id, form, Some(&admin.username))
        .await
        .map_err(|err| match err {
            RepositoryError::NotFound(_) => property_not_found(),
            other => map_write_error(other, &slug),
        })?;

    tracing::info!(property_id = %property.id, author = %admin.username, "Property updated");
    Ok(Json(property.into()))
}

/// Delete a listing with its images
#[utoipa::path(
    delete,
    path = "/api/admin/properties/{id}",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Listing id")),
    responses(
        (status = 204, description = "Listing deleted"),
        (status = 404, description = "Unknown id", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn delete_property(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_property_id(&id)?;
    let removed_images = PropertyRepository::new(&state.db)
        .delete(id)
        .await
        .map_err(|err| match err {
            RepositoryError::NotFound(_) => property_not_found(),
            other => other.into(),
        })?;

    state.images.remove_stored_objects(id, &removed_images).await;

    tracing::info!(property_id = %id, images = removed_images.len(), author = %admin.username, "Property deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) fn property_not_found() -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, "PROPERTY_NOT_FOUND", "Property not found")
}
