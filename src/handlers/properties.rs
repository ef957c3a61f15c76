//! # Public Listing Handlers
//!
//! Read-only endpoints behind the public site: listing page, home and
//! featured feeds, filter options, image sets and the detail page.

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::ApiError;
use crate::handlers::types::PropertyResponse;
use crate::images::PropertyImages;
use crate::listings::{
    FilterOptions, HOME_FEED_SIZE, ListingFilters, ListingQuery, PropertyCard, RELATED_SIZE,
    format_detail_options, format_price,
};
use crate::models::property::Model as PropertyModel;
use crate::repositories::PropertyRepository;
use crate::server::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PropertyListResponse {
    pub properties: Vec<PropertyCard>,
    pub total: usize,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ImagesQuery {
    /// Comma-separated listing ids
    #[param(example = "550e8400-e29b-41d4-a716-446655440000,6ba7b810-9dad-11d1-80b4-00c04fd430c8")]
    pub ids: String,
}

/// Detail page payload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PropertyDetailResponse {
    pub property: PropertyResponse,
    pub images: PropertyImages,
    #[schema(example = "R$ 850.000")]
    pub price: String,
    #[schema(example = "2 e 3 dormitórios")]
    pub quartos: String,
    pub banheiros: String,
    pub vagas: String,
    pub related: Vec<PropertyCard>,
}

/// Builds display cards, loading every listing's images in one query.
pub(crate) async fn cards_for(
    state: &AppState,
    properties: &[PropertyModel],
) -> Result<Vec<PropertyCard>, ApiError> {
    let ids: Vec<Uuid> = properties.iter().map(|p| p.id).collect();
    let images = state.images.get_multiple_property_images(&ids).await?;

    Ok(properties
        .iter()
        .map(|property| PropertyCard::from_property(property, images.get(&property.id)))
        .collect())
}

/// Public listing page with optional filters
#[utoipa::path(
    get,
    path = "/api/properties",
    params(ListingQuery),
    responses(
        (status = 200, description = "Listings matching the filters", body = PropertyListResponse),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "properties"
)]
pub async fn list_properties(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> Result<Json<PropertyListResponse>, ApiError> {
    let filters = ListingFilters::from(query);
    let properties = PropertyRepository::new(&state.db).list_public().await?;
    let cards = filters.apply(cards_for(&state, &properties).await?);

    tracing::debug!(total = properties.len(), matched = cards.len(), "Listing page served");
    Ok(Json(PropertyListResponse {
        total: cards.len(),
        properties: cards,
    }))
}

/// Listings flagged for the home page, newest first
#[utoipa::path(
    get,
    path = "/api/properties/home",
    responses(
        (status = 200, description = "Home page listings", body = [PropertyCard])
    ),
    tag = "properties"
)]
pub async fn home_properties(
    State(state): State<AppState>,
) -> Result<Json<Vec<PropertyCard>>, ApiError> {
    let mut properties = PropertyRepository::new(&state.db).home_feed().await?;
    properties.truncate(HOME_FEED_SIZE);
    Ok(Json(cards_for(&state, &properties).await?))
}

/// Featured listings, newest first
#[utoipa::path(
    get,
    path = "/api/properties/featured",
    responses(
        (status = 200, description = "Featured listings", body = [PropertyCard])
    ),
    tag = "properties"
)]
pub async fn featured_properties(
    State(state): State<AppState>,
) -> Result<Json<Vec<PropertyCard>>, ApiError> {
    let properties = PropertyRepository::new(&state.db).featured().await?;
    Ok(Json(cards_for(&state, &properties).await?))
}

/// Values for the listing page filter controls
#[utoipa::path(
    get,
    path = "/api/properties/filters",
    responses(
        (status = 200, description = "Filter options", body = FilterOptions)
    ),
    tag = "properties"
)]
pub async fn filter_options(
    State(state): State<AppState>,
) -> Result<Json<FilterOptions>, ApiError> {
    let properties = PropertyRepository::new(&state.db).list_public().await?;
    let cards = cards_for(&state, &properties).await?;
    Ok(Json(FilterOptions::from_cards(&cards)))
}

/// Organised images of several listings
#[utoipa::path(
    get,
    path = "/api/properties/images",
    params(ImagesQuery),
    responses(
        (status = 200, description = "Images keyed by listing id", body = HashMap<String, PropertyImages>),
        (status = 400, description = "Invalid id", body = ApiError)
    ),
    tag = "properties"
)]
pub async fn property_images(
    State(state): State<AppState>,
    Query(query): Query<ImagesQuery>,
) -> Result<Json<HashMap<Uuid, PropertyImages>>, ApiError> {
    let ids = query
        .ids
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(Uuid::parse_str)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| {
            ApiError::new(
                StatusCode::BAD_REQUEST,
                "VALIDATION_FAILED",
                "ids must be a comma-separated list of UUIDs",
            )
        })?;

    Ok(Json(state.images.get_multiple_property_images(&ids).await?))
}

/// Detail page of one listing
#[utoipa::path(
    get,
    path = "/api/properties/{slug}",
    params(("slug" = String, Path, description = "Listing slug")),
    responses(
        (status = 200, description = "Listing detail", body = PropertyDetailResponse),
        (status = 404, description = "Unknown slug", body = ApiError)
    ),
    tag = "properties"
)]
pub async fn property_detail(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<PropertyDetailResponse>, ApiError> {
    let repository = PropertyRepository::new(&state.db);
    let property = repository
        .find_by_slug(&slug)
        .await?
        .ok_or_else(|| {
            ApiError::new(StatusCode::NOT_FOUND, "PROPERTY_NOT_FOUND", "Property not found")
        })?;

    let images = state.images.get_property_images(property.id).await?;

    let mut related = repository.related(property.id).await?;
    related.truncate(RELATED_SIZE);
    let related = cards_for(&state, &related).await?;

    Ok(Json(PropertyDetailResponse {
        price: format_price(property.valor),
        quartos: format_detail_options(&property.quartos.0, "dormitório"),
        banheiros: format_detail_options(&property.banheiros.0, "banheiro"),
        vagas: format_detail_options(&property.vagas.0, "vaga"),
        property: property.into(),
        images,
        related,
    }))
}
