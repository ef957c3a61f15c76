//! # Server Configuration
//!
//! Router, shared state and OpenAPI document for the fx-imoveis API.

use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{get, post, put},
};
use sea_orm::DatabaseConnection;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::{
    Modify, OpenApi,
    openapi::{
        security::{Http, HttpAuthScheme, SecurityScheme},
        server::Server,
    },
};
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::{self, SessionKeys};
use crate::config::{AppConfig, is_dev_profile};
use crate::handlers::{self, admin_properties, images, leads, properties, send_email};
use crate::images::ImageService;
use crate::mail::{GmailMailer, MailError, Mailer};
use crate::storage::{self, ObjectStorage};
use crate::telemetry;

/// Files accepted in one multipart request.
const MAX_FILES_PER_REQUEST: usize = 24;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DatabaseConnection,
    pub images: Arc<ImageService>,
    /// `None` when the Gmail settings are incomplete
    pub mailer: Option<Arc<dyn Mailer>>,
    pub sessions: Arc<SessionKeys>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        db: DatabaseConnection,
        storage: Arc<dyn ObjectStorage>,
        mailer: Option<Arc<dyn Mailer>>,
    ) -> Self {
        let images = Arc::new(ImageService::new(db.clone(), storage, &config.images));
        let sessions = Arc::new(SessionKeys::from_config(&config.auth));

        Self {
            config: Arc::new(config),
            db,
            images,
            mailer,
            sessions,
        }
    }
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        if is_dev_profile(&config.profile) {
            return CorsLayer::very_permissive();
        }
        return CorsLayer::new();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        .route("/readyz", get(handlers::readyz))
        .route("/api/properties", get(properties::list_properties))
        .route("/api/properties/home", get(properties::home_properties))
        .route("/api/properties/featured", get(properties::featured_properties))
        .route("/api/properties/filters", get(properties::filter_options))
        .route("/api/properties/images", get(properties::property_images))
        .route("/api/properties/{slug}", get(properties::property_detail))
        .route("/api/leads", post(leads::create_lead))
        .route("/api/send-email", post(send_email::send_email))
        .route("/api/auth/login", post(handlers::auth::login))
}

fn admin_routes(sessions: Arc<SessionKeys>) -> Router<AppState> {
    Router::new()
        .route("/api/auth/me", get(handlers::auth::me))
        .route(
            "/api/leads",
            get(leads::list_leads).put(leads::update_lead_status),
        )
        .route(
            "/api/admin/properties",
            get(admin_properties::list_properties).post(admin_properties::create_property),
        )
        .route(
            "/api/admin/properties/{id}",
            get(admin_properties::get_property)
                .put(admin_properties::update_property)
                .delete(admin_properties::delete_property),
        )
        .route(
            "/api/admin/properties/{id}/images",
            get(images::list_images).delete(images::delete_image),
        )
        .route(
            "/api/admin/properties/{id}/images/{tipo}",
            put(images::upload_main_image),
        )
        .route(
            "/api/admin/properties/{id}/galleries/{name}",
            post(images::upload_gallery).delete(images::delete_gallery),
        )
        .route(
            "/api/admin/properties/{id}/uploads",
            post(images::batch_upload),
        )
        .route(
            "/api/admin/cache/images",
            get(images::image_cache_stats).delete(images::clear_image_cache),
        )
        .route_layer(middleware::from_fn_with_state(sessions, auth::admin_auth))
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    let body_limit = state
        .config
        .images
        .max_image_bytes()
        .saturating_mul(MAX_FILES_PER_REQUEST);
    let cors = cors_layer(&state.config);
    let openapi = api_doc(&state.config);

    public_routes()
        .merge(admin_routes(state.sessions.clone()))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(middleware::from_fn(telemetry::trace_id_middleware))
        .merge(SwaggerUi::new("/docs").url("/openapi.json", openapi))
}

/// The OpenAPI document, listing the public origin as its server when set.
pub fn api_doc(config: &AppConfig) -> utoipa::openapi::OpenApi {
    let mut openapi = ApiDoc::openapi();
    if let Some(base_url) = config.public_base_url.as_deref() {
        openapi.servers = Some(vec![Server::new(base_url.trim_end_matches('/'))]);
    }
    openapi
}

/// Builds the Gmail mailer, or `None` when its settings are incomplete.
pub fn build_mailer(config: &AppConfig) -> anyhow::Result<Option<Arc<dyn Mailer>>> {
    match GmailMailer::from_config(&config.mail) {
        Ok(mailer) => {
            let mailer: Arc<dyn Mailer> = Arc::new(mailer);
            Ok(Some(mailer))
        }
        Err(MailError::MissingSettings(missing)) => {
            tracing::warn!(missing = ?missing, "Gmail settings incomplete, lead notifications disabled");
            Ok(None)
        }
        Err(err) => Err(err).context("failed to build Gmail client"),
    }
}

/// Starts the server with the given configuration
pub async fn run_server(config: AppConfig, db: DatabaseConnection) -> anyhow::Result<()> {
    let addr = config
        .bind_addr()
        .with_context(|| format!("invalid server address '{}'", config.api_bind_addr))?;

    let storage = storage::from_config(&config.storage).context("failed to set up object storage")?;
    let mailer = build_mailer(&config)?;
    let profile = config.profile.clone();

    let app = create_app(AppState::new(config, db, storage, mailer));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, %profile, "Server listening");

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    paths(
        crate::handlers::root,
        crate::handlers::healthz,
        crate::handlers::readyz,
        crate::handlers::properties::list_properties,
        crate::handlers::properties::home_properties,
        crate::handlers::properties::featured_properties,
        crate::handlers::properties::filter_options,
        crate::handlers::properties::property_images,
        crate::handlers::properties::property_detail,
        crate::handlers::leads::create_lead,
        crate::handlers::leads::list_leads,
        crate::handlers::leads::update_lead_status,
        crate::handlers::send_email::send_email,
        crate::handlers::auth::login,
        crate::handlers::auth::me,
        crate::handlers::admin_properties::list_properties,
        crate::handlers::admin_properties::create_property,
        crate::handlers::admin_properties::get_property,
        crate::handlers::admin_properties::update_property,
        crate::handlers::admin_properties::delete_property,
        crate::handlers::images::list_images,
        crate::handlers::images::upload_main_image,
        crate::handlers::images::delete_image,
        crate::handlers::images::upload_gallery,
        crate::handlers::images::delete_gallery,
        crate::handlers::images::batch_upload,
        crate::handlers::images::image_cache_stats,
        crate::handlers::images::clear_image_cache,
    ),
    components(
        schemas(
            crate::models::ServiceInfo,
            crate::error::ApiError,
            crate::handlers::HealthStatus,
        )
    ),
    tags(
        (name = "properties", description = "Public listing pages"),
        (name = "leads", description = "Contact form and lead management"),
        (name = "auth", description = "Admin sessions"),
        (name = "admin", description = "Listing management"),
        (name = "images", description = "Listing images")
    ),
    info(
        title = "fx-imoveis API",
        description = "Listings, images and leads behind the Fort Xavier real-estate site",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;
