//! # Admin Session Handlers

use axum::{
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::AdminUser;
use crate::error::{ApiError, unauthorized};
use crate::repositories::UserRepository;
use crate::server::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "admin")]
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    /// Bearer token for the admin routes
    pub token: String,
    /// Seconds until the token expires
    pub expires_in: i64,
    pub user: AdminUser,
}

/// Exchange admin credentials for a session token
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session issued", body = LoginResponse),
        (status = 400, description = "Malformed body", body = ApiError),
        (status = 401, description = "Invalid credentials", body = ApiError)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(request) = payload?;
    let user = UserRepository::new(&state.db)
        .authenticate_user(&request.username, &request.password)
        .await?
        .ok_or_else(|| {
            tracing::warn!(username = %request.username.trim(), "Rejected admin login");
            unauthorized(Some("Invalid username or password"))
        })?;

    let admin = AdminUser {
        id: user.id,
        username: user.username,
        name: user.name,
    };
    let token = state.sessions.issue(&admin).map_err(|err| {
        tracing::error!(error = %err, "Issuing session token failed");
        ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_SERVER_ERROR",
            "Could not create session",
        )
    })?;

    tracing::info!(user_id = %admin.id, username = %admin.username, "Admin logged in");
    Ok(Json(LoginResponse {
        token,
        expires_in: state.sessions.ttl_seconds(),
        user: admin,
    }))
}

/// The admin user of the current session
#[utoipa::path(
    get,
    path = "/api/auth/me",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = AdminUser),
        (status = 401, description = "Missing or invalid session", body = ApiError)
    ),
    tag = "auth"
)]
pub async fn me(admin: AdminUser) -> Json<AdminUser> {
    Json(admin)
}
