//! # Authentication and Authorization
//!
//! Back-office login sessions: password hashing, signed session tokens and
//! the bearer middleware guarding admin routes.

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::error::{ApiError, unauthorized};
use crate::server::AppState;

pub mod password;
pub mod session;

pub use session::{AdminUser, SessionError, SessionKeys};

impl FromRef<AppState> for Arc<SessionKeys> {
    fn from_ref(app_state: &AppState) -> Self {
        Arc::clone(&app_state.sessions)
    }
}

/// Rejects requests without a valid `Authorization: Bearer <session>` header
/// and makes the [`AdminUser`] available to handlers.
pub async fn admin_auth(
    State(sessions): State<Arc<SessionKeys>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(request.headers())?;

    let user = sessions.verify(token).map_err(|err| {
        tracing::info!(error = %err, "Rejected admin session");
        unauthorized(Some("Invalid or expired session"))
    })?;

    tracing::debug!(user_id = %user.id, username = %user.username, "Authenticated admin request");
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| unauthorized(Some("Missing Authorization header")))?
        .to_str()
        .map_err(|_| unauthorized(Some("Invalid Authorization header")))?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| unauthorized(Some("Authorization header must use Bearer scheme")))
}

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AdminUser>()
            .cloned()
            .ok_or_else(|| unauthorized(Some("Admin authentication required")))
    }
}
