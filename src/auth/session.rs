//! Signed admin session tokens (HS256 JWT).

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::AuthConfig;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to sign session token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
    #[error("session token is invalid: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),
    #[error("session token subject is not a user id")]
    InvalidSubject,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    /// User id
    pub sub: String,
    pub username: String,
    pub name: String,
    pub iat: i64,
    pub exp: i64,
}

/// Authenticated back-office user carried by a valid session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct AdminUser {
    pub id: Uuid,
    pub username: String,
    pub name: String,
}

pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl SessionKeys {
    pub fn new(secret: &[u8], ttl_hours: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl: Duration::hours(ttl_hours as i64),
        }
    }

    /// Keys from configuration. Without a configured secret (only allowed in
    /// local and test profiles) a random per-process secret is used.
    pub fn from_config(config: &AuthConfig) -> Self {
        match config.jwt_secret.as_deref() {
            Some(secret) => Self::new(secret.as_bytes(), config.session_ttl_hours),
            None => {
                tracing::warn!(
                    "FX_JWT_SECRET is not set; sessions will not survive a restart"
                );
                let mut secret = [0u8; 32];
                rand::thread_rng().fill_bytes(&mut secret);
                Self::new(&secret, config.session_ttl_hours)
            }
        }
    }

    pub fn ttl_seconds(&self) -> i64 {
        self.ttl.num_seconds()
    }

    pub fn issue(&self, user: &AdminUser) -> Result<String, SessionError> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            name: user.name.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(SessionError::Signing)
    }

    pub fn verify(&self, token: &str) -> Result<AdminUser, SessionError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = decode::<SessionClaims>(token, &self.decoding, &validation)
            .map_err(SessionError::Invalid)?;
        let id = data
            .claims
            .sub
            .parse::<Uuid>()
            .map_err(|_| SessionError::InvalidSubject)?;

        Ok(AdminUser {
            id,
            username: data.claims.username,
            name: data.claims.name,
        })
    }
}
