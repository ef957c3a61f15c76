//! Test utilities for database and router testing.
//!
//! Sets up in-memory SQLite databases with migrations applied and builds the
//! application router around an in-memory bucket and a recording mailer.

#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use axum::Router;
use fx_imoveis::auth::AdminUser;
use fx_imoveis::config::{AppConfig, AuthConfig};
use fx_imoveis::mail::{LeadEmail, MailError, Mailer};
use fx_imoveis::models::property::Model as PropertyModel;
use fx_imoveis::properties::PropertyForm;
use fx_imoveis::repositories::{PropertyRepository, UserRepository};
use fx_imoveis::server::{AppState, create_app};
use fx_imoveis::storage::MemoryStorage;
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use tokio::sync::Mutex;
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "test-secret-test-secret-test-secret";
pub const TEST_BUCKET: &str = "imagens-imoveis";

/// Sets up an in-memory SQLite database with all migrations applied.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = Database::connect("sqlite::memory:").await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

pub fn test_config() -> AppConfig {
    AppConfig {
        profile: "test".to_string(),
        auth: AuthConfig {
            jwt_secret: Some(TEST_JWT_SECRET.to_string()),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Mailer that records every notification instead of sending it.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<LeadEmail>>,
    pub fail: bool,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub async fn sent(&self) -> Vec<LeadEmail> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_lead_notification(&self, lead: &LeadEmail) -> Result<String, MailError> {
        if self.fail {
            return Err(MailError::Send("status 500: mock failure".to_string()));
        }
        let mut sent = self.sent.lock().await;
        sent.push(lead.clone());
        Ok(format!("msg-{}", sent.len()))
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub db: DatabaseConnection,
    pub storage: Arc<MemoryStorage>,
    pub mailer: Arc<RecordingMailer>,
}

impl TestApp {
    pub async fn new() -> Result<Self> {
        Self::with_mailer(Some(Arc::new(RecordingMailer::default()))).await
    }

    /// `None` builds an app whose mail settings are incomplete.
    pub async fn with_mailer(mailer: Option<Arc<RecordingMailer>>) -> Result<Self> {
        let db = setup_test_db().await?;
        let storage = Arc::new(MemoryStorage::new(TEST_BUCKET));
        let recording = mailer.clone().unwrap_or_default();
        let mailer: Option<Arc<dyn Mailer>> = mailer.map(|m| m as Arc<dyn Mailer>);

        let state = AppState::new(test_config(), db.clone(), storage.clone(), mailer);
        let router = create_app(state.clone());

        Ok(Self {
            router,
            state,
            db,
            storage,
            mailer: recording,
        })
    }

    /// A valid bearer token for a freshly created admin user.
    pub async fn admin_token(&self) -> Result<String> {
        let user = UserRepository::new(&self.db)
            .upsert("admin", "Administrador", "senha-segura-123")
            .await?;
        let token = self.state.sessions.issue(&AdminUser {
            id: user.id,
            username: user.username,
            name: user.name,
        })?;
        Ok(token)
    }

    pub async fn insert_property(&self, form: PropertyForm) -> Result<PropertyModel> {
        let form = form
            .normalize()
            .map_err(|errors| anyhow::anyhow!("invalid fixture: {errors:?}"))?;
        Ok(PropertyRepository::new(&self.db)
            .create(form, Some("fixture"))
            .await?)
    }
}

/// A form that passes validation.
pub fn property_form(titulo: &str) -> PropertyForm {
    PropertyForm {
        titulo: titulo.to_string(),
        titulo_descricao: "Apartamentos de 2 e 3 dormitórios".to_string(),
        valor: Some(850_000.0),
        bairro: "Jardins".to_string(),
        area_texto: "45 a 80 m²".to_string(),
        areas_disponiveis: vec![45.0, 80.0],
        status_empreendimento: "Lançamento".to_string(),
        tipo_imovel: vec!["Apartamento".to_string()],
        caracteristicas: vec!["Piscina".to_string(), "Academia".to_string()],
        quartos: vec!["2".to_string(), "3".to_string()],
        banheiros: vec!["2".to_string()],
        vagas: vec!["1".to_string()],
        iframe_mapa: "<iframe src=\"https://maps.example.com\"></iframe>".to_string(),
        ..Default::default()
    }
}

pub fn random_id() -> Uuid {
    Uuid::new_v4()
}

/// Minimal bytes tagged as a WebP image.
pub fn webp_bytes() -> Vec<u8> {
    b"RIFF\x24\x00\x00\x00WEBPVP8 ".to_vec()
}
