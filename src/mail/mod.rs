//! # Lead Notification Mail
//!
//! Sends the "new lead" e-mail to the sales inbox through Gmail.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

pub mod gmail;
pub mod template;

pub use gmail::GmailMailer;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail settings incomplete: missing {}", .0.join(", "))]
    MissingSettings(Vec<&'static str>),
    #[error("network error: {0}")]
    Network(String),
    #[error("token refresh failed: {0}")]
    TokenRefresh(String),
    #[error("gmail rejected the message: {0}")]
    Send(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Lead data carried by the notification. Wire names follow the site's
/// contact forms.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct LeadEmail {
    #[schema(example = "Maria Silva")]
    pub nome_lead: String,
    #[schema(example = "maria@example.com")]
    pub email_lead: String,
    pub telefone_lead: Option<String>,
    pub mensagem: Option<String>,
    pub assunto: Option<String>,
    pub pagina_origem: Option<String>,
    pub imovel_id: Option<String>,
}

impl LeadEmail {
    /// Blank optional fields are treated as absent.
    pub fn normalized(self) -> Self {
        fn present(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        Self {
            nome_lead: self.nome_lead.trim().to_string(),
            email_lead: self.email_lead.trim().to_string(),
            telefone_lead: present(self.telefone_lead),
            mensagem: present(self.mensagem),
            assunto: present(self.assunto),
            pagina_origem: present(self.pagina_origem),
            imovel_id: present(self.imovel_id),
        }
    }
}

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Sends the notification for `lead` and returns the provider message id.
    async fn send_lead_notification(&self, lead: &LeadEmail) -> Result<String, MailError>;
}
