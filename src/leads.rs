//! Lead capture: cleaning the public contact form before it is stored.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::repositories::NewLead;

/// Body of `POST /api/leads`. Every field is optional; blanks are dropped.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct LeadSubmission {
    #[schema(example = "Maria Silva")]
    pub nome: Option<String>,
    #[schema(example = "maria@example.com")]
    pub email: Option<String>,
    #[schema(example = "(11) 99999-0000")]
    pub telefone: Option<String>,
    pub mensagem: Option<String>,
    pub assunto: Option<String>,
    #[schema(example = "/empreendimentos/residencial-jardins")]
    pub pagina_origem: Option<String>,
    pub imovel_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LeadValidationError {
    #[error("É necessário preencher pelo menos nome, telefone ou email")]
    MissingContact,
    #[error("imovel_id must be a valid UUID")]
    InvalidPropertyId,
}

impl LeadSubmission {
    /// Trims every field and drops empty ones. At least one of nome,
    /// telefone or email must survive.
    pub fn sanitize(self) -> Result<NewLead, LeadValidationError> {
        let lead = NewLead {
            nome: clean(self.nome),
            email: clean(self.email),
            telefone: clean(self.telefone),
            mensagem: clean(self.mensagem),
            assunto: clean(self.assunto),
            pagina_origem: clean(self.pagina_origem),
            imovel_id: clean(self.imovel_id)
                .map(|raw| raw.parse::<Uuid>())
                .transpose()
                .map_err(|_| LeadValidationError::InvalidPropertyId)?,
        };

        if lead.nome.is_none() && lead.telefone.is_none() && lead.email.is_none() {
            return Err(LeadValidationError::MissingContact);
        }

        Ok(lead)
    }
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_drops_blank_fields() {
        let lead = LeadSubmission {
            nome: Some("  Ana  ".to_string()),
            email: Some("   ".to_string()),
            mensagem: Some("\nOlá\n".to_string()),
            ..Default::default()
        }
        .sanitize()
        .unwrap();

        assert_eq!(lead.nome.as_deref(), Some("Ana"));
        assert!(lead.email.is_none());
        assert_eq!(lead.mensagem.as_deref(), Some("Olá"));
    }

    #[test]
    fn any_single_contact_field_is_enough() {
        for submission in [
            LeadSubmission {
                nome: Some("Ana".to_string()),
                ..Default::default()
            },
            LeadSubmission {
                telefone: Some("11 9999".to_string()),
                ..Default::default()
            },
            LeadSubmission {
                email: Some("a@b.com".to_string()),
                ..Default::default()
            },
        ] {
            assert!(submission.sanitize().is_ok());
        }
    }

    #[test]
    fn message_alone_is_rejected() {
        let err = LeadSubmission {
            nome: Some(" ".to_string()),
            mensagem: Some("Quero saber mais".to_string()),
            ..Default::default()
        }
        .sanitize()
        .unwrap_err();

        assert_eq!(err, LeadValidationError::MissingContact);
    }

    #[test]
    fn property_id_must_be_uuid() {
        let err = LeadSubmission {
            nome: Some("Ana".to_string()),
            imovel_id: Some("abc".to_string()),
            ..Default::default()
        }
        .sanitize()
        .unwrap_err();
        assert_eq!(err, LeadValidationError::InvalidPropertyId);

        let id = Uuid::new_v4();
        let lead = LeadSubmission {
            nome: Some("Ana".to_string()),
            imovel_id: Some(format!(" {id} ")),
            ..Default::default()
        }
        .sanitize()
        .unwrap();
        assert_eq!(lead.imovel_id, Some(id));
    }
}
