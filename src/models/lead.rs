//! Lead entity model for the `fx_leads` table.

use std::fmt;
use std::str::FromStr;

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Follow-up stage of a lead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum LeadStatus {
    Novo,
    Contatado,
    Convertido,
    Arquivado,
}

impl LeadStatus {
    pub const ALL: [LeadStatus; 4] = [
        LeadStatus::Novo,
        LeadStatus::Contatado,
        LeadStatus::Convertido,
        LeadStatus::Arquivado,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::Novo => "Novo",
            LeadStatus::Contatado => "Contatado",
            LeadStatus::Convertido => "Convertido",
            LeadStatus::Arquivado => "Arquivado",
        }
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeadStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LeadStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown lead status '{s}'"))
    }
}

/// A contact-form submission.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "fx_leads")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub nome: Option<String>,
    pub email: Option<String>,
    pub telefone: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub mensagem: Option<String>,

    pub assunto: Option<String>,

    /// Page the form was submitted from
    pub pagina_origem: Option<String>,

    /// Listing the lead asked about, if any
    pub imovel_id: Option<Uuid>,

    pub status: String,
    pub data_criacao: DateTimeWithTimeZone,
    pub data_atualizacao: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::property::Entity",
        from = "Column::ImovelId",
        to = "super::property::Column::Id",
        on_delete = "SetNull"
    )]
    Property,
}

impl Related<super::property::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Property.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_each_known_status() {
        for status in LeadStatus::ALL {
            assert_eq!(status.as_str().parse::<LeadStatus>().unwrap(), status);
        }
    }

    #[test]
    fn status_parsing_is_case_sensitive() {
        assert!("novo".parse::<LeadStatus>().is_err());
        assert!("Perdido".parse::<LeadStatus>().is_err());
    }
}
