//! Property entity model for the `fx_properties` table.

use sea_orm::ActiveModelBehavior;
use sea_orm::FromJsonQueryResult;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Free-text tags stored as a JSON array (bedroom options, amenities, kinds).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult, ToSchema)]
#[serde(transparent)]
pub struct TagList(pub Vec<String>);

/// Available unit sizes in square metres, stored as a JSON array.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, FromJsonQueryResult, ToSchema)]
#[serde(transparent)]
pub struct AreaList(pub Vec<f64>);

impl TagList {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|tag| tag.trim().is_empty())
    }
}

/// A listing shown on the public site.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "fx_properties")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub titulo: String,

    /// URL segment, unique across listings
    #[sea_orm(unique)]
    pub slug: String,

    /// Short headline shown on cards
    pub titulo_descricao: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub descricao: Option<String>,

    /// Asking price; zero renders as "Consulte"
    #[sea_orm(column_type = "Double")]
    pub valor: f64,

    #[sea_orm(column_type = "Double", nullable)]
    pub valor_condominio: Option<f64>,

    pub bairro: String,
    pub cidade: String,
    pub estado: String,
    pub endereco: Option<String>,
    pub texto_localizacao: Option<String>,

    /// Human-entered size description, e.g. "45 a 80 m²"
    pub area_texto: String,

    #[sea_orm(column_type = "JsonBinary")]
    pub areas_disponiveis: AreaList,

    /// Construction stage, e.g. "Lançamento"
    pub status_empreendimento: String,

    #[sea_orm(column_type = "JsonBinary")]
    pub tipo_imovel: TagList,

    #[sea_orm(column_type = "JsonBinary")]
    pub caracteristicas: TagList,

    #[sea_orm(column_type = "JsonBinary")]
    pub quartos: TagList,

    #[sea_orm(column_type = "JsonBinary")]
    pub banheiros: TagList,

    #[sea_orm(column_type = "JsonBinary")]
    pub vagas: TagList,

    pub destaque: bool,
    pub home: bool,

    /// Sort key for the public listing page (ascending)
    pub ordem: i32,

    #[sea_orm(column_type = "Text")]
    pub iframe_mapa: String,

    pub video_url: Option<String>,
    pub responsavel_criacao: Option<String>,
    pub responsavel_atualizacao: Option<String>,
    pub data_criacao: DateTimeWithTimeZone,
    pub data_atualizacao: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::property_image::Entity")]
    Images,
    #[sea_orm(has_many = "super::lead::Entity")]
    Leads,
}

impl Related<super::property_image::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Images.def()
    }
}

impl Related<super::lead::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Leads.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
