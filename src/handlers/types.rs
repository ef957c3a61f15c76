//! # Common API Types
//!
//! Response shapes shared by the public and admin handlers, plus small
//! request parsing helpers.

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::lead::Model as LeadModel;
use crate::models::property::Model as PropertyModel;

pub(crate) fn to_rfc3339(value: DateTimeWithTimeZone) -> String {
    let utc: DateTime<Utc> = value.with_timezone(&Utc);
    utc.to_rfc3339()
}

/// Parses a listing id taken from the path.
pub(crate) fn parse_property_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| {
        ApiError::new(
            StatusCode::BAD_REQUEST,
            "VALIDATION_FAILED",
            "property id must be a valid UUID",
        )
    })
}

/// A listing with every stored column.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PropertyResponse {
    #[schema(value_type = String, example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    pub titulo: String,
    pub slug: String,
    pub titulo_descricao: String,
    pub descricao: Option<String>,
    pub valor: f64,
    pub valor_condominio: Option<f64>,
    pub bairro: String,
    pub cidade: String,
    pub estado: String,
    pub endereco: Option<String>,
    pub texto_localizacao: Option<String>,
    pub area_texto: String,
    pub areas_disponiveis: Vec<f64>,
    pub status_empreendimento: String,
    pub tipo_imovel: Vec<String>,
    pub caracteristicas: Vec<String>,
    pub quartos: Vec<String>,
    pub banheiros: Vec<String>,
    pub vagas: Vec<String>,
    pub destaque: bool,
    pub home: bool,
    pub ordem: i32,
    pub iframe_mapa: String,
    pub video_url: Option<String>,
    pub responsavel_criacao: Option<String>,
    pub responsavel_atualizacao: Option<String>,
    #[schema(example = "2025-06-01T10:30:00+00:00")]
    pub data_criacao: String,
    pub data_atualizacao: String,
}

impl From<PropertyModel> for PropertyResponse {
    fn from(model: PropertyModel) -> Self {
        Self {
            id: model.id,
            titulo: model.titulo,
            slug: model.slug,
            titulo_descricao: model.titulo_descricao,
            descricao: model.descricao,
            valor: model.valor,
            valor_condominio: model.valor_condominio,
            bairro: model.bairro,
            cidade: model.cidade,
            estado: model.estado,
            endereco: model.endereco,
            texto_localizacao: model.texto_localizacao,
            area_texto: model.area_texto,
            areas_disponiveis: model.areas_disponiveis.0,
            status_empreendimento: model.status_empreendimento,
            tipo_imovel: model.tipo_imovel.0,
            caracteristicas: model.caracteristicas.0,
            quartos: model.quartos.0,
            banheiros: model.banheiros.0,
            vagas: model.vagas.0,
            destaque: model.destaque,
            home: model.home,
            ordem: model.ordem,
            iframe_mapa: model.iframe_mapa,
            video_url: model.video_url,
            responsavel_criacao: model.responsavel_criacao,
            responsavel_atualizacao: model.responsavel_atualizacao,
            data_criacao: to_rfc3339(model.data_criacao),
            data_atualizacao: to_rfc3339(model.data_atualizacao),
        }
    }
}

/// Title and slug of the listing a lead refers to.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LeadPropertyRef {
    pub titulo: String,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LeadResponse {
    #[schema(value_type = String)]
    pub id: Uuid,
    pub nome: Option<String>,
    pub email: Option<String>,
    pub telefone: Option<String>,
    pub mensagem: Option<String>,
    pub assunto: Option<String>,
    pub pagina_origem: Option<String>,
    #[schema(value_type = Option<String>)]
    pub imovel_id: Option<Uuid>,
    #[schema(example = "Novo")]
    pub status: String,
    pub data_criacao: String,
    pub data_atualizacao: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imovel: Option<LeadPropertyRef>,
}

impl From<LeadModel> for LeadResponse {
    fn from(model: LeadModel) -> Self {
        Self {
            id: model.id,
            nome: model.nome,
            email: model.email,
            telefone: model.telefone,
            mensagem: model.mensagem,
            assunto: model.assunto,
            pagina_origem: model.pagina_origem,
            imovel_id: model.imovel_id,
            status: model.status,
            data_criacao: to_rfc3339(model.data_criacao),
            data_atualizacao: to_rfc3339(model.data_atualizacao),
            imovel: None,
        }
    }
}

/// `{ "error": ... }` body used by the lead endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LeadErrorBody {
    #[schema(example = "É necessário preencher pelo menos nome, telefone ou email")]
    pub error: String,
}

/// Count of removed rows.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeletedResponse {
    pub success: bool,
    pub deleted: u64,
}
