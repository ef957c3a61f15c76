//! # Lead Handlers
//!
//! The public contact endpoint plus the admin list and status update. These
//! routes answer with `{ "error": ... }` bodies instead of problem+json.

use std::collections::BTreeMap;

use axum::{
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::auth::AdminUser;
use crate::error::RepositoryError;
use crate::handlers::types::{LeadErrorBody, LeadPropertyRef, LeadResponse};
use crate::leads::LeadSubmission;
use crate::mail::LeadEmail;
use crate::models::{LeadStatus, lead::Model as LeadModel};
use crate::repositories::{LeadListQuery, LeadRepository};
use crate::server::AppState;

const CREATED_MESSAGE: &str = "Lead cadastrado com sucesso!";
const NOT_INFORMED: &str = "Não informado";
/// Status filter value meaning "every status".
const ALL_STATUSES: &str = "todos";

/// A lead endpoint failure rendered as `{ "error": message }`.
#[derive(Debug)]
pub struct LeadApiError {
    status: StatusCode,
    message: String,
}

impl LeadApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for LeadApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(LeadErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

impl From<JsonRejection> for LeadApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(format!("Corpo da requisição inválido: {}", rejection.body_text()))
    }
}

fn parse_status(raw: &str) -> Result<LeadStatus, LeadApiError> {
    raw.parse::<LeadStatus>().map_err(|_| {
        let allowed: Vec<&str> = LeadStatus::ALL.iter().map(LeadStatus::as_str).collect();
        LeadApiError::bad_request(format!(
            "Status inválido. Use um destes: {}",
            allowed.join(", ")
        ))
    })
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LeadCreatedResponse {
    pub success: bool,
    #[schema(example = "Lead cadastrado com sucesso!")]
    pub message: String,
    pub lead: LeadResponse,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LeadListParams {
    /// 1-based page, default 1
    pub page: Option<u64>,
    /// Page size, default 20, at most 100
    pub limit: Option<u64>,
    /// `Novo`, `Contatado`, `Convertido`, `Arquivado` or `todos`
    pub status: Option<String>,
    /// Case-insensitive match on nome, email, telefone or mensagem
    pub search: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LeadListResponse {
    pub leads: Vec<LeadResponse>,
    pub pagination: Pagination,
    /// Lead count per status, over every lead
    pub status_counts: BTreeMap<String, u64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LeadStatusUpdate {
    #[schema(value_type = String)]
    pub id: Uuid,
    #[schema(example = "Contatado")]
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LeadUpdatedResponse {
    pub success: bool,
    pub lead: LeadResponse,
}

fn notification_for(lead: &LeadModel) -> LeadEmail {
    LeadEmail {
        nome_lead: lead.nome.clone().unwrap_or_else(|| NOT_INFORMED.to_string()),
        email_lead: lead.email.clone().unwrap_or_else(|| NOT_INFORMED.to_string()),
        telefone_lead: lead.telefone.clone(),
        mensagem: lead.mensagem.clone(),
        assunto: lead.assunto.clone(),
        pagina_origem: lead.pagina_origem.clone(),
        imovel_id: lead.imovel_id.map(|id| id.to_string()),
    }
}

async fn notify(state: &AppState, lead: &LeadModel) {
    let Some(mailer) = state.mailer.as_ref() else {
        tracing::warn!(lead_id = %lead.id, "Mail settings incomplete, lead notification skipped");
        return;
    };

    if let Err(err) = mailer.send_lead_notification(&notification_for(lead)).await {
        tracing::error!(lead_id = %lead.id, error = %err, "Lead notification failed");
    }
}

/// Store a contact form submission
#[utoipa::path(
    post,
    path = "/api/leads",
    request_body = LeadSubmission,
    responses(
        (status = 201, description = "Lead stored", body = LeadCreatedResponse),
        (status = 400, description = "No contact field filled", body = LeadErrorBody),
        (status = 500, description = "Database failure", body = LeadErrorBody)
    ),
    tag = "leads"
)]
pub async fn create_lead(
    State(state): State<AppState>,
    payload: Result<Json<LeadSubmission>, JsonRejection>,
) -> Result<(StatusCode, Json<LeadCreatedResponse>), LeadApiError> {
    let Json(submission) = payload?;
    let new_lead = submission
        .sanitize()
        .map_err(|err| LeadApiError::bad_request(err.to_string()))?;

    let lead = LeadRepository::new(&state.db)
        .create(new_lead)
        .await
        .map_err(|err| {
            tracing::error!(error = %err, "Saving lead failed");
            LeadApiError::internal("Erro interno do servidor ao salvar no DB")
        })?;

    tracing::info!(lead_id = %lead.id, origem = ?lead.pagina_origem, "Lead stored");
    notify(&state, &lead).await;

    Ok((
        StatusCode::CREATED,
        Json(LeadCreatedResponse {
            success: true,
            message: CREATED_MESSAGE.to_string(),
            lead: lead.into(),
        }),
    ))
}

/// Paginated lead list for the back office
#[utoipa::path(
    get,
    path = "/api/leads",
    security(("bearer_auth" = [])),
    params(LeadListParams),
    responses(
        (status = 200, description = "One page of leads", body = LeadListResponse),
        (status = 400, description = "Unknown status", body = LeadErrorBody),
        (status = 401, description = "Missing or invalid session")
    ),
    tag = "leads"
)]
pub async fn list_leads(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(params): Query<LeadListParams>,
) -> Result<Json<LeadListResponse>, LeadApiError> {
    let status = params
        .status
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != ALL_STATUSES)
        .map(parse_status)
        .transpose()?;

    let query = LeadListQuery {
        page: params.page.unwrap_or(1),
        limit: params.limit.unwrap_or(0),
        status,
        search: params.search,
    };

    let repository = LeadRepository::new(&state.db);
    let (rows, total) = repository.list(&query).await.map_err(internal_error)?;
    let status_counts = repository.status_counts().await.map_err(internal_error)?;

    let limit = query.limit();
    let leads = rows
        .into_iter()
        .map(|row| {
            let mut lead = LeadResponse::from(row.lead);
            lead.imovel = row
                .property
                .map(|(titulo, slug)| LeadPropertyRef { titulo, slug });
            lead
        })
        .collect();

    Ok(Json(LeadListResponse {
        leads,
        pagination: Pagination {
            page: query.page(),
            limit,
            total,
            total_pages: total.div_ceil(limit),
        },
        status_counts,
    }))
}

/// Change the status of a lead
#[utoipa::path(
    put,
    path = "/api/leads",
    security(("bearer_auth" = [])),
    request_body = LeadStatusUpdate,
    responses(
        (status = 200, description = "Lead updated", body = LeadUpdatedResponse),
        (status = 400, description = "Unknown status", body = LeadErrorBody),
        (status = 404, description = "Unknown lead", body = LeadErrorBody)
    ),
    tag = "leads"
)]
pub async fn update_lead_status(
    State(state): State<AppState>,
    admin: AdminUser,
    payload: Result<Json<LeadStatusUpdate>, JsonRejection>,
) -> Result<Json<LeadUpdatedResponse>, LeadApiError> {
    let Json(update) = payload?;
    let status = parse_status(update.status.trim())?;

    let lead = LeadRepository::new(&state.db)
        .update_status(update.id, status)
        .await
        .map_err(|err| match err {
            RepositoryError::NotFound(_) => {
                LeadApiError::new(StatusCode::NOT_FOUND, "Lead não encontrado")
            }
            other => internal_error(other),
        })?;

    tracing::info!(lead_id = %lead.id, status = %status, author = %admin.username, "Lead status updated");
    Ok(Json(LeadUpdatedResponse {
        success: true,
        lead: lead.into(),
    }))
}

fn internal_error(err: RepositoryError) -> LeadApiError {
    tracing::error!(error = %err, "Lead query failed");
    LeadApiError::internal("Erro interno do servidor")
}
