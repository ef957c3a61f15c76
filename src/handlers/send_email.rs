//! `POST /api/send-email`: sends a lead notification on demand.

use axum::{
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::mail::LeadEmail;
use crate::server::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailResponse {
    #[schema(example = "E-mail enviado com sucesso")]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_vars: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SendEmailResponse {
    fn message(message: &str) -> Self {
        Self {
            message: message.to_string(),
            message_id: None,
            missing_vars: None,
            error: None,
        }
    }
}

fn reply(status: StatusCode, body: SendEmailResponse) -> Response {
    (status, Json(body)).into_response()
}

/// Send the lead notification e-mail
#[utoipa::path(
    post,
    path = "/api/send-email",
    request_body = LeadEmail,
    responses(
        (status = 200, description = "E-mail sent", body = SendEmailResponse),
        (status = 400, description = "nomeLead or emailLead missing", body = SendEmailResponse),
        (status = 500, description = "Mail settings incomplete or send failed", body = SendEmailResponse)
    ),
    tag = "leads"
)]
pub async fn send_email(
    State(state): State<AppState>,
    payload: Result<Json<LeadEmail>, JsonRejection>,
) -> Response {
    let lead = match payload {
        Ok(Json(lead)) => lead.normalized(),
        Err(rejection) => {
            tracing::debug!(error = %rejection.body_text(), "Rejected send-email body");
            LeadEmail::default()
        }
    };

    if lead.nome_lead.is_empty() || lead.email_lead.is_empty() {
        return reply(
            StatusCode::BAD_REQUEST,
            SendEmailResponse::message("Nome e email são obrigatórios"),
        );
    }

    let Some(mailer) = state.mailer.as_ref() else {
        let missing = state.config.mail.missing_vars();
        tracing::error!(missing = ?missing, "Mail settings incomplete");
        return reply(
            StatusCode::INTERNAL_SERVER_ERROR,
            SendEmailResponse {
                missing_vars: Some(missing.into_iter().map(str::to_string).collect()),
                ..SendEmailResponse::message("Configuração de e-mail incompleta")
            },
        );
    };

    match mailer.send_lead_notification(&lead).await {
        Ok(message_id) => reply(
            StatusCode::OK,
            SendEmailResponse {
                message_id: Some(message_id),
                ..SendEmailResponse::message("E-mail enviado com sucesso")
            },
        ),
        Err(err) => {
            tracing::error!(error = %err, "Sending lead e-mail failed");
            reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                SendEmailResponse {
                    error: Some(err.to_string()),
                    ..SendEmailResponse::message("Falha ao enviar e-mail")
                },
            )
        }
    }
}
