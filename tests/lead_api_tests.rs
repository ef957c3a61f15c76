//! Router-level tests for lead capture, the admin lead list and the
//! send-email endpoint.

use std::sync::Arc;

use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    response::Response,
};
use serde_json::{Value, json};
use tower::ServiceExt;

#[path = "test_utils/mod.rs"]
mod test_utils;

use test_utils::{RecordingMailer, TestApp, property_form};

async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(
    app: &TestApp,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.router.clone().oneshot(request).await.unwrap()
}

#[tokio::test]
async fn lead_is_stored_and_notified() {
    let app = TestApp::new().await.unwrap();

    let response = send(
        &app,
        "POST",
        "/api/leads",
        None,
        Some(json!({
            "nome": "  Maria Silva ",
            "email": "",
            "telefone": "(11) 99999-0000",
            "mensagem": "Gostaria de visitar",
            "pagina_origem": "/contato"
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Lead cadastrado com sucesso!");
    assert_eq!(body["lead"]["nome"], "Maria Silva");
    assert_eq!(body["lead"]["email"], Value::Null);
    assert_eq!(body["lead"]["status"], "Novo");

    let sent = app.mailer.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].nome_lead, "Maria Silva");
    assert_eq!(sent[0].email_lead, "Não informado");
    assert_eq!(sent[0].telefone_lead.as_deref(), Some("(11) 99999-0000"));
}

#[tokio::test]
async fn lead_without_contact_is_rejected() {
    let app = TestApp::new().await.unwrap();

    let response = send(
        &app,
        "POST",
        "/api/leads",
        None,
        Some(json!({ "mensagem": "Só uma mensagem", "nome": "   " })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "É necessário preencher pelo menos nome, telefone ou email"
    );
    assert!(app.mailer.sent().await.is_empty());
}

#[tokio::test]
async fn notification_failure_does_not_fail_the_request() {
    let app = TestApp::with_mailer(Some(Arc::new(RecordingMailer::failing())))
        .await
        .unwrap();

    let response = send(
        &app,
        "POST",
        "/api/leads",
        None,
        Some(json!({ "email": "ana@example.com" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn lead_without_mail_settings_is_still_stored() {
    let app = TestApp::with_mailer(None).await.unwrap();

    let response = send(
        &app,
        "POST",
        "/api/leads",
        None,
        Some(json!({ "telefone": "11 3333-4444" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn malformed_lead_body_is_a_bad_request() {
    let app = TestApp::new().await.unwrap();

    let request = Request::builder()
        .method("POST")
        .uri("/api/leads")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].is_string());
}

#[tokio::test]
async fn lead_list_requires_session() {
    let app = TestApp::new().await.unwrap();

    let response = send(&app, "GET", "/api/leads", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn lead_list_paginates_filters_and_counts() {
    let app = TestApp::new().await.unwrap();
    let token = app.admin_token().await.unwrap();
    let property = app
        .insert_property(property_form("Residencial Jardins"))
        .await
        .unwrap();

    for i in 0..3 {
        let response = send(
            &app,
            "POST",
            "/api/leads",
            None,
            Some(json!({
                "nome": format!("Cliente {i}"),
                "imovel_id": property.id.to_string()
            })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }
    let response = send(
        &app,
        "POST",
        "/api/leads",
        None,
        Some(json!({ "nome": "Outra Pessoa", "email": "outra@example.com" })),
    )
    .await;
    let other_id = body_json(response).await["lead"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = send(
        &app,
        "PUT",
        "/api/leads",
        Some(&token),
        Some(json!({ "id": other_id, "status": "Contatado" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["success"], true);
    assert_eq!(updated["lead"]["status"], "Contatado");

    let response = send(&app, "GET", "/api/leads?page=1&limit=2", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["leads"].as_array().unwrap().len(), 2);
    assert_eq!(body["pagination"]["total"], 4);
    assert_eq!(body["pagination"]["totalPages"], 2);
    assert_eq!(body["status_counts"]["Novo"], 3);
    assert_eq!(body["status_counts"]["Contatado"], 1);
    assert_eq!(body["status_counts"]["Arquivado"], 0);

    let body = body_json(
        send(&app, "GET", "/api/leads?status=Novo&search=cliente", Some(&token), None).await,
    )
    .await;
    assert_eq!(body["pagination"]["total"], 3);
    assert_eq!(body["leads"][0]["imovel"]["slug"], "residencial-jardins");

    let body = body_json(send(&app, "GET", "/api/leads?status=todos", Some(&token), None).await).await;
    assert_eq!(body["pagination"]["total"], 4);
}

#[tokio::test]
async fn lead_list_past_the_last_page_is_empty() {
    let app = TestApp::new().await.unwrap();
    let token = app.admin_token().await.unwrap();

    let response = send(
        &app,
        "POST",
        "/api/leads",
        None,
        Some(json!({ "nome": "Cliente", "email": "cliente@example.com" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    for page in ["2", "18446744073709551615"] {
        let uri = format!("/api/leads?page={page}");
        let response = send(&app, "GET", &uri, Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(body["leads"].as_array().unwrap().is_empty());
        assert_eq!(body["pagination"]["total"], 1);
        assert_eq!(body["pagination"]["totalPages"], 1);
    }
}

#[tokio::test]
async fn lead_status_update_validates_input() {
    let app = TestApp::new().await.unwrap();
    let token = app.admin_token().await.unwrap();

    let response = send(
        &app,
        "PUT",
        "/api/leads",
        Some(&token),
        Some(json!({ "id": uuid::Uuid::new_v4(), "status": "Perdido" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(
        &app,
        "PUT",
        "/api/leads",
        Some(&token),
        Some(json!({ "id": uuid::Uuid::new_v4(), "status": "Arquivado" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "Lead não encontrado");

    let response = send(&app, "GET", "/api/leads?status=Perdido", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn send_email_requires_name_and_email() {
    let app = TestApp::new().await.unwrap();

    let response = send(
        &app,
        "POST",
        "/api/send-email",
        None,
        Some(json!({ "nomeLead": "Ana" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "Nome e email são obrigatórios");
}

#[tokio::test]
async fn send_email_returns_message_id() {
    let app = TestApp::new().await.unwrap();

    let response = send(
        &app,
        "POST",
        "/api/send-email",
        None,
        Some(json!({
            "nomeLead": "Ana",
            "emailLead": "ana@example.com",
            "mensagem": "Olá"
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["message"], "E-mail enviado com sucesso");
    assert_eq!(body["messageId"], "msg-1");
}

#[tokio::test]
async fn send_email_lists_missing_settings() {
    let app = TestApp::with_mailer(None).await.unwrap();

    let response = send(
        &app,
        "POST",
        "/api/send-email",
        None,
        Some(json!({ "nomeLead": "Ana", "emailLead": "ana@example.com" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_json(response).await;
    assert_eq!(body["message"], "Configuração de e-mail incompleta");
    let missing = body["missingVars"].as_array().unwrap();
    assert!(missing.contains(&json!("FX_GMAIL_REFRESH_TOKEN")));
    assert!(missing.contains(&json!("FX_LEAD_NOTIFY_TO")));
}

#[tokio::test]
async fn send_email_reports_send_failure() {
    let app = TestApp::with_mailer(Some(Arc::new(RecordingMailer::failing())))
        .await
        .unwrap();

    let response = send(
        &app,
        "POST",
        "/api/send-email",
        None,
        Some(json!({ "nomeLead": "Ana", "emailLead": "ana@example.com" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_json(response).await;
    assert_eq!(body["message"], "Falha ao enviar e-mail");
    assert!(body["error"].as_str().unwrap().contains("mock failure"));
}
