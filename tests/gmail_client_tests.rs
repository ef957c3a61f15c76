use fx_imoveis::config::MailConfig;
use fx_imoveis::mail::{GmailMailer, LeadEmail, MailError, Mailer};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_string_contains, header, method, path},
};

fn mail_config(server: &MockServer) -> MailConfig {
    MailConfig {
        gmail_email: Some("site@fortxavier.com.br".to_string()),
        gmail_client_id: Some("client-id".to_string()),
        gmail_client_secret: Some("client-secret".to_string()),
        gmail_refresh_token: Some("refresh-token".to_string()),
        gmail_token_url: format!("{}/token", server.uri()),
        gmail_api_base: server.uri(),
        lead_notify_to: Some("vendas@fortxavier.com.br".to_string()),
        lead_reply_to: None,
    }
}

fn lead() -> LeadEmail {
    LeadEmail {
        nome_lead: "Maria Silva".to_string(),
        email_lead: "maria@example.com".to_string(),
        telefone_lead: Some("(11) 99999-0000".to_string()),
        mensagem: Some("Quero agendar uma visita".to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn lead_notification_refreshes_token_and_sends() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=refresh-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "ya29.test",
            "expires_in": 3599,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/gmail/v1/users/me/messages/send"))
        .and(header("authorization", "Bearer ya29.test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "18c2f0a1b2c3d4e5",
            "threadId": "18c2f0a1b2c3d4e5"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mailer = GmailMailer::from_config(&mail_config(&server)).unwrap();
    let message_id = mailer.send_lead_notification(&lead()).await.unwrap();

    assert_eq!(message_id, "18c2f0a1b2c3d4e5");
}

#[tokio::test]
async fn rejected_refresh_token_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant"
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/gmail/v1/users/me/messages/send"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "never" })))
        .expect(0)
        .mount(&server)
        .await;

    let mailer = GmailMailer::from_config(&mail_config(&server)).unwrap();
    let err = mailer.send_lead_notification(&lead()).await.unwrap_err();

    match err {
        MailError::TokenRefresh(message) => assert!(message.contains("invalid_grant")),
        other => panic!("expected token refresh error, got {other:?}"),
    }
}

#[tokio::test]
async fn gmail_rejection_is_a_send_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access_token": "ya29.test" })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/gmail/v1/users/me/messages/send"))
        .respond_with(ResponseTemplate::new(403).set_body_string("insufficient scope"))
        .mount(&server)
        .await;

    let mailer = GmailMailer::from_config(&mail_config(&server)).unwrap();
    let err = mailer.send_lead_notification(&lead()).await.unwrap_err();

    assert!(matches!(err, MailError::Send(message) if message.contains("insufficient scope")));
}
