//! Gmail API sender authenticated with an OAuth2 refresh token.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::template::{self, Envelope};
use super::{LeadEmail, MailError, Mailer};
use crate::config::MailConfig;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    id: String,
}

pub struct GmailMailer {
    http_client: Client,
    sender: String,
    client_id: String,
    client_secret: String,
    refresh_token: String,
    notify_to: String,
    reply_to: Option<String>,
    token_url: String,
    api_base: String,
}

impl std::fmt::Debug for GmailMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GmailMailer")
            .field("sender", &self.sender)
            .field("notify_to", &self.notify_to)
            .field("token_url", &self.token_url)
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

impl GmailMailer {
    pub fn from_config(config: &MailConfig) -> Result<Self, MailError> {
        let missing = config.missing_vars();
        if !missing.is_empty() {
            return Err(MailError::MissingSettings(missing));
        }

        let required = |value: &Option<String>| value.clone().unwrap_or_default();

        let http_client = Client::builder()
            .timeout(Duration::from_secs(20))
            .build()
            .map_err(|e| MailError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            sender: required(&config.gmail_email),
            client_id: required(&config.gmail_client_id),
            client_secret: required(&config.gmail_client_secret),
            refresh_token: required(&config.gmail_refresh_token),
            notify_to: required(&config.lead_notify_to),
            reply_to: config.lead_reply_to.clone().filter(|v| !v.is_empty()),
            token_url: config.gmail_token_url.clone(),
            api_base: config.gmail_api_base.trim_end_matches('/').to_string(),
        })
    }

    async fn access_token(&self) -> Result<String, MailError> {
        let mut params = HashMap::new();
        params.insert("client_id", self.client_id.as_str());
        params.insert("client_secret", self.client_secret.as_str());
        params.insert("refresh_token", self.refresh_token.as_str());
        params.insert("grant_type", "refresh_token");

        let response = self
            .http_client
            .post(&self.token_url)
            .header("Accept", "application/json")
            .form(&params)
            .send()
            .await
            .map_err(|e| MailError::Network(format!("token request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(MailError::TokenRefresh(format!(
                "status {}: {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| MailError::InvalidResponse(format!("token response: {e}")))?;
        Ok(token.access_token)
    }

    /// Sends a raw RFC 5322 message and returns its Gmail id.
    pub async fn send_raw(&self, raw: &str) -> Result<String, MailError> {
        let access_token = self.access_token().await?;
        let url = format!("{}/gmail/v1/users/me/messages/send", self.api_base);

        let response = self
            .http_client
            .post(url)
            .bearer_auth(access_token)
            .json(&json!({ "raw": base64_url::encode(raw.as_bytes()) }))
            .send()
            .await
            .map_err(|e| MailError::Network(format!("send request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(MailError::Send(format!(
                "status {}: {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        let sent: SendResponse = response
            .json()
            .await
            .map_err(|e| MailError::InvalidResponse(format!("send response: {e}")))?;
        Ok(sent.id)
    }
}

#[async_trait]
impl Mailer for GmailMailer {
    async fn send_lead_notification(&self, lead: &LeadEmail) -> Result<String, MailError> {
        let html = template::render_lead_html(lead, Utc::now());
        let envelope = Envelope {
            from_address: &self.sender,
            to: &self.notify_to,
            reply_to: self.reply_to.as_deref(),
        };
        let raw = template::build_raw_message(&envelope, template::SUBJECT, &html);

        let message_id = self.send_raw(&raw).await?;
        tracing::info!(message_id = %message_id, to = %self.notify_to, "Lead notification sent");
        Ok(message_id)
    }
}
