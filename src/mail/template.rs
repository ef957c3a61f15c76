//! Notification content and RFC 5322 message assembly.

use base64::{Engine as _, engine::general_purpose};
use chrono::{DateTime, FixedOffset, Utc};

use super::LeadEmail;

pub const SUBJECT: &str = "🎉 Novo Lead Recebido - Creative Imob";
pub const SENDER_NAME: &str = "Creative Imob - Sistema de Leads";

const UTC_MINUS_3_SECONDS: i32 = 3 * 3600;

pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// `dd/mm/yyyy hh:mm` in Brasília time.
pub fn format_brasilia(at: DateTime<Utc>) -> String {
    match FixedOffset::west_opt(UTC_MINUS_3_SECONDS) {
        Some(offset) => at.with_timezone(&offset).format("%d/%m/%Y %H:%M").to_string(),
        None => at.format("%d/%m/%Y %H:%M").to_string(),
    }
}

fn info_item(label: &str, value: &str) -> String {
    format!(
        "<div class=\"info-item\"><span class=\"label\">{label}:</span> {}</div>\n",
        escape_html(value)
    )
}

pub fn render_lead_html(lead: &LeadEmail, received_at: DateTime<Utc>) -> String {
    let mut items = String::new();
    items.push_str(&info_item("👤 Nome", &lead.nome_lead));
    items.push_str(&info_item("📧 Email", &lead.email_lead));
    if let Some(ref telefone) = lead.telefone_lead {
        items.push_str(&info_item("📱 Telefone", telefone));
    }
    if let Some(ref assunto) = lead.assunto {
        items.push_str(&info_item("📋 Assunto", assunto));
    }
    if let Some(ref mensagem) = lead.mensagem {
        let body = escape_html(mensagem).replace("\r\n", "\n").replace('\n', "<br>");
        items.push_str(&format!(
            "<div class=\"info-item\"><span class=\"label\">💬 Mensagem:</span><br>\
             <div class=\"message\">{body}</div></div>\n"
        ));
    }
    if let Some(ref pagina) = lead.pagina_origem {
        items.push_str(&info_item("🌐 Página de Origem", pagina));
    }
    if let Some(ref imovel_id) = lead.imovel_id {
        items.push_str(&info_item("🏠 ID do Imóvel", imovel_id));
    }
    items.push_str(&info_item("⏰ Data/Hora", &format_brasilia(received_at)));

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<style>
body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; }}
.container {{ max-width: 600px; margin: 0 auto; padding: 20px; }}
.header {{ background-color: #2563eb; color: white; padding: 20px; border-radius: 8px 8px 0 0; }}
.content {{ background-color: #f8fafc; padding: 20px; border-radius: 0 0 8px 8px; }}
.info-item {{ margin: 10px 0; padding: 10px; background-color: white; border-radius: 4px; }}
.label {{ font-weight: bold; color: #1e40af; }}
.message {{ margin-top: 8px; padding: 10px; background-color: #f1f5f9; border-left: 4px solid #2563eb; }}
.footer {{ margin-top: 20px; padding: 15px; background-color: #e2e8f0; border-radius: 4px; font-size: 12px; color: #64748b; }}
</style>
</head>
<body>
<div class="container">
<div class="header">
<h1>🎉 Novo Lead Recebido!</h1>
<p>Um novo lead acabou de chegar pelo site Fort Xavier</p>
</div>
<div class="content">
{items}</div>
<div class="footer">
<p><strong>Creative Imob - Sistema de Notificação Automática</strong></p>
<p>Este e-mail foi gerado automaticamente pelo sistema de leads do site.</p>
</div>
</div>
</body>
</html>
"#
    )
}

/// RFC 2047 encoded-word for non-ASCII header values.
fn encode_header(value: &str) -> String {
    if value.is_ascii() {
        value.to_string()
    } else {
        format!(
            "=?UTF-8?B?{}?=",
            general_purpose::STANDARD.encode(value.as_bytes())
        )
    }
}

/// Headers and addresses of one outgoing message.
#[derive(Debug, Clone)]
pub struct Envelope<'a> {
    pub from_address: &'a str,
    pub to: &'a str,
    pub reply_to: Option<&'a str>,
}

/// Assembles a single-part HTML message with CRLF line endings.
pub fn build_raw_message(envelope: &Envelope<'_>, subject: &str, html: &str) -> String {
    let mut message = String::new();
    message.push_str(&format!(
        "From: \"{SENDER_NAME}\" <{}>\r\n",
        envelope.from_address
    ));
    message.push_str(&format!("To: {}\r\n", envelope.to));
    if let Some(reply_to) = envelope.reply_to {
        message.push_str(&format!("Reply-To: {reply_to}\r\n"));
    }
    message.push_str(&format!("Subject: {}\r\n", encode_header(subject)));
    message.push_str("MIME-Version: 1.0\r\n");
    message.push_str("Content-Type: text/html; charset=UTF-8\r\n");
    message.push_str("Content-Transfer-Encoding: base64\r\n");
    message.push_str("\r\n");
    message.push_str(&general_purpose::STANDARD.encode(html.as_bytes()));
    message.push_str("\r\n");
    message
}
