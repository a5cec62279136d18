//! WhatsApp Cloud API client
//!
//! `POST {base}/{phone_number_id}/messages` with a Bearer token. The provider
//! message id is read from `messages[0].id`.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::warn;

use crate::config::WhatsappConfig;
use crate::domain::ports::{MessagingGateway, OutboundMessage};
use crate::domain::{DomainError, DomainResult};

pub struct WhatsappCloudClient {
    http: reqwest::Client,
    config: WhatsappConfig,
}

impl WhatsappCloudClient {
    pub fn new(config: WhatsappConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_default();
        Self { http, config }
    }
}

pub fn message_payload(message: &OutboundMessage) -> Value {
    match message {
        OutboundMessage::Text { to, body } => json!({
            "messaging_product": "whatsapp",
            "to": to,
            "type": "text",
            "text": { "body": body },
        }),
        OutboundMessage::Template { to, name, language } => json!({
            "messaging_product": "whatsapp",
            "to": to,
            "type": "template",
            "template": { "name": name, "language": { "code": language } },
        }),
    }
}

/// Most specific error text available in a failed reply.
pub fn error_detail(status: u16, body: &Value, raw: &str) -> String {
    body.pointer("/error/error_data/details")
        .and_then(Value::as_str)
        .or_else(|| body.pointer("/error/message").and_then(Value::as_str))
        .map(str::to_string)
        .or_else(|| (!raw.trim().is_empty()).then(|| raw.trim().to_string()))
        .unwrap_or_else(|| format!("HTTP {status}"))
}

fn send_failed(message: impl Into<String>) -> DomainError {
    DomainError::Integration {
        code: "WHATSAPP_SEND_FAILED",
        message: message.into(),
    }
}

#[async_trait]
impl MessagingGateway for WhatsappCloudClient {
    fn missing_config(&self) -> Vec<&'static str> {
        self.config.missing()
    }

    fn is_configured(&self) -> bool {
        self.config.can_send()
    }

    async fn send(&self, message: OutboundMessage) -> DomainResult<String> {
        if !self.is_configured() {
            return Err(DomainError::NotConfigured {
                code: "WHATSAPP_NOT_CONFIGURED",
                message: "WhatsApp não configurado. Preencha as variáveis do .env.".into(),
            });
        }

        let url = format!(
            "{}/{}/messages",
            self.config.base_url.trim_end_matches('/'),
            self.config.phone_number_id.trim()
        );
        let response = self
            .http
            .post(&url)
            .bearer_auth(self.config.api_token.trim())
            .json(&message_payload(&message))
            .send()
            .await
            .map_err(|e| send_failed(e.to_string()))?;

        let status = response.status();
        let raw = response.text().await.unwrap_or_default();
        let body: Value = serde_json::from_str(&raw).unwrap_or(Value::Null);

        if !status.is_success() || body.get("error").is_some() {
            let detail = error_detail(status.as_u16(), &body, &raw);
            warn!(status = status.as_u16(), %detail, "WhatsApp send failed");
            return Err(send_failed(detail));
        }

        body.pointer("/messages/0/id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| send_failed("Resposta do WhatsApp sem messages[0].id"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_and_template_payloads() {
        let text = message_payload(&OutboundMessage::Text {
            to: "5511999998888".into(),
            body: "Olá".into(),
        });
        assert_eq!(text["type"], "text");
        assert_eq!(text["text"]["body"], "Olá");

        let template = message_payload(&OutboundMessage::Template {
            to: "5511999998888".into(),
            name: "hello_world".into(),
            language: "en_US".into(),
        });
        assert_eq!(template["template"]["language"]["code"], "en_US");
    }

    #[test]
    fn error_detail_prefers_details() {
        let body = json!({ "error": { "message": "generic", "error_data": { "details": "número inválido" } } });
        assert_eq!(error_detail(400, &body, ""), "número inválido");
        assert_eq!(error_detail(500, &Value::Null, ""), "HTTP 500");
        assert_eq!(error_detail(502, &Value::Null, "Bad gateway"), "Bad gateway");
    }

    #[tokio::test]
    async fn refuses_to_send_without_credentials() {
        let client = WhatsappCloudClient::new(WhatsappConfig::default());
        let err = client
            .send(OutboundMessage::Text {
                to: "5511999998888".into(),
                body: "x".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotConfigured { code: "WHATSAPP_NOT_CONFIGURED", .. }));
        assert_eq!(client.missing_config().len(), 4);
    }
}
