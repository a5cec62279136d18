//! WhatsApp messaging: outbound sends, webhook intake and conversation log

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::config::WhatsappConfig;
use crate::domain::ports::{MessagingGateway, OutboundMessage};
use crate::domain::whatsapp::{
    normalize_phone, ConversationWithContact, InboundMessage, MessageDirection, MessageStatus,
    NewWhatsappMessage, WhatsappContact, WhatsappMessage,
};
use crate::domain::{DomainError, DomainResult, RepositoryProvider};

pub const TEST_MESSAGE: &str = "Teste ImobiContract via WhatsApp Cloud API";
const HELLO_WORLD: &str = "hello_world";
const HELLO_WORLD_BODY: &str = "hello_world template";

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WhatsappHealth {
    pub ok: bool,
    pub configured: bool,
    pub missing: Vec<&'static str>,
}

pub struct WhatsappService {
    repos: Arc<dyn RepositoryProvider>,
    gateway: Arc<dyn MessagingGateway>,
    config: WhatsappConfig,
}

impl WhatsappService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, gateway: Arc<dyn MessagingGateway>, config: WhatsappConfig) -> Self {
        Self { repos, gateway, config }
    }

    pub fn health(&self) -> WhatsappHealth {
        let missing = self.gateway.missing_config();
        WhatsappHealth {
            ok: true,
            configured: missing.is_empty(),
            missing,
        }
    }

    /// Returns the challenge when Meta's subscription handshake matches
    /// the configured verify token.
    pub fn verify_webhook(&self, mode: Option<&str>, token: Option<&str>, challenge: Option<&str>) -> Option<String> {
        let expected = self.config.webhook_verify_token.as_str();
        match (mode, token) {
            (Some("subscribe"), Some(token)) if !expected.is_empty() && token == expected => {
                Some(challenge.unwrap_or_default().to_string())
            }
            _ => None,
        }
    }

    pub async fn send_text(&self, user_id: i32, to: &str, text: &str) -> DomainResult<WhatsappMessage> {
        let phone = normalize_phone(to);
        if phone.is_empty() || text.trim().is_empty() {
            return Err(DomainError::invalid(
                "INVALID_INPUT",
                "Telefone e texto são obrigatórios para envio.",
            ));
        }
        let message = OutboundMessage::Text {
            to: phone.clone(),
            body: text.to_string(),
        };
        self.deliver(user_id, &phone, message, text).await
    }

    pub async fn send_hello_world_template(&self, user_id: i32, to: &str) -> DomainResult<WhatsappMessage> {
        let phone = normalize_phone(to);
        if phone.is_empty() {
            return Err(DomainError::invalid("INVALID_INPUT", "Telefone inválido."));
        }
        let message = OutboundMessage::Template {
            to: phone.clone(),
            name: HELLO_WORLD.to_string(),
            language: "en_US".to_string(),
        };
        self.deliver(user_id, &phone, message, HELLO_WORLD_BODY).await
    }

    fn test_recipient(&self) -> DomainResult<String> {
        self.config
            .test_to
            .clone()
            .filter(|to| !to.trim().is_empty())
            .ok_or_else(|| DomainError::invalid("WHATSAPP_TEST_TO_MISSING", "WHATSAPP_TEST_TO não configurado."))
    }

    pub async fn send_test(&self, user_id: i32) -> DomainResult<WhatsappMessage> {
        let to = self.test_recipient()?;
        self.send_text(user_id, &to, TEST_MESSAGE).await
    }

    pub async fn send_test_template(&self, user_id: i32) -> DomainResult<WhatsappMessage> {
        let to = self.test_recipient()?;
        self.send_hello_world_template(user_id, &to).await
    }

    /// Every attempt is logged; failures are stored as FAILED before the
    /// error is returned.
    async fn deliver(
        &self,
        user_id: i32,
        phone: &str,
        message: OutboundMessage,
        body: &str,
    ) -> DomainResult<WhatsappMessage> {
        let repo = self.repos.whatsapp();
        let contact = repo.get_or_create_contact(user_id, phone, None).await?;
        let conversation = repo.get_or_create_conversation(user_id, contact.id).await?;

        let outcome = self.gateway.send(message).await;
        let (status, wamid) = match &outcome {
            Ok(id) => (MessageStatus::Sent, Some(id.clone())),
            Err(err) => {
                warn!(user_id, phone, error = %err, "WhatsApp send failed");
                (MessageStatus::Failed, None)
            }
        };
        let stored = repo
            .record_message(
                user_id,
                conversation.id,
                NewWhatsappMessage {
                    direction: MessageDirection::Outbound,
                    status,
                    body: body.to_string(),
                    whatsapp_message_id: wamid,
                    timestamp: Utc::now(),
                },
            )
            .await?;

        outcome.map(|_| stored)
    }

    /// Stores the first message of a delivery for the inbound account.
    /// Deliveries without a message are ignored.
    pub async fn handle_webhook(&self, payload: &Value) -> DomainResult<Option<WhatsappMessage>> {
        let Some(inbound) = InboundMessage::from_webhook(payload, Utc::now()) else {
            warn!("WhatsApp webhook without a usable message");
            return Ok(None);
        };
        let user_id = self.config.inbound_user_id;
        let repo = self.repos.whatsapp();
        let contact = repo
            .get_or_create_contact(user_id, &inbound.from_phone, inbound.profile_name.as_deref())
            .await?;
        let conversation = repo.get_or_create_conversation(user_id, contact.id).await?;
        let stored = repo
            .record_message(
                user_id,
                conversation.id,
                NewWhatsappMessage {
                    direction: MessageDirection::Inbound,
                    status: MessageStatus::Received,
                    body: inbound.text,
                    whatsapp_message_id: inbound.whatsapp_message_id,
                    timestamp: inbound.timestamp,
                },
            )
            .await?;
        info!(user_id, conversation_id = conversation.id, "WhatsApp message received");
        Ok(Some(stored))
    }

    pub async fn contacts(&self, user_id: i32) -> DomainResult<Vec<WhatsappContact>> {
        self.repos.whatsapp().list_contacts(user_id).await
    }

    pub async fn conversations(&self, user_id: i32) -> DomainResult<Vec<ConversationWithContact>> {
        self.repos.whatsapp().list_conversations(user_id).await
    }

    pub async fn messages(&self, user_id: i32, conversation_id: i32) -> DomainResult<Vec<WhatsappMessage>> {
        let repo = self.repos.whatsapp();
        if repo.find_conversation(user_id, conversation_id).await?.is_none() {
            return Err(DomainError::not_found("Conversation", "id", conversation_id));
        }
        repo.list_messages(user_id, conversation_id).await
    }
}
