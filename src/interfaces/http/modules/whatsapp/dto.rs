use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::whatsapp::{
    ConversationWithContact, MessageDirection, WhatsappContact, WhatsappMessage,
};

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct SendMessageRequest {
    pub to: Option<String>,
    pub text: Option<String>,
}

/// `{ok: true}` on delivery, `{ok: false, error}` when the Cloud API refused it.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendResult {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SendResult {
    pub fn sent(message: &WhatsappMessage) -> Self {
        Self {
            ok: true,
            message_id: message.whatsapp_message_id.clone(),
            error: None,
        }
    }

    pub fn failed(error: String) -> Self {
        Self {
            ok: false,
            message_id: None,
            error: Some(error),
        }
    }
}

/// Meta's subscription handshake parameters.
#[derive(Debug, Deserialize, IntoParams)]
pub struct VerifyQuery {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReceivedResponse {
    pub received: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactDto {
    pub id: i32,
    pub phone: String,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<WhatsappContact> for ContactDto {
    fn from(c: WhatsappContact) -> Self {
        Self {
            id: c.id,
            phone: c.phone,
            name: c.name,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConversationDto {
    pub id: i32,
    pub label: Option<String>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub contact: ContactDto,
}

impl From<ConversationWithContact> for ConversationDto {
    fn from(c: ConversationWithContact) -> Self {
        Self {
            id: c.conversation.id,
            label: c.conversation.label,
            last_message_at: c.conversation.last_message_at,
            created_at: c.conversation.created_at,
            contact: c.contact.into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageDto {
    pub id: i32,
    pub conversation_id: i32,
    pub direction: MessageDirection,
    pub status: String,
    pub body: String,
    pub whatsapp_message_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl From<WhatsappMessage> for MessageDto {
    fn from(m: WhatsappMessage) -> Self {
        Self {
            id: m.id,
            conversation_id: m.conversation_id,
            direction: m.direction,
            status: m.status,
            body: m.body,
            whatsapp_message_id: m.whatsapp_message_id,
            timestamp: m.timestamp,
        }
    }
}
