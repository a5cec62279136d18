use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageDirection {
    Inbound,
    Outbound,
}

impl MessageDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inbound => "INBOUND",
            Self::Outbound => "OUTBOUND",
        }
    }

    pub fn parse(value: &str) -> Self {
        if value == "INBOUND" {
            Self::Inbound
        } else {
            Self::Outbound
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageStatus {
    Sent,
    Failed,
    Received,
}

impl MessageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sent => "SENT",
            Self::Failed => "FAILED",
            Self::Received => "RECEIVED",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhatsappContact {
    pub id: i32,
    pub user_id: i32,
    pub phone: String,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhatsappConversation {
    pub id: i32,
    pub user_id: i32,
    pub contact_id: i32,
    pub label: Option<String>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ConversationWithContact {
    pub conversation: WhatsappConversation,
    pub contact: WhatsappContact,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhatsappMessage {
    pub id: i32,
    pub conversation_id: i32,
    pub user_id: i32,
    pub direction: MessageDirection,
    pub status: String,
    pub body: String,
    pub whatsapp_message_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewWhatsappMessage {
    pub direction: MessageDirection,
    pub status: MessageStatus,
    pub body: String,
    pub whatsapp_message_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Digits only; the Cloud API expects E.164 without the plus sign.
pub fn normalize_phone(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// First message of a Cloud API webhook delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    pub from_phone: String,
    pub profile_name: Option<String>,
    pub text: String,
    pub whatsapp_message_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl InboundMessage {
    /// `None` when the delivery carries no message (status callbacks and
    /// malformed payloads).
    pub fn from_webhook(payload: &Value, now: DateTime<Utc>) -> Option<Self> {
        let value = payload
            .pointer("/entry/0/changes/0/value")
            .filter(|v| v.is_object())?;
        let msg = value.pointer("/messages/0")?;
        let contact = value.pointer("/contacts/0")?;

        let from = msg
            .get("from")
            .and_then(Value::as_str)
            .or_else(|| contact.get("wa_id").and_then(Value::as_str))
            .unwrap_or_default();

        // Meta sends the epoch seconds as a string.
        let timestamp = msg
            .get("timestamp")
            .and_then(|t| match t {
                Value::String(s) => s.parse::<i64>().ok(),
                other => other.as_i64(),
            })
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
            .unwrap_or(now);

        Some(Self {
            from_phone: normalize_phone(from),
            profile_name: contact
                .pointer("/profile/name")
                .and_then(Value::as_str)
                .map(str::to_string),
            text: msg
                .pointer("/text/body")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            whatsapp_message_id: msg.get("id").and_then(Value::as_str).map(str::to_string),
            timestamp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalizes_phone_numbers() {
        assert_eq!(normalize_phone("+55 (11) 98888-7777"), "5511988887777");
        assert_eq!(normalize_phone("abc"), "");
    }

    #[test]
    fn parses_text_webhook() {
        let payload = json!({
            "entry": [{"changes": [{"value": {
                "contacts": [{"wa_id": "5511999", "profile": {"name": "Maria"}}],
                "messages": [{"from": "5511999", "id": "wamid.1", "timestamp": "1700000000", "text": {"body": "Olá"}}]
            }}]}]
        });
        let msg = InboundMessage::from_webhook(&payload, Utc::now()).unwrap();
        assert_eq!(msg.from_phone, "5511999");
        assert_eq!(msg.profile_name.as_deref(), Some("Maria"));
        assert_eq!(msg.text, "Olá");
        assert_eq!(msg.timestamp.timestamp(), 1_700_000_000);
    }

    #[test]
    fn ignores_status_callbacks() {
        let payload = json!({"entry": [{"changes": [{"value": {"statuses": [{"id": "x"}]}}]}]});
        assert!(InboundMessage::from_webhook(&payload, Utc::now()).is_none());
        assert!(InboundMessage::from_webhook(&json!({}), Utc::now()).is_none());
    }
}
