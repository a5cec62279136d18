use async_trait::async_trait;

use super::{
    ConversationWithContact, NewWhatsappMessage, WhatsappContact, WhatsappConversation,
    WhatsappMessage,
};
use crate::domain::DomainResult;

#[async_trait]
pub trait WhatsappRepository: Send + Sync {
    /// `phone` must already be normalized.
    async fn get_or_create_contact(
        &self,
        user_id: i32,
        phone: &str,
        name: Option<&str>,
    ) -> DomainResult<WhatsappContact>;

    async fn get_or_create_conversation(
        &self,
        user_id: i32,
        contact_id: i32,
    ) -> DomainResult<WhatsappConversation>;

    /// Stores the message and moves the conversation's `last_message_at`.
    async fn record_message(
        &self,
        user_id: i32,
        conversation_id: i32,
        message: NewWhatsappMessage,
    ) -> DomainResult<WhatsappMessage>;

    /// Most recently updated first.
    async fn list_contacts(&self, user_id: i32) -> DomainResult<Vec<WhatsappContact>>;

    /// Most recent activity first.
    async fn list_conversations(&self, user_id: i32) -> DomainResult<Vec<ConversationWithContact>>;

    async fn find_conversation(&self, user_id: i32, id: i32) -> DomainResult<Option<WhatsappConversation>>;

    /// Chronological.
    async fn list_messages(&self, user_id: i32, conversation_id: i32) -> DomainResult<Vec<WhatsappMessage>>;
}
