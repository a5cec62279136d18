//! SeaORM implementation of WhatsappRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use sea_orm::sea_query::Expr;
use tracing::debug;

use crate::domain::whatsapp::{
    ConversationWithContact, MessageDirection, NewWhatsappMessage, WhatsappContact,
    WhatsappConversation, WhatsappMessage, WhatsappRepository,
};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::{
    whatsapp_contact, whatsapp_conversation, whatsapp_message,
};

pub struct SeaOrmWhatsappRepository {
    db: DatabaseConnection,
}

impl SeaOrmWhatsappRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn contact_to_domain(m: whatsapp_contact::Model) -> WhatsappContact {
    WhatsappContact {
        id: m.id,
        user_id: m.user_id,
        phone: m.phone,
        name: m.name,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

fn conversation_to_domain(m: whatsapp_conversation::Model) -> WhatsappConversation {
    WhatsappConversation {
        id: m.id,
        user_id: m.user_id,
        contact_id: m.contact_id,
        label: m.label,
        last_message_at: m.last_message_at,
        created_at: m.created_at,
    }
}

fn message_to_domain(m: whatsapp_message::Model) -> WhatsappMessage {
    WhatsappMessage {
        id: m.id,
        conversation_id: m.conversation_id,
        user_id: m.user_id,
        direction: MessageDirection::parse(&m.direction),
        status: m.status,
        body: m.body,
        whatsapp_message_id: m.whatsapp_message_id,
        timestamp: m.timestamp,
        created_at: m.created_at,
    }
}

fn db_err(e: sea_orm::DbErr) -> DomainError {
    DomainError::Database(e.to_string())
}

// ── WhatsappRepository impl ─────────────────────────────────────

#[async_trait]
impl WhatsappRepository for SeaOrmWhatsappRepository {
    async fn get_or_create_contact(
        &self,
        user_id: i32,
        phone: &str,
        name: Option<&str>,
    ) -> DomainResult<WhatsappContact> {
        let existing = whatsapp_contact::Entity::find()
            .filter(whatsapp_contact::Column::UserId.eq(user_id))
            .filter(whatsapp_contact::Column::Phone.eq(phone))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        let now = Utc::now();
        match existing {
            // A profile name from an inbound message refreshes a stale one.
            Some(contact) if name.is_some() && contact.name.as_deref() != name => {
                let mut active: whatsapp_contact::ActiveModel = contact.into();
                active.name = Set(name.map(str::to_string));
                active.updated_at = Set(now);
                let updated = active.update(&self.db).await.map_err(db_err)?;
                Ok(contact_to_domain(updated))
            }
            Some(contact) => Ok(contact_to_domain(contact)),
            None => {
                let created = whatsapp_contact::ActiveModel {
                    user_id: Set(user_id),
                    phone: Set(phone.to_string()),
                    name: Set(name.map(str::to_string)),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .insert(&self.db)
                .await
                .map_err(db_err)?;
                debug!(user_id, phone, "WhatsApp contact created");
                Ok(contact_to_domain(created))
            }
        }
    }

    async fn get_or_create_conversation(
        &self,
        user_id: i32,
        contact_id: i32,
    ) -> DomainResult<WhatsappConversation> {
        let existing = whatsapp_conversation::Entity::find()
            .filter(whatsapp_conversation::Column::UserId.eq(user_id))
            .filter(whatsapp_conversation::Column::ContactId.eq(contact_id))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        if let Some(conversation) = existing {
            return Ok(conversation_to_domain(conversation));
        }

        let created = whatsapp_conversation::ActiveModel {
            user_id: Set(user_id),
            contact_id: Set(contact_id),
            label: Set(None),
            last_message_at: Set(None),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(db_err)?;
        Ok(conversation_to_domain(created))
    }

    async fn record_message(
        &self,
        user_id: i32,
        conversation_id: i32,
        message: NewWhatsappMessage,
    ) -> DomainResult<WhatsappMessage> {
        let created = whatsapp_message::ActiveModel {
            conversation_id: Set(conversation_id),
            user_id: Set(user_id),
            direction: Set(message.direction.as_str().to_string()),
            status: Set(message.status.as_str().to_string()),
            body: Set(message.body),
            whatsapp_message_id: Set(message.whatsapp_message_id),
            timestamp: Set(message.timestamp),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(db_err)?;

        whatsapp_conversation::Entity::update_many()
            .col_expr(
                whatsapp_conversation::Column::LastMessageAt,
                Expr::value(Some(message.timestamp)),
            )
            .filter(whatsapp_conversation::Column::Id.eq(conversation_id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        Ok(message_to_domain(created))
    }

    async fn list_contacts(&self, user_id: i32) -> DomainResult<Vec<WhatsappContact>> {
        let models = whatsapp_contact::Entity::find()
            .filter(whatsapp_contact::Column::UserId.eq(user_id))
            .order_by_desc(whatsapp_contact::Column::UpdatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(contact_to_domain).collect())
    }

    async fn list_conversations(&self, user_id: i32) -> DomainResult<Vec<ConversationWithContact>> {
        let rows = whatsapp_conversation::Entity::find()
            .filter(whatsapp_conversation::Column::UserId.eq(user_id))
            .find_also_related(whatsapp_contact::Entity)
            .order_by_desc(whatsapp_conversation::Column::LastMessageAt)
            .order_by_desc(whatsapp_conversation::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(rows
            .into_iter()
            .filter_map(|(conversation, contact)| {
                Some(ConversationWithContact {
                    conversation: conversation_to_domain(conversation),
                    contact: contact_to_domain(contact?),
                })
            })
            .collect())
    }

    async fn find_conversation(&self, user_id: i32, id: i32) -> DomainResult<Option<WhatsappConversation>> {
        let model = whatsapp_conversation::Entity::find_by_id(id)
            .filter(whatsapp_conversation::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(conversation_to_domain))
    }

    async fn list_messages(&self, user_id: i32, conversation_id: i32) -> DomainResult<Vec<WhatsappMessage>> {
        let models = whatsapp_message::Entity::find()
            .filter(whatsapp_message::Column::UserId.eq(user_id))
            .filter(whatsapp_message::Column::ConversationId.eq(conversation_id))
            .order_by_asc(whatsapp_message::Column::Timestamp)
            .order_by_asc(whatsapp_message::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(message_to_domain).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::PlanType;
    use crate::domain::whatsapp::MessageStatus;
    use crate::infrastructure::database::testing::{seed_user, setup_db};
    use chrono::Duration;

    #[tokio::test]
    async fn contact_and_conversation_are_reused() {
        let db = setup_db().await;
        let user_id = seed_user(&db, "wa@imobi.test", PlanType::Starter).await;
        let repo = SeaOrmWhatsappRepository::new(db);

        let first = repo.get_or_create_contact(user_id, "5511999990000", None).await.unwrap();
        let named = repo
            .get_or_create_contact(user_id, "5511999990000", Some("Joana"))
            .await
            .unwrap();
        assert_eq!(first.id, named.id);
        assert_eq!(named.name.as_deref(), Some("Joana"));

        let c1 = repo.get_or_create_conversation(user_id, first.id).await.unwrap();
        let c2 = repo.get_or_create_conversation(user_id, first.id).await.unwrap();
        assert_eq!(c1.id, c2.id);
    }

    #[tokio::test]
    async fn messages_are_chronological_and_touch_conversation() {
        let db = setup_db().await;
        let user_id = seed_user(&db, "wb@imobi.test", PlanType::Starter).await;
        let repo = SeaOrmWhatsappRepository::new(db);

        let contact = repo.get_or_create_contact(user_id, "5521988887777", None).await.unwrap();
        let conversation = repo.get_or_create_conversation(user_id, contact.id).await.unwrap();
        let now = Utc::now();

        for (body, offset) in [("segunda", 0), ("primeira", -60)] {
            repo.record_message(
                user_id,
                conversation.id,
                NewWhatsappMessage {
                    direction: MessageDirection::Outbound,
                    status: MessageStatus::Sent,
                    body: body.into(),
                    whatsapp_message_id: None,
                    timestamp: now + Duration::seconds(offset),
                },
            )
            .await
            .unwrap();
        }

        let messages = repo.list_messages(user_id, conversation.id).await.unwrap();
        let bodies: Vec<_> = messages.iter().map(|m| m.body.as_str()).collect();
        assert_eq!(bodies, vec!["primeira", "segunda"]);

        let listed = repo.list_conversations(user_id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(listed[0].conversation.last_message_at.is_some());
        assert_eq!(listed[0].contact.phone, "5521988887777");
    }
}
