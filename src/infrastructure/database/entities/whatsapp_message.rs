//! WhatsApp message entity for database

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "whatsapp_messages")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub conversation_id: i32,
    pub user_id: i32,
    /// INBOUND | OUTBOUND
    pub direction: String,
    /// SENT | FAILED | RECEIVED
    pub status: String,
    #[sea_orm(column_type = "Text")]
    pub body: String,
    pub whatsapp_message_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::whatsapp_conversation::Entity",
        from = "Column::ConversationId",
        to = "super::whatsapp_conversation::Column::Id",
        on_delete = "Cascade"
    )]
    Conversation,
}

impl Related<super::whatsapp_conversation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Conversation.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
