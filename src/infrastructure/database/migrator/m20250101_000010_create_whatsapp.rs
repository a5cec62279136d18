//! Create whatsapp_contacts, whatsapp_conversations and whatsapp_messages tables

use sea_orm_migration::prelude::*;

use super::m20250101_000001_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(WhatsappContacts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WhatsappContacts::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(WhatsappContacts::UserId).integer().not_null())
                    .col(ColumnDef::new(WhatsappContacts::Phone).string_len(32).not_null())
                    .col(ColumnDef::new(WhatsappContacts::Name).string().null())
                    .col(
                        ColumnDef::new(WhatsappContacts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WhatsappContacts::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_whatsapp_contacts_user")
                            .from(WhatsappContacts::Table, WhatsappContacts::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_whatsapp_contacts_user_phone")
                    .table(WhatsappContacts::Table)
                    .col(WhatsappContacts::UserId)
                    .col(WhatsappContacts::Phone)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(WhatsappConversations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WhatsappConversations::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(WhatsappConversations::UserId).integer().not_null())
                    .col(ColumnDef::new(WhatsappConversations::ContactId).integer().not_null())
                    .col(ColumnDef::new(WhatsappConversations::Label).string().null())
                    .col(
                        ColumnDef::new(WhatsappConversations::LastMessageAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(WhatsappConversations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_whatsapp_conversations_contact")
                            .from(WhatsappConversations::Table, WhatsappConversations::ContactId)
                            .to(WhatsappContacts::Table, WhatsappContacts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_whatsapp_conversations_user_contact")
                    .table(WhatsappConversations::Table)
                    .col(WhatsappConversations::UserId)
                    .col(WhatsappConversations::ContactId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(WhatsappMessages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WhatsappMessages::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(WhatsappMessages::ConversationId).integer().not_null())
                    .col(ColumnDef::new(WhatsappMessages::UserId).integer().not_null())
                    .col(ColumnDef::new(WhatsappMessages::Direction).string_len(20).not_null())
                    .col(ColumnDef::new(WhatsappMessages::Status).string_len(20).not_null())
                    .col(ColumnDef::new(WhatsappMessages::Body).text().not_null())
                    .col(ColumnDef::new(WhatsappMessages::WhatsappMessageId).string().null())
                    .col(
                        ColumnDef::new(WhatsappMessages::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WhatsappMessages::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_whatsapp_messages_conversation")
                            .from(WhatsappMessages::Table, WhatsappMessages::ConversationId)
                            .to(WhatsappConversations::Table, WhatsappConversations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_whatsapp_messages_conversation_ts")
                    .table(WhatsappMessages::Table)
                    .col(WhatsappMessages::ConversationId)
                    .col(WhatsappMessages::Timestamp)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(WhatsappMessages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(WhatsappConversations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(WhatsappContacts::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum WhatsappContacts {
    Table,
    Id,
    UserId,
    Phone,
    Name,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub enum WhatsappConversations {
    Table,
    Id,
    UserId,
    ContactId,
    Label,
    LastMessageAt,
    CreatedAt,
}

#[derive(Iden)]
pub enum WhatsappMessages {
    Table,
    Id,
    ConversationId,
    UserId,
    Direction,
    Status,
    Body,
    WhatsappMessageId,
    Timestamp,
    CreatedAt,
}
