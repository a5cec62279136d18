//! Create mentor_attachments table

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
                    .table(MentorAttachments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MentorAttachments::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MentorAttachments::UserId).integer().not_null())
                    .col(ColumnDef::new(MentorAttachments::Filename).string().not_null())
                    .col(ColumnDef::new(MentorAttachments::OriginalName).string().not_null())
                    .col(ColumnDef::new(MentorAttachments::MimeType).string_len(100).not_null())
                    .col(ColumnDef::new(MentorAttachments::SizeBytes).big_integer().not_null())
                    .col(ColumnDef::new(MentorAttachments::StoragePath).string().not_null())
                    .col(ColumnDef::new(MentorAttachments::Checksum).string_len(64).null())
                    .col(
                        ColumnDef::new(MentorAttachments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_mentor_attachments_user")
                            .from(MentorAttachments::Table, MentorAttachments::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MentorAttachments::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum MentorAttachments {
    Table,
    Id,
    UserId,
    Filename,
    OriginalName,
    MimeType,
    SizeBytes,
    StoragePath,
    Checksum,
    CreatedAt,
}
