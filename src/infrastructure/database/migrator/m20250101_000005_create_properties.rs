//! Create properties table

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
                    .table(Properties::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Properties::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Properties::UserId).integer().not_null())
                    .col(ColumnDef::new(Properties::Title).string().not_null())
                    .col(ColumnDef::new(Properties::Address).string().not_null())
                    .col(ColumnDef::new(Properties::City).string().not_null())
                    .col(ColumnDef::new(Properties::State).string_len(20).null())
                    .col(ColumnDef::new(Properties::ZipCode).string_len(20).null())
                    .col(ColumnDef::new(Properties::PropertyType).string_len(50).null())
                    .col(ColumnDef::new(Properties::Status).string_len(50).null())
                    .col(ColumnDef::new(Properties::LandlordName).string().null())
                    .col(ColumnDef::new(Properties::LandlordContact).string().null())
                    .col(ColumnDef::new(Properties::Notes).text().null())
                    .col(
                        ColumnDef::new(Properties::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Properties::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_properties_user")
                            .from(Properties::Table, Properties::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Properties::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Properties {
    Table,
    Id,
    UserId,
    Title,
    Address,
    City,
    State,
    ZipCode,
    PropertyType,
    Status,
    LandlordName,
    LandlordContact,
    Notes,
    CreatedAt,
    UpdatedAt,
}
