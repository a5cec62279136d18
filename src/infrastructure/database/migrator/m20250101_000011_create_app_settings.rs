//! Create app_settings table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AppSettings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AppSettings::Id)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AppSettings::DefaultContractTermMonths)
                            .integer()
                            .not_null()
                            .default(30),
                    )
                    .col(
                        ColumnDef::new(AppSettings::NotifyBeforeDueDays)
                            .integer()
                            .not_null()
                            .default(5),
                    )
                    .col(
                        ColumnDef::new(AppSettings::DefaultRentIndex)
                            .string_len(20)
                            .not_null()
                            .default("IPCA"),
                    )
                    .col(ColumnDef::new(AppSettings::CompanyName).string().null())
                    .col(ColumnDef::new(AppSettings::CompanyCreci).string().null())
                    .col(ColumnDef::new(AppSettings::CompanyPhone).string().null())
                    .col(ColumnDef::new(AppSettings::CompanyAddress).string().null())
                    .col(ColumnDef::new(AppSettings::CompanyWhatsapp).string().null())
                    .col(
                        ColumnDef::new(AppSettings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AppSettings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AppSettings::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum AppSettings {
    Table,
    Id,
    DefaultContractTermMonths,
    NotifyBeforeDueDays,
    DefaultRentIndex,
    CompanyName,
    CompanyCreci,
    CompanyPhone,
    CompanyAddress,
    CompanyWhatsapp,
    CreatedAt,
    UpdatedAt,
}
