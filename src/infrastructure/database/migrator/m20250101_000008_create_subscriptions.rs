//! Create subscriptions table
//!
//! The unique payment id makes webhook redelivery idempotent.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Subscriptions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Subscriptions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Subscriptions::Email).string().not_null())
                    .col(ColumnDef::new(Subscriptions::PlanId).string_len(50).not_null())
                    .col(ColumnDef::new(Subscriptions::Status).string_len(20).not_null())
                    .col(ColumnDef::new(Subscriptions::PriceCents).big_integer().not_null())
                    .col(
                        ColumnDef::new(Subscriptions::Currency)
                            .string_len(3)
                            .not_null()
                            .default("BRL"),
                    )
                    .col(ColumnDef::new(Subscriptions::MpPrefId).string().null())
                    .col(
                        ColumnDef::new(Subscriptions::MpPaymentId)
                            .string()
                            .null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Subscriptions::ValidUntil)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Subscriptions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Subscriptions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_subscriptions_email")
                    .table(Subscriptions::Table)
                    .col(Subscriptions::Email)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_subscriptions_pref")
                    .table(Subscriptions::Table)
                    .col(Subscriptions::MpPrefId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Subscriptions::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Subscriptions {
    Table,
    Id,
    Email,
    PlanId,
    Status,
    PriceCents,
    Currency,
    MpPrefId,
    MpPaymentId,
    ValidUntil,
    CreatedAt,
    UpdatedAt,
}
