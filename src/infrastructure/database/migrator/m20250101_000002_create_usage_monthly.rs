//! Create usage_monthly table
//!
//! One counter row per user and calendar month. The unique key is what the
//! insert-or-ignore in the quota path relies on.

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
                    .table(UsageMonthly::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UsageMonthly::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UsageMonthly::UserId).integer().not_null())
                    .col(ColumnDef::new(UsageMonthly::Year).integer().not_null())
                    .col(ColumnDef::new(UsageMonthly::Month).integer().not_null())
                    .col(
                        ColumnDef::new(UsageMonthly::InspectionsCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(UsageMonthly::DocumentsCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(UsageMonthly::MentorFileQuestionsCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(UsageMonthly::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UsageMonthly::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_usage_monthly_user")
                            .from(UsageMonthly::Table, UsageMonthly::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_usage_monthly_user_period")
                    .table(UsageMonthly::Table)
                    .col(UsageMonthly::UserId)
                    .col(UsageMonthly::Year)
                    .col(UsageMonthly::Month)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UsageMonthly::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum UsageMonthly {
    Table,
    Id,
    UserId,
    Year,
    Month,
    InspectionsCount,
    DocumentsCount,
    MentorFileQuestionsCount,
    CreatedAt,
    UpdatedAt,
}
