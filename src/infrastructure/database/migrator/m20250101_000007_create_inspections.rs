//! Create inspections table

use sea_orm_migration::prelude::*;

use super::m20250101_000001_create_users::Users;
use super::m20250101_000003_create_parties::Parties;
use super::m20250101_000004_create_contracts::Contracts;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Inspections::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Inspections::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Inspections::UserId).integer().not_null())
                    .col(ColumnDef::new(Inspections::Endereco).string().not_null())
                    .col(ColumnDef::new(Inspections::Tipo).string_len(50).not_null())
                    .col(
                        ColumnDef::new(Inspections::Status)
                            .string_len(50)
                            .not_null()
                            .default("pendente"),
                    )
                    .col(
                        ColumnDef::new(Inspections::Data)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Inspections::CreatedFromAi)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Inspections::AiSummary).text().null())
                    .col(ColumnDef::new(Inspections::AiJson).text().null())
                    .col(ColumnDef::new(Inspections::ContractId).string().null())
                    .col(ColumnDef::new(Inspections::TenantRecordId).string().null())
                    .col(
                        ColumnDef::new(Inspections::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Inspections::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_inspections_user")
                            .from(Inspections::Table, Inspections::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_inspections_contract")
                            .from(Inspections::Table, Inspections::ContractId)
                            .to(Contracts::Table, Contracts::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_inspections_tenant")
                            .from(Inspections::Table, Inspections::TenantRecordId)
                            .to(Parties::Table, Parties::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_inspections_user_data")
                    .table(Inspections::Table)
                    .col(Inspections::UserId)
                    .col(Inspections::Data)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Inspections::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Inspections {
    Table,
    Id,
    UserId,
    Endereco,
    Tipo,
    Status,
    Data,
    CreatedFromAi,
    AiSummary,
    AiJson,
    ContractId,
    TenantRecordId,
    CreatedAt,
    UpdatedAt,
}
