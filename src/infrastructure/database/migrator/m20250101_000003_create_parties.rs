//! Create parties table
//!
//! Tenants and landlords. Rows referenced by a contract are soft-deleted
//! through `deleted_at`.

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
                    .table(Parties::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Parties::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Parties::UserId).integer().not_null())
                    .col(ColumnDef::new(Parties::Role).string_len(20).not_null())
                    .col(ColumnDef::new(Parties::FullName).string().not_null())
                    .col(ColumnDef::new(Parties::Cpf).string_len(20).not_null())
                    .col(ColumnDef::new(Parties::Rg).string_len(30).not_null())
                    .col(ColumnDef::new(Parties::RgIssuer).string_len(30).not_null())
                    .col(ColumnDef::new(Parties::Nationality).string().not_null())
                    .col(ColumnDef::new(Parties::Profession).string().not_null())
                    .col(ColumnDef::new(Parties::MaritalStatus).string_len(20).not_null())
                    .col(ColumnDef::new(Parties::MaritalRegime).string_len(20).null())
                    .col(ColumnDef::new(Parties::SpouseName).string().null())
                    .col(ColumnDef::new(Parties::SpouseCpf).string_len(20).null())
                    .col(ColumnDef::new(Parties::SpouseRg).string_len(30).null())
                    .col(
                        ColumnDef::new(Parties::IsUnionStable)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Parties::Email).string().null())
                    .col(ColumnDef::new(Parties::Phone).string_len(30).null())
                    .col(ColumnDef::new(Parties::Address).string().not_null())
                    .col(
                        ColumnDef::new(Parties::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Parties::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Parties::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_parties_user")
                            .from(Parties::Table, Parties::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_parties_user_role_cpf")
                    .table(Parties::Table)
                    .col(Parties::UserId)
                    .col(Parties::Role)
                    .col(Parties::Cpf)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Parties::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Parties {
    Table,
    Id,
    UserId,
    Role,
    FullName,
    Cpf,
    Rg,
    RgIssuer,
    Nationality,
    Profession,
    MaritalStatus,
    MaritalRegime,
    SpouseName,
    SpouseCpf,
    SpouseRg,
    IsUnionStable,
    Email,
    Phone,
    Address,
    DeletedAt,
    CreatedAt,
    UpdatedAt,
}
