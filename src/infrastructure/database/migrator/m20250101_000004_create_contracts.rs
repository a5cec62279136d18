//! Create contracts and contract_parties tables

use sea_orm_migration::prelude::*;

use super::m20250101_000001_create_users::Users;
use super::m20250101_000003_create_parties::Parties;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Contracts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Contracts::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Contracts::UserId).integer().not_null())
                    .col(ColumnDef::new(Contracts::Titulo).string().not_null())
                    .col(ColumnDef::new(Contracts::Endereco).string().not_null())
                    .col(ColumnDef::new(Contracts::Tipo).string_len(50).not_null())
                    .col(ColumnDef::new(Contracts::Status).string_len(50).not_null())
                    .col(
                        ColumnDef::new(Contracts::CriadoEm)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Contracts::StartDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Contracts::EndDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Contracts::RentValue).big_integer().not_null())
                    .col(ColumnDef::new(Contracts::CondoValue).big_integer().null())
                    .col(ColumnDef::new(Contracts::IptuValue).big_integer().null())
                    .col(ColumnDef::new(Contracts::DepositValue).big_integer().null())
                    .col(ColumnDef::new(Contracts::DueDay).integer().not_null())
                    .col(ColumnDef::new(Contracts::City).string().not_null())
                    .col(ColumnDef::new(Contracts::State).string_len(20).not_null())
                    .col(ColumnDef::new(Contracts::FullAddress).string().not_null())
                    .col(ColumnDef::new(Contracts::PropertyDescription).string().null())
                    .col(ColumnDef::new(Contracts::GeneratedText).text().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_contracts_user")
                            .from(Contracts::Table, Contracts::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_contracts_user")
                    .table(Contracts::Table)
                    .col(Contracts::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ContractParties::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ContractParties::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ContractParties::ContractId).string().not_null())
                    .col(ColumnDef::new(ContractParties::PartyId).string().not_null())
                    .col(ColumnDef::new(ContractParties::Role).string_len(20).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_contract_parties_contract")
                            .from(ContractParties::Table, ContractParties::ContractId)
                            .to(Contracts::Table, Contracts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_contract_parties_party")
                            .from(ContractParties::Table, ContractParties::PartyId)
                            .to(Parties::Table, Parties::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_contract_parties_unique")
                    .table(ContractParties::Table)
                    .col(ContractParties::ContractId)
                    .col(ContractParties::PartyId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ContractParties::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Contracts::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Contracts {
    Table,
    Id,
    UserId,
    Titulo,
    Endereco,
    Tipo,
    Status,
    CriadoEm,
    StartDate,
    EndDate,
    RentValue,
    CondoValue,
    IptuValue,
    DepositValue,
    DueDay,
    City,
    State,
    FullAddress,
    PropertyDescription,
    GeneratedText,
}

#[derive(Iden)]
pub enum ContractParties {
    Table,
    Id,
    ContractId,
    PartyId,
    Role,
}
