//! SeaORM implementation of ContractRepository

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::info;

use crate::domain::billing::QuotaKind;
use crate::domain::contract::{
    Contract, ContractFilter, ContractRepository, ContractStats, ContractWithParties, NewContract,
    STATUS_ACTIVE, STATUS_REVIEWING,
};
use crate::domain::party::{PartyRole, PartySummary};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::{contract, contract_party, party};
use crate::shared::validations::contains_ci;

use super::party_repository::{model_to_domain as party_to_domain, role_to_entity};
use super::usage_repository::consume_quota;

pub struct SeaOrmContractRepository {
    db: DatabaseConnection,
}

impl SeaOrmContractRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Landlord and tenant summaries keyed by contract id.
    async fn parties_for(
        &self,
        contract_ids: Vec<String>,
    ) -> DomainResult<HashMap<String, (Vec<PartySummary>, Vec<PartySummary>)>> {
        let rows = contract_party::Entity::find()
            .filter(contract_party::Column::ContractId.is_in(contract_ids))
            .find_also_related(party::Entity)
            .order_by_asc(contract_party::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let mut grouped: HashMap<String, (Vec<PartySummary>, Vec<PartySummary>)> = HashMap::new();
        for (link, party) in rows {
            let Some(party) = party else { continue };
            let summary = PartySummary::from(&party_to_domain(party));
            let entry = grouped.entry(link.contract_id).or_default();
            match link.role {
                party::PartyRole::Landlord => entry.0.push(summary),
                party::PartyRole::Tenant => entry.1.push(summary),
            }
        }
        Ok(grouped)
    }

    async fn with_parties(&self, contracts: Vec<Contract>) -> DomainResult<Vec<ContractWithParties>> {
        let mut parties = self
            .parties_for(contracts.iter().map(|c| c.id.clone()).collect())
            .await?;
        Ok(contracts
            .into_iter()
            .map(|contract| {
                let (landlords, tenants) = parties.remove(&contract.id).unwrap_or_default();
                ContractWithParties {
                    contract,
                    landlords,
                    tenants,
                }
            })
            .collect())
    }

    async fn count_where(&self, user_id: i32, status: Option<&str>) -> DomainResult<u64> {
        let mut query = contract::Entity::find().filter(contract::Column::UserId.eq(user_id));
        if let Some(status) = status {
            query = query.filter(contract::Column::Status.eq(status));
        }
        query.count(&self.db).await.map_err(db_err)
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn model_to_domain(m: contract::Model) -> Contract {
    Contract {
        id: m.id,
        user_id: m.user_id,
        titulo: m.titulo,
        endereco: m.endereco,
        tipo: m.tipo,
        status: m.status,
        criado_em: m.criado_em,
        start_date: m.start_date,
        end_date: m.end_date,
        rent_value: m.rent_value,
        condo_value: m.condo_value,
        iptu_value: m.iptu_value,
        deposit_value: m.deposit_value,
        due_day: m.due_day,
        city: m.city,
        state: m.state,
        full_address: m.full_address,
        property_description: m.property_description,
        generated_text: m.generated_text,
    }
}

fn db_err(e: sea_orm::DbErr) -> DomainError {
    DomainError::Database(e.to_string())
}

async fn insert_links(
    txn: &DatabaseTransaction,
    contract_id: &str,
    role: PartyRole,
    party_ids: &[String],
) -> DomainResult<()> {
    if party_ids.is_empty() {
        return Ok(());
    }
    let rows = party_ids.iter().map(|party_id| contract_party::ActiveModel {
        contract_id: Set(contract_id.to_string()),
        party_id: Set(party_id.clone()),
        role: Set(role_to_entity(role)),
        ..Default::default()
    });
    contract_party::Entity::insert_many(rows)
        .exec(txn)
        .await
        .map_err(db_err)?;
    Ok(())
}

// ── ContractRepository impl ─────────────────────────────────────

#[async_trait]
impl ContractRepository for SeaOrmContractRepository {
    async fn list(&self, user_id: i32, filter: ContractFilter) -> DomainResult<Vec<ContractWithParties>> {
        let mut query = contract::Entity::find().filter(contract::Column::UserId.eq(user_id));
        if let Some(status) = filter.status.as_deref() {
            query = query.filter(contract::Column::Status.eq(status));
        }
        if let Some(tipo) = filter.tipo.as_deref() {
            query = query.filter(contract::Column::Tipo.eq(tipo));
        }

        let models = query
            .order_by_desc(contract::Column::CriadoEm)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let contracts: Vec<Contract> = models
            .into_iter()
            .map(model_to_domain)
            .filter(|c| match filter.q.as_deref() {
                None => true,
                Some(q) => {
                    contains_ci(&c.titulo, q)
                        || contains_ci(&c.endereco, q)
                        || contains_ci(&c.full_address, q)
                }
            })
            .collect();

        self.with_parties(contracts).await
    }

    async fn find(&self, user_id: i32, id: &str) -> DomainResult<Option<ContractWithParties>> {
        let model = contract::Entity::find_by_id(id.to_string())
            .filter(contract::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        let Some(model) = model else {
            return Ok(None);
        };
        Ok(self.with_parties(vec![model_to_domain(model)]).await?.pop())
    }

    async fn exists(&self, user_id: i32, id: &str) -> DomainResult<bool> {
        let count = contract::Entity::find()
            .filter(contract::Column::Id.eq(id))
            .filter(contract::Column::UserId.eq(user_id))
            .count(&self.db)
            .await
            .map_err(db_err)?;
        Ok(count > 0)
    }

    async fn create_metered(&self, user_id: i32, new: NewContract) -> DomainResult<ContractWithParties> {
        let id = uuid::Uuid::new_v4().to_string();
        let txn = self.db.begin().await.map_err(db_err)?;

        let written: DomainResult<()> = async {
            consume_quota(&txn, user_id, QuotaKind::Document, 1).await?;

            contract::ActiveModel {
                id: Set(id.clone()),
                user_id: Set(user_id),
                titulo: Set(new.titulo),
                endereco: Set(new.endereco),
                tipo: Set(new.tipo),
                status: Set(new.status),
                criado_em: Set(Utc::now()),
                start_date: Set(new.start_date),
                end_date: Set(new.end_date),
                rent_value: Set(new.rent_value),
                condo_value: Set(new.condo_value),
                iptu_value: Set(new.iptu_value),
                deposit_value: Set(new.deposit_value),
                due_day: Set(new.due_day),
                city: Set(new.city),
                state: Set(new.state),
                full_address: Set(new.full_address),
                property_description: Set(new.property_description),
                generated_text: Set(Some(new.generated_text)),
            }
            .insert(&txn)
            .await
            .map_err(db_err)?;

            insert_links(&txn, &id, PartyRole::Landlord, &new.landlord_ids).await?;
            insert_links(&txn, &id, PartyRole::Tenant, &new.tenant_ids).await?;
            Ok(())
        }
        .await;

        if let Err(e) = written {
            txn.rollback().await.map_err(db_err)?;
            return Err(e);
        }
        txn.commit().await.map_err(db_err)?;
        info!(user_id, contract_id = %id, "Contract created");

        self.find(user_id, &id)
            .await?
            .ok_or_else(|| DomainError::Internal(format!("contract {id} missing after insert")))
    }

    async fn stats(&self, user_id: i32) -> DomainResult<ContractStats> {
        Ok(ContractStats {
            total: self.count_where(user_id, None).await?,
            active: self.count_where(user_id, Some(STATUS_ACTIVE)).await?,
            reviewing: self.count_where(user_id, Some(STATUS_REVIEWING)).await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::{PlanType, UsagePeriod, UsageRepository};
    use crate::domain::party::{MaritalStatus, PartyDeletion, PartyDraft, PartyRepository};
    use crate::infrastructure::database::repositories::party_repository::SeaOrmPartyRepository;
    use crate::infrastructure::database::repositories::usage_repository::SeaOrmUsageRepository;
    use crate::infrastructure::database::testing::{seed_user, setup_db};
    use chrono::{Duration, TimeZone};

    fn person(name: &str, cpf: &str) -> PartyDraft {
        PartyDraft {
            full_name: name.into(),
            cpf: cpf.into(),
            rg: "1".into(),
            rg_issuer: "SSP".into(),
            nationality: "brasileiro".into(),
            profession: "professor".into(),
            marital_status: MaritalStatus::Solteiro,
            marital_regime: None,
            spouse_name: None,
            spouse_cpf: None,
            spouse_rg: None,
            is_union_stable: false,
            email: None,
            phone: None,
            address: "Rua B, 2".into(),
        }
    }

    fn new_contract(landlord: &str, tenant: &str) -> NewContract {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        NewContract {
            titulo: "Contrato de locação - Campinas/SP".into(),
            endereco: "Rua C, 3".into(),
            tipo: "residencial".into(),
            status: STATUS_ACTIVE.into(),
            start_date: start,
            end_date: start + Duration::days(365),
            rent_value: 2500,
            condo_value: None,
            iptu_value: None,
            deposit_value: None,
            due_day: 10,
            city: "Campinas".into(),
            state: "SP".into(),
            full_address: "Rua C, 3, Centro, Campinas/SP".into(),
            property_description: None,
            generated_text: "CONTRATO".into(),
            landlord_ids: vec![landlord.to_string()],
            tenant_ids: vec![tenant.to_string()],
        }
    }

    #[tokio::test]
    async fn create_links_parties_and_meters_document() {
        let db = setup_db().await;
        let user_id = seed_user(&db, "c@imobi.test", PlanType::Starter).await;
        let parties = SeaOrmPartyRepository::new(db.clone());
        let landlord = parties.create(user_id, PartyRole::Landlord, person("Lia", "1")).await.unwrap();
        let tenant = parties.create(user_id, PartyRole::Tenant, person("Rui", "2")).await.unwrap();

        let repo = SeaOrmContractRepository::new(db.clone());
        let created = repo
            .create_metered(user_id, new_contract(&landlord.id, &tenant.id))
            .await
            .unwrap();
        assert_eq!(created.landlords[0].full_name, "Lia");
        assert_eq!(created.tenants[0].full_name, "Rui");

        let usage = SeaOrmUsageRepository::new(db.clone())
            .get_or_create(user_id, UsagePeriod::current())
            .await
            .unwrap();
        assert_eq!(usage.documents_count, 1);

        let listed = parties.list(user_id, PartyRole::Tenant, None).await.unwrap();
        assert_eq!(listed[0].contracts.len(), 1);

        // Linked parties survive deletion as soft-deleted rows.
        let outcome = parties.delete(user_id, PartyRole::Tenant, &tenant.id).await.unwrap();
        assert_eq!(outcome, Some(PartyDeletion::Soft));
        let again = repo.find(user_id, &created.contract.id).await.unwrap().unwrap();
        assert_eq!(again.tenants.len(), 1);
    }

    #[tokio::test]
    async fn exhausted_allowance_writes_nothing() {
        let db = setup_db().await;
        let user_id = seed_user(&db, "full@imobi.test", PlanType::Starter).await;
        let parties = SeaOrmPartyRepository::new(db.clone());
        let landlord = parties.create(user_id, PartyRole::Landlord, person("L", "1")).await.unwrap();
        let tenant = parties.create(user_id, PartyRole::Tenant, person("T", "2")).await.unwrap();

        let usage = SeaOrmUsageRepository::new(db.clone());
        for _ in 0..15 {
            usage.consume(user_id, QuotaKind::Document, 1).await.unwrap();
        }

        let repo = SeaOrmContractRepository::new(db);
        let err = repo
            .create_metered(user_id, new_contract(&landlord.id, &tenant.id))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::PlanLimit(ref e) if e.kind == QuotaKind::Document));
        assert_eq!(repo.stats(user_id).await.unwrap(), ContractStats::default());
    }

    #[tokio::test]
    async fn list_filters_by_status_and_text() {
        let db = setup_db().await;
        let user_id = seed_user(&db, "f@imobi.test", PlanType::Pro).await;
        let parties = SeaOrmPartyRepository::new(db.clone());
        let landlord = parties.create(user_id, PartyRole::Landlord, person("L", "1")).await.unwrap();
        let tenant = parties.create(user_id, PartyRole::Tenant, person("T", "2")).await.unwrap();
        let repo = SeaOrmContractRepository::new(db);

        repo.create_metered(user_id, new_contract(&landlord.id, &tenant.id)).await.unwrap();
        let mut reviewing = new_contract(&landlord.id, &tenant.id);
        reviewing.status = STATUS_REVIEWING.into();
        reviewing.endereco = "Alameda Santos, 5".into();
        reviewing.full_address = "Alameda Santos, 5".into();
        repo.create_metered(user_id, reviewing).await.unwrap();

        let by_status = ContractFilter {
            status: Some(STATUS_REVIEWING.into()),
            ..Default::default()
        };
        assert_eq!(repo.list(user_id, by_status).await.unwrap().len(), 1);

        let by_text = ContractFilter {
            q: Some("alameda".into()),
            ..Default::default()
        };
        let found = repo.list(user_id, by_text).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].contract.status, STATUS_REVIEWING);

        let stats = repo.stats(user_id).await.unwrap();
        assert_eq!((stats.total, stats.active, stats.reviewing), (2, 1, 1));
    }
}
