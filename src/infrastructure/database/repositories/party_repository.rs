//! SeaORM implementation of PartyRepository

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::{debug, info};

use crate::domain::party::{
    LinkedContract, MaritalRegime, MaritalStatus, Party, PartyDeletion, PartyDraft,
    PartyRepository, PartyRole, PartyWithContracts,
};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::{contract, contract_party, party};
use crate::shared::validations::contains_ci;

pub struct SeaOrmPartyRepository {
    db: DatabaseConnection,
}

impl SeaOrmPartyRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_model(
        &self,
        user_id: i32,
        role: PartyRole,
        id: &str,
    ) -> DomainResult<Option<party::Model>> {
        party::Entity::find_by_id(id.to_string())
            .filter(party::Column::UserId.eq(user_id))
            .filter(party::Column::Role.eq(role_to_entity(role)))
            .filter(party::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .map_err(db_err)
    }

    async fn linked_contracts(
        &self,
        party_ids: Vec<String>,
    ) -> DomainResult<HashMap<String, Vec<LinkedContract>>> {
        let rows = contract_party::Entity::find()
            .filter(contract_party::Column::PartyId.is_in(party_ids))
            .find_also_related(contract::Entity)
            .order_by_desc(contract::Column::CriadoEm)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let mut by_party: HashMap<String, Vec<LinkedContract>> = HashMap::new();
        for (link, contract) in rows {
            let Some(c) = contract else { continue };
            by_party.entry(link.party_id).or_default().push(LinkedContract {
                id: c.id,
                titulo: c.titulo,
                endereco: c.endereco,
                status: c.status,
                tipo: c.tipo,
                criado_em: c.criado_em,
            });
        }
        Ok(by_party)
    }
}

// ── Conversion helpers ──────────────────────────────────────────

pub(crate) fn role_to_entity(role: PartyRole) -> party::PartyRole {
    match role {
        PartyRole::Tenant => party::PartyRole::Tenant,
        PartyRole::Landlord => party::PartyRole::Landlord,
    }
}

fn role_to_domain(role: party::PartyRole) -> PartyRole {
    match role {
        party::PartyRole::Tenant => PartyRole::Tenant,
        party::PartyRole::Landlord => PartyRole::Landlord,
    }
}

pub(crate) fn model_to_domain(m: party::Model) -> Party {
    Party {
        id: m.id,
        user_id: m.user_id,
        role: role_to_domain(m.role),
        full_name: m.full_name,
        cpf: m.cpf,
        rg: m.rg,
        rg_issuer: m.rg_issuer,
        nationality: m.nationality,
        profession: m.profession,
        // Stored values were validated on write.
        marital_status: MaritalStatus::parse(&m.marital_status).unwrap_or(MaritalStatus::Solteiro),
        marital_regime: m.marital_regime.as_deref().and_then(MaritalRegime::parse),
        spouse_name: m.spouse_name,
        spouse_cpf: m.spouse_cpf,
        spouse_rg: m.spouse_rg,
        is_union_stable: m.is_union_stable,
        email: m.email,
        phone: m.phone,
        address: m.address,
        deleted_at: m.deleted_at,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

fn apply_draft(active: &mut party::ActiveModel, draft: PartyDraft) {
    active.full_name = Set(draft.full_name);
    active.cpf = Set(draft.cpf);
    active.rg = Set(draft.rg);
    active.rg_issuer = Set(draft.rg_issuer);
    active.nationality = Set(draft.nationality);
    active.profession = Set(draft.profession);
    active.marital_status = Set(draft.marital_status.as_str().to_string());
    active.marital_regime = Set(draft.marital_regime.map(|r| r.as_str().to_string()));
    active.spouse_name = Set(draft.spouse_name);
    active.spouse_cpf = Set(draft.spouse_cpf);
    active.spouse_rg = Set(draft.spouse_rg);
    active.is_union_stable = Set(draft.is_union_stable);
    active.email = Set(draft.email);
    active.phone = Set(draft.phone);
    active.address = Set(draft.address);
}

fn db_err(e: sea_orm::DbErr) -> DomainError {
    DomainError::Database(e.to_string())
}

fn write_err(role: PartyRole) -> impl FnOnce(sea_orm::DbErr) -> DomainError {
    move |e| {
        if e.to_string().contains("UNIQUE") || e.to_string().contains("duplicate") {
            DomainError::Conflict(format!("CPF já cadastrado para outro {}.", role.noun()))
        } else {
            db_err(e)
        }
    }
}

// ── PartyRepository impl ────────────────────────────────────────

#[async_trait]
impl PartyRepository for SeaOrmPartyRepository {
    async fn list(
        &self,
        user_id: i32,
        role: PartyRole,
        query: Option<&str>,
    ) -> DomainResult<Vec<PartyWithContracts>> {
        let models = party::Entity::find()
            .filter(party::Column::UserId.eq(user_id))
            .filter(party::Column::Role.eq(role_to_entity(role)))
            .filter(party::Column::DeletedAt.is_null())
            .order_by_desc(party::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let parties: Vec<Party> = models
            .into_iter()
            .map(model_to_domain)
            .filter(|p| match query {
                None => true,
                Some(q) => {
                    contains_ci(&p.full_name, q)
                        || contains_ci(&p.cpf, q)
                        || p.email.as_deref().is_some_and(|e| contains_ci(e, q))
                }
            })
            .collect();

        let mut links = self
            .linked_contracts(parties.iter().map(|p| p.id.clone()).collect())
            .await?;

        Ok(parties
            .into_iter()
            .map(|party| PartyWithContracts {
                contracts: links.remove(&party.id).unwrap_or_default(),
                party,
            })
            .collect())
    }

    async fn find(&self, user_id: i32, role: PartyRole, id: &str) -> DomainResult<Option<Party>> {
        Ok(self.find_model(user_id, role, id).await?.map(model_to_domain))
    }

    async fn find_active(
        &self,
        user_id: i32,
        role: PartyRole,
        ids: &[String],
    ) -> DomainResult<Vec<Party>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = party::Entity::find()
            .filter(party::Column::Id.is_in(ids.iter().cloned()))
            .filter(party::Column::UserId.eq(user_id))
            .filter(party::Column::Role.eq(role_to_entity(role)))
            .filter(party::Column::DeletedAt.is_null())
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn create(&self, user_id: i32, role: PartyRole, draft: PartyDraft) -> DomainResult<Party> {
        let now = Utc::now();
        let mut active = party::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            user_id: Set(user_id),
            role: Set(role_to_entity(role)),
            deleted_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        apply_draft(&mut active, draft);

        let created = active.insert(&self.db).await.map_err(write_err(role))?;
        debug!(user_id, party_id = %created.id, role = role.as_str(), "Party created");
        Ok(model_to_domain(created))
    }

    async fn update(
        &self,
        user_id: i32,
        role: PartyRole,
        id: &str,
        draft: PartyDraft,
    ) -> DomainResult<Option<Party>> {
        let Some(existing) = self.find_model(user_id, role, id).await? else {
            return Ok(None);
        };

        let mut active: party::ActiveModel = existing.into();
        apply_draft(&mut active, draft);
        active.updated_at = Set(Utc::now());

        let updated = active.update(&self.db).await.map_err(write_err(role))?;
        Ok(Some(model_to_domain(updated)))
    }

    async fn delete(
        &self,
        user_id: i32,
        role: PartyRole,
        id: &str,
    ) -> DomainResult<Option<PartyDeletion>> {
        let Some(existing) = self.find_model(user_id, role, id).await? else {
            return Ok(None);
        };

        let links = contract_party::Entity::find()
            .filter(contract_party::Column::PartyId.eq(id))
            .count(&self.db)
            .await
            .map_err(db_err)?;

        if links > 0 {
            let mut active: party::ActiveModel = existing.into();
            let now = Utc::now();
            active.deleted_at = Set(Some(now));
            active.updated_at = Set(now);
            active.update(&self.db).await.map_err(db_err)?;
            info!(user_id, party_id = id, contracts = links, "Party soft-deleted");
            return Ok(Some(PartyDeletion::Soft));
        }

        party::Entity::delete_by_id(id.to_string())
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        info!(user_id, party_id = id, "Party deleted");
        Ok(Some(PartyDeletion::Hard))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::PlanType;
    use crate::infrastructure::database::testing::{seed_user, setup_db};

    fn draft(name: &str, cpf: &str) -> PartyDraft {
        PartyDraft {
            full_name: name.into(),
            cpf: cpf.into(),
            rg: "12.345.678-9".into(),
            rg_issuer: "SSP/SP".into(),
            nationality: "brasileira".into(),
            profession: "advogada".into(),
            marital_status: MaritalStatus::Solteiro,
            marital_regime: None,
            spouse_name: None,
            spouse_cpf: None,
            spouse_rg: None,
            is_union_stable: false,
            email: Some(format!("{}@mail.test", name.to_lowercase())),
            phone: None,
            address: "Rua das Flores, 10".into(),
        }
    }

    #[tokio::test]
    async fn duplicate_cpf_per_role_conflicts() {
        let db = setup_db().await;
        let user_id = seed_user(&db, "owner@imobi.test", PlanType::Starter).await;
        let repo = SeaOrmPartyRepository::new(db);

        repo.create(user_id, PartyRole::Tenant, draft("Ana", "111")).await.unwrap();
        let err = repo
            .create(user_id, PartyRole::Tenant, draft("Outra", "111"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(msg) if msg.contains("inquilino")));

        // Same CPF as landlord is a different registry.
        repo.create(user_id, PartyRole::Landlord, draft("Ana", "111")).await.unwrap();
    }

    #[tokio::test]
    async fn list_filters_case_insensitively() {
        let db = setup_db().await;
        let user_id = seed_user(&db, "owner@imobi.test", PlanType::Starter).await;
        let repo = SeaOrmPartyRepository::new(db);

        repo.create(user_id, PartyRole::Landlord, draft("Beatriz", "222")).await.unwrap();
        repo.create(user_id, PartyRole::Landlord, draft("Carlos", "333")).await.unwrap();

        let all = repo.list(user_id, PartyRole::Landlord, None).await.unwrap();
        assert_eq!(all.len(), 2);
        let found = repo.list(user_id, PartyRole::Landlord, Some("BEA")).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].party.full_name, "Beatriz");
        assert!(found[0].contracts.is_empty());
    }

    #[tokio::test]
    async fn unlinked_party_is_hard_deleted() {
        let db = setup_db().await;
        let user_id = seed_user(&db, "owner@imobi.test", PlanType::Starter).await;
        let repo = SeaOrmPartyRepository::new(db);

        let party = repo.create(user_id, PartyRole::Tenant, draft("Dora", "444")).await.unwrap();
        let outcome = repo.delete(user_id, PartyRole::Tenant, &party.id).await.unwrap();
        assert_eq!(outcome, Some(PartyDeletion::Hard));
        assert!(repo.delete(user_id, PartyRole::Tenant, &party.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn other_users_cannot_see_party() {
        let db = setup_db().await;
        let owner = seed_user(&db, "owner@imobi.test", PlanType::Starter).await;
        let other = seed_user(&db, "other@imobi.test", PlanType::Starter).await;
        let repo = SeaOrmPartyRepository::new(db);

        let party = repo.create(owner, PartyRole::Tenant, draft("Eva", "555")).await.unwrap();
        assert!(repo.find(other, PartyRole::Tenant, &party.id).await.unwrap().is_none());
        assert!(repo.find(owner, PartyRole::Landlord, &party.id).await.unwrap().is_none());
    }
}
