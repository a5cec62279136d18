//! Tenant and landlord registries

use std::sync::Arc;

use tracing::info;

use crate::domain::party::{Party, PartyDeletion, PartyRole, PartyWithContracts, PersonFields};
use crate::domain::{DomainError, DomainResult, RepositoryProvider};

pub struct PartyService {
    repos: Arc<dyn RepositoryProvider>,
}

impl PartyService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    fn not_found(role: PartyRole, id: &str) -> DomainError {
        DomainError::not_found(role.entity(), "id", id)
    }

    pub async fn list(
        &self,
        user_id: i32,
        role: PartyRole,
        query: Option<&str>,
    ) -> DomainResult<Vec<PartyWithContracts>> {
        let query = query.map(str::trim).filter(|q| !q.is_empty());
        self.repos.parties().list(user_id, role, query).await
    }

    pub async fn get(&self, user_id: i32, role: PartyRole, id: &str) -> DomainResult<Party> {
        self.repos
            .parties()
            .find(user_id, role, id)
            .await?
            .ok_or_else(|| Self::not_found(role, id))
    }

    pub async fn create(&self, user_id: i32, role: PartyRole, input: PersonFields) -> DomainResult<Party> {
        let draft = input.validate()?;
        let party = self.repos.parties().create(user_id, role, draft).await?;
        info!(user_id, role = role.as_str(), party_id = %party.id, "Party created");
        Ok(party)
    }

    /// Full replacement with the same validation as create.
    pub async fn update(
        &self,
        user_id: i32,
        role: PartyRole,
        id: &str,
        input: PersonFields,
    ) -> DomainResult<Party> {
        let draft = input.validate()?;
        self.repos
            .parties()
            .update(user_id, role, id, draft)
            .await?
            .ok_or_else(|| Self::not_found(role, id))
    }

    pub async fn delete(&self, user_id: i32, role: PartyRole, id: &str) -> DomainResult<PartyDeletion> {
        let deletion = self
            .repos
            .parties()
            .delete(user_id, role, id)
            .await?
            .ok_or_else(|| Self::not_found(role, id))?;
        info!(user_id, role = role.as_str(), party_id = id, ?deletion, "Party deleted");
        Ok(deletion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::testing::{repos, user};
    use crate::domain::billing::PlanType;

    fn person(name: &str, cpf: &str) -> PersonFields {
        PersonFields {
            full_name: Some(name.into()),
            cpf: Some(cpf.into()),
            rg: Some("12.345.678-9".into()),
            rg_issuer: Some("SSP/SP".into()),
            nationality: Some("brasileira".into()),
            profession: Some("arquiteta".into()),
            marital_status: Some("SOLTEIRO".into()),
            address: Some("Rua B, 20".into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn crud_is_scoped_by_user_and_role() {
        let (db, repos) = repos().await;
        let owner = user(&db, "owner@imobi.test", PlanType::Starter).await;
        let other = user(&db, "other@imobi.test", PlanType::Starter).await;
        let service = PartyService::new(repos);

        let tenant = service
            .create(owner, PartyRole::Tenant, person("Carla Dias", "111.222.333-44"))
            .await
            .unwrap();

        assert!(service.get(other, PartyRole::Tenant, &tenant.id).await.is_err());
        assert!(service.get(owner, PartyRole::Landlord, &tenant.id).await.is_err());

        let found = service.list(owner, PartyRole::Tenant, Some("  carla ")).await.unwrap();
        assert_eq!(found.len(), 1);

        let updated = service
            .update(owner, PartyRole::Tenant, &tenant.id, person("Carla D. Lima", "111.222.333-44"))
            .await
            .unwrap();
        assert_eq!(updated.full_name, "Carla D. Lima");

        let deletion = service.delete(owner, PartyRole::Tenant, &tenant.id).await.unwrap();
        assert_eq!(deletion, PartyDeletion::Hard);
        assert!(matches!(
            service.delete(owner, PartyRole::Tenant, &tenant.id).await,
            Err(DomainError::NotFound { entity: "Tenant", .. })
        ));
    }

    #[tokio::test]
    async fn invalid_person_is_rejected_before_insert() {
        let (db, repos) = repos().await;
        let owner = user(&db, "v@imobi.test", PlanType::Starter).await;
        let service = PartyService::new(repos);

        let mut married = person("Davi", "999");
        married.marital_status = Some("CASADO".into());
        assert!(matches!(
            service.create(owner, PartyRole::Landlord, married).await,
            Err(DomainError::Invalid { code: "MISSING_REGIME", .. })
        ));
        assert!(service.list(owner, PartyRole::Landlord, None).await.unwrap().is_empty());
    }
}
