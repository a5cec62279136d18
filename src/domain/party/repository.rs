use async_trait::async_trait;

use super::{Party, PartyDeletion, PartyDraft, PartyRole, PartyWithContracts};
use crate::domain::DomainResult;

/// Tenants and landlords, always scoped to the owning user.
/// Soft-deleted rows are invisible to every read.
#[async_trait]
pub trait PartyRepository: Send + Sync {
    /// Newest first; `query` matches name, email or CPF case-insensitively.
    async fn list(
        &self,
        user_id: i32,
        role: PartyRole,
        query: Option<&str>,
    ) -> DomainResult<Vec<PartyWithContracts>>;

    async fn find(&self, user_id: i32, role: PartyRole, id: &str) -> DomainResult<Option<Party>>;

    /// Only the ids that exist, belong to the user and are not deleted.
    async fn find_active(
        &self,
        user_id: i32,
        role: PartyRole,
        ids: &[String],
    ) -> DomainResult<Vec<Party>>;

    /// Fails with `DomainError::Conflict` when the CPF is already registered
    /// for this user and role.
    async fn create(&self, user_id: i32, role: PartyRole, draft: PartyDraft) -> DomainResult<Party>;

    async fn update(
        &self,
        user_id: i32,
        role: PartyRole,
        id: &str,
        draft: PartyDraft,
    ) -> DomainResult<Option<Party>>;

    /// Soft delete when the party appears on a contract, hard delete
    /// otherwise. `None` when nothing matched.
    async fn delete(
        &self,
        user_id: i32,
        role: PartyRole,
        id: &str,
    ) -> DomainResult<Option<PartyDeletion>>;
}
