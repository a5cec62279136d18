use async_trait::async_trait;

use super::{ContractFilter, ContractStats, ContractWithParties, NewContract};
use crate::domain::DomainResult;

#[async_trait]
pub trait ContractRepository: Send + Sync {
    /// Newest first.
    async fn list(&self, user_id: i32, filter: ContractFilter) -> DomainResult<Vec<ContractWithParties>>;
    async fn find(&self, user_id: i32, id: &str) -> DomainResult<Option<ContractWithParties>>;
    async fn exists(&self, user_id: i32, id: &str) -> DomainResult<bool>;

    /// Consumes one document from the monthly allowance and stores the
    /// contract with its party links in the same transaction. Nothing is
    /// written when the allowance is exhausted.
    async fn create_metered(&self, user_id: i32, new: NewContract) -> DomainResult<ContractWithParties>;

    async fn stats(&self, user_id: i32) -> DomainResult<ContractStats>;
}
