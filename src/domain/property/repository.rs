use async_trait::async_trait;

use super::{Property, PropertyDraft, PropertyPatch};
use crate::domain::DomainResult;

#[async_trait]
pub trait PropertyRepository: Send + Sync {
    /// Newest first.
    async fn list(&self, user_id: i32) -> DomainResult<Vec<Property>>;
    async fn find(&self, user_id: i32, id: i32) -> DomainResult<Option<Property>>;
    async fn create(&self, user_id: i32, draft: PropertyDraft) -> DomainResult<Property>;
    async fn update(&self, user_id: i32, id: i32, patch: PropertyPatch) -> DomainResult<Option<Property>>;
    /// `false` when nothing matched.
    async fn delete(&self, user_id: i32, id: i32) -> DomainResult<bool>;
    async fn count(&self, user_id: i32) -> DomainResult<u64>;
}
