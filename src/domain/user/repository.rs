use async_trait::async_trait;

use super::{NewUser, User};
use crate::domain::billing::PlanType;
use crate::domain::DomainResult;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, new: NewUser) -> DomainResult<User>;
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>>;
    async fn touch_login(&self, id: i32) -> DomainResult<()>;

    /// Moves the account registered under `email` to `plan`.
    /// Returns `false` when no such account exists.
    async fn set_plan_by_email(&self, email: &str, plan: PlanType) -> DomainResult<bool>;
}
