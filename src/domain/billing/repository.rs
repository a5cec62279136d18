//! Usage & subscription repository interfaces

use async_trait::async_trait;

use super::subscription::{
    NewPendingSubscription, PaymentActivation, Subscription, SubscriptionStatus,
};
use super::usage::{MonthlyUsage, QuotaKind, UsagePeriod};
use crate::domain::DomainResult;

#[async_trait]
pub trait UsageRepository: Send + Sync {
    /// Returns the counters for `period`, creating a zeroed row if needed.
    async fn get_or_create(&self, user_id: i32, period: UsagePeriod) -> DomainResult<MonthlyUsage>;

    /// Check-and-increment in a transaction of its own. Fails with
    /// `DomainError::PlanLimit` and leaves the counter untouched when the
    /// plan allowance would be exceeded.
    async fn consume(&self, user_id: i32, kind: QuotaKind, amount: i32) -> DomainResult<MonthlyUsage>;
}

#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    async fn create_pending(&self, new: NewPendingSubscription) -> DomainResult<Subscription>;
    async fn find_by_pref_id(&self, pref_id: &str) -> DomainResult<Option<Subscription>>;

    /// Idempotent on `payment_id`: a second call returns the row created by
    /// the first one.
    async fn activate_by_payment(&self, activation: PaymentActivation) -> DomainResult<Subscription>;

    /// Updates rows matching the payment id or the preference id.
    /// Returns the number of rows touched.
    async fn set_status(
        &self,
        payment_id: &str,
        pref_id: Option<&str>,
        status: SubscriptionStatus,
    ) -> DomainResult<u64>;

    /// Active subscription with the furthest `valid_until`.
    async fn find_active_by_email(&self, email: &str) -> DomainResult<Option<Subscription>>;
}
