//! Billing aggregate
//!
//! Plan tiers, the paid-plan catalog, monthly usage metering and
//! subscription records.

pub mod plan_limits;
pub mod plans;
pub mod repository;
pub mod subscription;
pub mod usage;

pub use plan_limits::{PlanLimits, PlanType};
pub use plans::{resolve_plan, BillingPlan, PLANS};
pub use repository::{SubscriptionRepository, UsageRepository};
pub use subscription::{NewPendingSubscription, PaymentActivation, Subscription, SubscriptionStatus};
pub use usage::{
    check_attachment_count, check_quota, MentorFileUsage, MonthlyUsage, PlanLimitError, QuotaKind,
    UsagePeriod,
};
